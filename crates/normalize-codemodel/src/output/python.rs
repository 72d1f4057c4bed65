//! Python generator for the code model.
//!
//! Emits a [`SourceFile`] as Python 3.10+ source. Layout is fixed so that
//! parsing the output and generating again reproduces it exactly:
//!
//! - top-level chunks (docstring, imports, type variables, each type, each
//!   function, the free statements) are separated by two blank lines
//! - chunks inside a class body are separated by one blank line
//! - the file ends with a single newline

use crate::ir::*;
use crate::naming::{ENUM_BASES, is_dunder, operator_dunder, to_screaming_snake_case, to_snake_case};
use crate::resolve::TypeResolver;
use crate::traits::{GenerateError, GenerateOptions, Generator};

/// Static instance of the Python generator for registry.
pub static PYTHON_GENERATOR: PythonGeneratorImpl = PythonGeneratorImpl;

/// Python generator implementing the Generator trait.
pub struct PythonGeneratorImpl;

impl Generator for PythonGeneratorImpl {
    fn language(&self) -> Language {
        Language::Python
    }

    fn generate(&self, file: &SourceFile, options: &GenerateOptions) -> Result<String, GenerateError> {
        PythonGenerator::emit(file, options)
    }
}

/// Modules whose names the generator may need to import, in emission order.
const REQUIRED_MODULES: &[&str] = &["abc", "dataclasses", "enum", "typing"];

/// Emits the code model as Python source code.
pub struct PythonGenerator {
    output: String,
    indent: usize,
    options: GenerateOptions,
    resolver: TypeResolver,
    required: Vec<(&'static str, &'static str)>,
}

/// Everything needed to emit one `def`.
struct DefSpec<'a> {
    decorators: Vec<String>,
    is_async: bool,
    name: String,
    params: Vec<String>,
    returns: Option<String>,
    doc: Option<&'a str>,
    body: Option<&'a [Stmt]>,
    prologue: Vec<Stmt>,
}

impl PythonGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            options,
            resolver: TypeResolver::python(),
            required: Vec::new(),
        }
    }

    /// Emit a whole file to Python source.
    pub fn emit(file: &SourceFile, options: &GenerateOptions) -> Result<String, GenerateError> {
        let mut generator = Self::new(*options);
        generator.generate_file(file)?;
        Ok(generator.finish())
    }

    /// Text emitted so far.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn finish(self) -> String {
        self.output
    }

    /// Current nesting depth; zero between top-level constructs.
    pub fn indent_depth(&self) -> usize {
        self.indent
    }

    pub fn generate_file(&mut self, file: &SourceFile) -> Result<(), GenerateError> {
        tracing::debug!(
            file = %file.file_name,
            types = file.type_count(),
            functions = file.functions.len(),
            "generating python"
        );
        if let Some(raw) = &file.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }

        // Python modules are namespaces: flatten them.
        let mut types: Vec<&TypeDecl> = file.types.iter().collect();
        let mut raw_namespaces = Vec::new();
        flatten_namespaces(&file.namespaces, &mut types, &mut raw_namespaces);

        // Bodies first: they decide which imports are required.
        let mut body = Vec::new();
        for ty in &types {
            body.push(self.chunk(|g| g.generate_type(ty))?);
        }
        for raw in raw_namespaces {
            body.push(self.chunk(|g| {
                g.write_raw(raw);
                Ok(())
            })?);
        }
        for function in &file.functions {
            body.push(self.chunk(|g| g.generate_member(function, None))?);
        }
        if !file.statements.is_empty() {
            body.push(self.chunk(|g| {
                g.write_statements(&file.statements);
                Ok(())
            })?);
        }
        let typevars = self.chunk(|g| {
            g.write_typevars(&types);
            Ok(())
        })?;
        let imports = self.chunk(|g| {
            g.write_imports(&file.imports);
            Ok(())
        })?;

        let mut chunks = Vec::new();
        if let Some(doc) = &file.meta.doc {
            chunks.push(self.chunk(|g| {
                g.write_docstring(doc);
                Ok(())
            })?);
        }
        chunks.push(imports);
        chunks.push(typevars);
        chunks.extend(body);
        chunks.retain(|c| !c.is_empty());
        self.output.push_str(&chunks.join("\n\n"));
        Ok(())
    }

    /// Emit a type declaration at the current indent.
    pub fn generate_type(&mut self, ty: &TypeDecl) -> Result<(), GenerateError> {
        if let Some(raw) = &ty.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }
        if matches!(ty.kind, TypeKind::Delegate { .. }) {
            return Err(GenerateError::unsupported(NodeKind::Delegate, Some(ty.name())));
        }

        if ty.kind == TypeKind::Struct {
            self.require("dataclasses", "dataclass");
            self.line("@dataclass");
        }
        for annotation in &ty.meta.annotations {
            let text = decorator_text(annotation);
            self.line(&text);
        }

        let bases = self.base_list(ty);
        if bases.is_empty() {
            self.line(&format!("class {}:", ty.name()));
        } else {
            self.line(&format!("class {}({}):", ty.name(), bases.join(", ")));
        }

        self.indent += 1;
        let result = self.write_type_body(ty);
        self.indent -= 1;
        result
    }

    /// Emit a member at the current indent. `owner` is the declaring type;
    /// `None` renders a module-level function.
    pub fn generate_member(
        &mut self,
        member: &Member,
        owner: Option<&TypeDecl>,
    ) -> Result<(), GenerateError> {
        if let Some(raw) = &member.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }
        let in_type = owner.is_some();
        match &member.kind {
            MemberKind::Field { .. } => {
                self.write_class_attribute(member, true);
                Ok(())
            }
            MemberKind::Property { .. } if member.is_data() => {
                self.write_class_attribute(member, true);
                Ok(())
            }
            MemberKind::Property {
                ty, getter, setter, ..
            } => self.write_property(member, ty.as_ref(), getter.as_ref(), setter.as_ref()),
            MemberKind::Method {
                return_type,
                parameters,
                body,
                ..
            } => {
                let mut decorators = self.decorators(member);
                let is_static = member.is_static();
                if in_type && is_static {
                    decorators.push("@staticmethod".into());
                }
                if member.has_modifier(Modifiers::ABSTRACT) {
                    self.require("abc", "abstractmethod");
                    decorators.push("@abstractmethod".into());
                }
                let params = self.param_list(in_type && !is_static, parameters);
                let returns = return_type.as_ref().map(|t| self.type_text(t));
                self.write_def(DefSpec {
                    decorators,
                    is_async: member.has_modifier(Modifiers::ASYNC),
                    name: member_name(member),
                    params,
                    returns,
                    doc: member.meta.doc.as_deref(),
                    body: body.as_deref(),
                    prologue: Vec::new(),
                })
            }
            MemberKind::Constructor { .. } => self.write_constructor(member, Vec::new()),
            MemberKind::Event { .. } => Err(GenerateError::unsupported(
                NodeKind::Event,
                Some(member.name()),
            )),
            MemberKind::Indexer {
                ty,
                parameters,
                getter,
                setter,
            } => self.write_indexer(member, ty, parameters, getter.as_ref(), setter.as_ref()),
            MemberKind::Operator {
                symbol,
                return_type,
                parameters,
                body,
            } => {
                let Some(dunder) = operator_dunder(symbol, parameters.len()) else {
                    return Err(GenerateError::unsupported(
                        NodeKind::Operator,
                        Some(member.name()),
                    ));
                };
                let mut params = vec!["self".to_string()];
                for param in parameters.iter().skip(1) {
                    params.push(self.param_text(param));
                }
                let returns = return_type.as_ref().map(|t| self.type_text(t));
                self.write_def(DefSpec {
                    decorators: self.decorators(member),
                    is_async: false,
                    name: dunder.to_string(),
                    params,
                    returns,
                    doc: member.meta.doc.as_deref(),
                    body: body.as_deref(),
                    prologue: Vec::new(),
                })
            }
        }
    }

    /// Emit a statement at the current indent.
    pub fn generate_statement(&mut self, stmt: &Stmt) -> Result<(), GenerateError> {
        self.write_stmt(stmt);
        Ok(())
    }

    /// Append a type reference inline (no indent, no newline).
    pub fn generate_type_reference(&mut self, ty: &TypeRef) -> Result<(), GenerateError> {
        let text = self.type_text(ty);
        self.output.push_str(&text);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout helpers
    // ------------------------------------------------------------------

    /// Render into a detached buffer and return the text.
    fn chunk(
        &mut self,
        render: impl FnOnce(&mut Self) -> Result<(), GenerateError>,
    ) -> Result<String, GenerateError> {
        let saved = std::mem::take(&mut self.output);
        let result = render(self);
        let text = std::mem::replace(&mut self.output, saved);
        result.map(|()| text)
    }

    fn write_indent(&mut self) {
        let width = self.indent * self.options.indent_width;
        self.output.extend(std::iter::repeat_n(' ', width));
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            self.write_indent();
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    /// Raw text: the first line takes the current indent, the rest is verbatim.
    fn write_raw(&mut self, text: &str) {
        let mut lines = text.lines();
        self.line(lines.next().unwrap_or(""));
        for rest in lines {
            self.output.push_str(rest);
            self.output.push('\n');
        }
    }

    /// Raw statement text: every line at the current indent.
    fn write_lines(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line.trim_end());
        }
    }

    fn write_docstring(&mut self, doc: &str) {
        let lines: Vec<&str> = doc.trim().lines().collect();
        match lines.as_slice() {
            [] => {}
            [only] => self.line(&format!("\"\"\"{}\"\"\"", only.trim())),
            [first, rest @ ..] => {
                self.line(&format!("\"\"\"{}", first.trim()));
                for line in rest {
                    self.line(line.trim_end());
                }
                self.line("\"\"\"");
            }
        }
    }

    fn require(&mut self, module: &'static str, name: &'static str) {
        if !self.required.contains(&(module, name)) {
            self.required.push((module, name));
        }
    }

    fn type_text(&mut self, ty: &TypeRef) -> String {
        let mut names = Vec::new();
        self.resolver.typing_imports(ty, &mut names);
        for name in names {
            self.require("typing", name);
        }
        self.resolver.resolve(ty)
    }

    // ------------------------------------------------------------------
    // File level
    // ------------------------------------------------------------------

    fn write_imports(&mut self, imports: &[Import]) {
        for import in imports {
            if let Some(raw) = &import.meta.raw_code {
                self.write_raw(raw);
                continue;
            }
            let alias = import
                .alias
                .as_deref()
                .map(|a| format!(" as {}", a))
                .unwrap_or_default();
            if import.names.is_empty() {
                self.line(&format!("import {}{}", import.module, alias));
            } else if import.names.len() == 1 {
                self.line(&format!("from {} import {}{}", import.module, import.names[0], alias));
            } else {
                self.line(&format!("from {} import {}", import.module, import.names.join(", ")));
            }
        }

        for module in REQUIRED_MODULES {
            let mut names: Vec<&str> = self
                .required
                .iter()
                .filter(|(m, name)| m == module && !imports.iter().any(|i| i.provides(m, name)))
                .map(|(_, name)| *name)
                .collect();
            if names.is_empty() {
                continue;
            }
            names.sort_unstable();
            self.line(&format!("from {} import {}", module, names.join(", ")));
        }
    }

    fn write_typevars(&mut self, types: &[&TypeDecl]) {
        let mut params: Vec<&GenericParam> = Vec::new();
        for ty in types {
            ty.walk(&mut |t| {
                for param in &t.generic_params {
                    if !params.iter().any(|p| p.name == param.name) {
                        params.push(param);
                    }
                }
            });
        }
        if params.is_empty() {
            return;
        }
        self.require("typing", "TypeVar");
        for param in params {
            match param.constraints.first() {
                Some(bound) => {
                    let bound = self.type_text(bound);
                    self.line(&format!(
                        "{} = TypeVar(\"{}\", bound={})",
                        param.name, param.name, bound
                    ));
                }
                None => self.line(&format!("{} = TypeVar(\"{}\")", param.name, param.name)),
            }
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn base_list(&mut self, ty: &TypeDecl) -> Vec<String> {
        let mut bases = Vec::new();
        if ty.kind == TypeKind::Enum {
            for base in &ty.base_types {
                if let Some(name) = ENUM_BASES.iter().find(|b| **b == base.simple_name()) {
                    self.require("enum", name);
                    bases.push(name.to_string());
                }
            }
            if bases.is_empty() {
                self.require("enum", "Enum");
                bases.push("Enum".into());
            }
        } else {
            for base in &ty.base_types {
                let text = self.type_text(base);
                bases.push(text);
            }
        }
        if ty.kind == TypeKind::Interface && !bases.iter().any(|b| b == "Protocol") {
            self.require("typing", "Protocol");
            bases.push("Protocol".into());
        }
        if !ty.generic_params.is_empty() {
            self.require("typing", "Generic");
            let names: Vec<&str> = ty.generic_params.iter().map(|p| p.name.as_str()).collect();
            bases.push(format!("Generic[{}]", names.join(", ")));
        }
        bases
    }

    fn write_type_body(&mut self, ty: &TypeDecl) -> Result<(), GenerateError> {
        let mut chunks = Vec::new();
        if let Some(doc) = &ty.meta.doc {
            chunks.push(self.chunk(|g| {
                g.write_docstring(doc);
                Ok(())
            })?);
        }

        let synthesize = self.options.synthesize_initializers && ty.kind == TypeKind::Class;
        let is_class_attribute = |m: &Member| {
            m.is_static() || m.has_modifier(Modifiers::CONST) || m.meta.raw_code.is_some()
        };
        let (data, rest): (Vec<&Member>, Vec<&Member>) = ty
            .members
            .iter()
            .partition(|m| m.is_data() && m.meta.raw_code.is_none());
        let (statics, instance): (Vec<&Member>, Vec<&Member>) =
            data.into_iter().partition(|m| is_class_attribute(m));

        let data_chunk = self.chunk(|g| {
            match ty.kind {
                TypeKind::Enum => {
                    for member in statics.iter().chain(&instance) {
                        g.write_enum_value(member);
                    }
                }
                TypeKind::Class => {
                    for member in &statics {
                        g.write_class_attribute(member, true);
                    }
                    if !synthesize {
                        for member in &instance {
                            g.write_field_declaration(member, false);
                        }
                    }
                }
                _ => {
                    for member in &statics {
                        g.write_class_attribute(member, false);
                    }
                    for member in &instance {
                        g.write_field_declaration(member, ty.kind == TypeKind::Struct);
                    }
                }
            }
            Ok(())
        })?;
        chunks.push(data_chunk);

        let initializers: Vec<Stmt> = if synthesize {
            instance.iter().map(|m| self.initializer(m)).collect()
        } else {
            Vec::new()
        };
        let has_constructor = rest
            .iter()
            .any(|m| matches!(m.kind, MemberKind::Constructor { .. }) && m.meta.raw_code.is_none());
        if !initializers.is_empty() && !has_constructor {
            let init = Member::constructor(ty.name(), Vec::new(), Vec::new());
            let prologue = initializers.clone();
            chunks.push(self.chunk(|g| g.write_constructor(&init, prologue))?);
        }

        let mut pending = if has_constructor { Some(initializers) } else { None };
        for member in rest {
            let text = match &member.kind {
                MemberKind::Constructor { .. } if member.meta.raw_code.is_none() => {
                    let prologue = pending.take().unwrap_or_default();
                    self.chunk(|g| g.write_constructor(member, prologue))?
                }
                _ => self.chunk(|g| g.generate_member(member, Some(ty)))?,
            };
            chunks.push(text);
        }

        for nested in &ty.nested_types {
            chunks.push(self.chunk(|g| g.generate_type(nested))?);
        }

        chunks.retain(|c| !c.is_empty());
        let only_comments = chunks
            .iter()
            .flat_map(|c| c.lines())
            .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
        if !chunks.is_empty() {
            self.output.push_str(&chunks.join("\n"));
        }
        if only_comments {
            self.line("pass");
        }
        Ok(())
    }

    fn initializer(&mut self, member: &Member) -> Stmt {
        let value = match member.initial_value() {
            Some(value) => python_literal(value),
            None => self.resolver.default_value(member.data_type()).to_string(),
        };
        Stmt::assign(format!("self.{}", member_name(member)), value)
    }

    fn write_enum_value(&mut self, member: &Member) {
        let name = to_screaming_snake_case(member.name());
        match member.initial_value() {
            Some(value) => self.line(&format!("{} = {}", name, python_literal(value))),
            None => {
                self.require("enum", "auto");
                self.line(&format!("{} = auto()", name));
            }
        }
    }

    /// `name: T = value` at class level.
    fn write_class_attribute(&mut self, member: &Member, annotated: bool) {
        let name = member_name(member);
        let value = match member.initial_value() {
            Some(value) => python_literal(value),
            None => self.resolver.default_value(member.data_type()).to_string(),
        };
        match member.data_type() {
            Some(ty) if annotated => {
                let ty = self.type_text(ty);
                self.line(&format!("{}: {} = {}", name, ty, value));
            }
            _ => self.line(&format!("{} = {}", name, value)),
        }
    }

    /// `name: T`, with `= value` when `with_value` and one is set.
    fn write_field_declaration(&mut self, member: &Member, with_value: bool) {
        let name = member_name(member);
        let ty = match member.data_type() {
            Some(ty) => self.type_text(ty),
            None => {
                self.require("typing", "Any");
                "Any".to_string()
            }
        };
        match member.initial_value() {
            Some(value) if with_value => {
                self.line(&format!("{}: {} = {}", name, ty, python_literal(value)))
            }
            _ => self.line(&format!("{}: {}", name, ty)),
        }
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn decorators(&self, member: &Member) -> Vec<String> {
        member.meta.annotations.iter().map(decorator_text).collect()
    }

    fn param_text(&mut self, param: &Parameter) -> String {
        let prefix = match param.kind {
            ParamKind::VarArgs => "*",
            ParamKind::KwArgs => "**",
            _ => "",
        };
        let mut text = format!("{}{}", prefix, to_snake_case(&param.name));
        if let Some(ty) = &param.ty {
            // `params T[]` collects elements of `T`.
            let ty = if param.kind == ParamKind::VarArgs && ty.is_array() {
                TypeRef {
                    array_rank: ty.array_rank - 1,
                    ..ty.clone()
                }
            } else {
                ty.clone()
            };
            text.push_str(": ");
            text.push_str(&self.type_text(&ty));
        }
        if let Some(default) = &param.default_value {
            text.push_str(" = ");
            text.push_str(&python_literal(default));
        }
        text
    }

    fn param_list(&mut self, with_self: bool, params: &[Parameter]) -> Vec<String> {
        let mut out = Vec::new();
        if with_self {
            out.push("self".to_string());
        }
        for param in params {
            out.push(self.param_text(param));
        }
        out
    }

    fn write_def(&mut self, def: DefSpec<'_>) -> Result<(), GenerateError> {
        for decorator in &def.decorators {
            self.line(decorator);
        }
        let keyword = if def.is_async { "async def" } else { "def" };
        let returns = def
            .returns
            .map(|r| format!(" -> {}", r))
            .unwrap_or_default();
        self.line(&format!(
            "{} {}({}){}:",
            keyword,
            def.name,
            def.params.join(", "),
            returns
        ));

        self.indent += 1;
        if let Some(doc) = def.doc {
            self.write_docstring(doc);
        }
        match def.body {
            None if def.prologue.is_empty() => self.line("..."),
            body => {
                let body = body.unwrap_or_default();
                for stmt in def.prologue.iter().chain(body) {
                    self.write_stmt(stmt);
                }
                if is_effectively_empty(&def.prologue) && is_effectively_empty(body) {
                    self.line("pass");
                }
            }
        }
        self.indent -= 1;
        Ok(())
    }

    /// `__init__`, with `prologue` assignments inserted after the base call,
    /// skipping any the constructor already makes.
    fn write_constructor(&mut self, member: &Member, prologue: Vec<Stmt>) -> Result<(), GenerateError> {
        if let Some(raw) = &member.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }
        let MemberKind::Constructor {
            parameters,
            base_call,
            body,
        } = &member.kind
        else {
            return self.generate_member(member, None);
        };

        let assigned: Vec<&str> = body
            .iter()
            .flatten()
            .filter_map(|s| match &s.kind {
                StmtKind::Assignment { target, .. } => Some(target.trim()),
                _ => None,
            })
            .collect();
        let mut lead = Vec::new();
        if let Some(args) = base_call {
            lead.push(Stmt::raw(format!("super().__init__({})", args)));
        }
        lead.extend(prologue.into_iter().filter(|s| match &s.kind {
            StmtKind::Assignment { target, .. } => !assigned.contains(&target.as_str()),
            _ => true,
        }));

        let params = self.param_list(true, parameters);
        self.write_def(DefSpec {
            decorators: self.decorators(member),
            is_async: false,
            name: "__init__".into(),
            params,
            returns: None,
            doc: member.meta.doc.as_deref(),
            body: body.as_deref(),
            prologue: lead,
        })
    }

    fn write_property(
        &mut self,
        member: &Member,
        ty: Option<&TypeRef>,
        getter: Option<&Accessor>,
        setter: Option<&Accessor>,
    ) -> Result<(), GenerateError> {
        let name = member_name(member);
        let backing = format!("self._{}", name.trim_start_matches('_'));
        let returns = ty.map(|t| self.type_text(t));

        let getter_body = match getter {
            Some(Accessor { body: Some(body), .. }) => body.clone(),
            Some(_) => vec![Stmt::return_stmt(Some(backing.clone()))],
            None => vec![Stmt::throw(Some(format!(
                "AttributeError(\"{} is write-only\")",
                name
            )))],
        };
        let mut decorators = self.decorators(member);
        decorators.push("@property".into());
        if member.has_modifier(Modifiers::ABSTRACT) {
            self.require("abc", "abstractmethod");
            decorators.push("@abstractmethod".into());
        }
        self.write_def(DefSpec {
            decorators,
            is_async: false,
            name: name.clone(),
            params: vec!["self".into()],
            returns: returns.clone(),
            doc: member.meta.doc.as_deref(),
            body: Some(getter_body.as_slice()),
            prologue: Vec::new(),
        })?;

        if let Some(setter) = setter {
            let setter_body = match &setter.body {
                Some(body) => body.clone(),
                None => vec![Stmt::assign(backing, "value")],
            };
            let value = match &returns {
                Some(ty) => format!("value: {}", ty),
                None => "value".to_string(),
            };
            self.output.push('\n');
            self.write_def(DefSpec {
                decorators: vec![format!("@{}.setter", name)],
                is_async: false,
                name,
                params: vec!["self".into(), value],
                returns: Some("None".into()),
                doc: None,
                body: Some(setter_body.as_slice()),
                prologue: Vec::new(),
            })?;
        }
        Ok(())
    }

    fn write_indexer(
        &mut self,
        member: &Member,
        ty: &TypeRef,
        parameters: &[Parameter],
        getter: Option<&Accessor>,
        setter: Option<&Accessor>,
    ) -> Result<(), GenerateError> {
        let element = self.type_text(ty);
        let params = self.param_list(true, parameters);

        if let Some(getter) = getter {
            self.write_def(DefSpec {
                decorators: self.decorators(member),
                is_async: false,
                name: "__getitem__".into(),
                params: params.clone(),
                returns: Some(element.clone()),
                doc: member.meta.doc.as_deref(),
                body: getter.body.as_deref(),
                prologue: Vec::new(),
            })?;
        }
        if let Some(setter) = setter {
            if getter.is_some() {
                self.output.push('\n');
            }
            let mut params = params;
            params.push(format!("value: {}", element));
            self.write_def(DefSpec {
                decorators: if getter.is_some() {
                    Vec::new()
                } else {
                    self.decorators(member)
                },
                is_async: false,
                name: "__setitem__".into(),
                params,
                returns: Some("None".into()),
                doc: None,
                body: setter.body.as_deref(),
                prologue: Vec::new(),
            })?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn write_statements(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.write_stmt(stmt);
        }
    }

    /// An indented block; `pass` when nothing executable is emitted.
    fn write_block(&mut self, stmts: &[Stmt]) {
        self.indent += 1;
        self.write_statements(stmts);
        if is_effectively_empty(stmts) {
            self.line("pass");
        }
        self.indent -= 1;
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        if let Some(raw) = &stmt.meta.raw_code {
            self.write_raw(raw);
            return;
        }
        match &stmt.kind {
            StmtKind::Assignment {
                target,
                operator,
                value,
                declared_type,
            } => {
                let text = match declared_type {
                    Some(ty) if operator == "=" => {
                        let ty = self.type_text(ty);
                        if value.is_empty() {
                            format!("{}: {}", target, ty)
                        } else {
                            format!("{}: {} = {}", target, ty, python_literal(value))
                        }
                    }
                    _ => format!("{} {} {}", target, operator, python_literal(value)),
                };
                self.line(&text);
            }

            StmtKind::Comment(text) => {
                for line in text.lines() {
                    if line.is_empty() {
                        self.line("#");
                    } else {
                        self.line(&format!("# {}", line));
                    }
                }
                if text.is_empty() {
                    self.line("#");
                }
            }

            StmtKind::Raw(text) => {
                let text = python_increment(text).unwrap_or_else(|| text.clone());
                self.write_lines(&text);
            }

            StmtKind::Return(value) => match value {
                Some(value) => self.line(&format!("return {}", python_literal(value))),
                None => self.line("return"),
            },

            StmtKind::Throw(value) => match value {
                Some(value) => {
                    let value = value.trim();
                    let value = value.strip_prefix("new ").unwrap_or(value);
                    self.line(&format!("raise {}", value));
                }
                None => self.line("raise"),
            },

            StmtKind::If {
                condition,
                then_branch,
                else_ifs,
                else_branch,
            } => {
                self.line(&format!("if {}:", condition));
                self.write_block(then_branch);
                for else_if in else_ifs {
                    self.line(&format!("elif {}:", else_if.condition));
                    self.write_block(&else_if.body);
                }
                if let Some(else_branch) = else_branch {
                    self.line("else:");
                    self.write_block(else_branch);
                }
            }

            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                // C-style for loops don't exist in Python: lower to a while loop.
                self.line(&format!(
                    "# for ({}; {}; {})",
                    init.as_deref().map(c_text).unwrap_or_default(),
                    condition,
                    increment.as_deref().map(c_text).unwrap_or_default()
                ));
                if let Some(init) = init {
                    self.write_stmt(init);
                }
                let condition = if condition.trim().is_empty() {
                    "True"
                } else {
                    condition.as_str()
                };
                self.line(&format!("while {}:", condition));
                let mut body = body.clone();
                if let Some(increment) = increment {
                    body.push(increment.as_ref().clone());
                }
                self.write_block(&body);
            }

            StmtKind::ForEach {
                variable,
                iterable,
                body,
                ..
            } => {
                self.line(&format!("for {} in {}:", variable, iterable));
                self.write_block(body);
            }

            StmtKind::While { condition, body } => {
                self.line(&format!("while {}:", condition));
                self.write_block(body);
            }

            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                self.line(&format!("match {}:", subject));
                self.indent += 1;
                for case in cases {
                    if case.labels.is_empty() {
                        self.line("case _:");
                    } else {
                        self.line(&format!("case {}:", case.labels.join(" | ")));
                    }
                    self.write_block(&case.body);
                }
                if let Some(default) = default {
                    self.line("case _:");
                    self.write_block(default);
                }
                self.indent -= 1;
            }

            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.line("try:");
                self.write_block(body);
                for catch in catches {
                    let ty = match (&catch.exception_type, &catch.variable) {
                        (Some(ty), _) => Some(self.type_text(ty)),
                        (None, Some(_)) => Some("Exception".to_string()),
                        (None, None) => None,
                    };
                    match (ty, &catch.variable) {
                        (Some(ty), Some(var)) => self.line(&format!("except {} as {}:", ty, var)),
                        (Some(ty), None) => self.line(&format!("except {}:", ty)),
                        _ => self.line("except:"),
                    }
                    let mut handler = Vec::new();
                    if let Some(filter) = &catch.filter {
                        handler.push(Stmt::if_stmt(
                            format!("not ({})", filter),
                            vec![Stmt::throw(None::<String>)],
                            None,
                        ));
                    }
                    handler.extend(catch.body.iter().cloned());
                    self.write_block(&handler);
                }
                match finally {
                    Some(finally) => {
                        self.line("finally:");
                        self.write_block(finally);
                    }
                    None if catches.is_empty() => {
                        self.line("finally:");
                        self.write_block(&[]);
                    }
                    None => {}
                }
            }

            StmtKind::Using {
                resource,
                variable,
                body,
            } => {
                match variable {
                    Some(var) => self.line(&format!("with {} as {}:", resource, var)),
                    None => self.line(&format!("with {}:", resource)),
                }
                self.write_block(body);
            }

            StmtKind::Block(stmts) => self.write_statements(stmts),
        }
    }
}

impl Default for PythonGenerator {
    fn default() -> Self {
        Self::new(GenerateOptions::default())
    }
}

/// Python spelling of a member name: dunders untouched, constants in
/// screaming case, hidden members prefixed with `_`.
pub(crate) fn member_name(member: &Member) -> String {
    let name = member.name();
    if is_dunder(name) {
        return name.to_string();
    }
    let base = if member.has_modifier(Modifiers::CONST) {
        to_screaming_snake_case(name)
    } else {
        to_snake_case(name)
    };
    if member.meta.access.is_hidden() && !base.starts_with('_') {
        format!("_{}", base)
    } else {
        base
    }
}

/// Collect the types of `namespaces`; namespaces with a raw override are
/// kept whole.
fn flatten_namespaces<'a>(
    namespaces: &'a [Namespace],
    types: &mut Vec<&'a TypeDecl>,
    raw: &mut Vec<&'a str>,
) {
    for ns in namespaces {
        match &ns.meta.raw_code {
            Some(code) => raw.push(code),
            None => {
                types.extend(ns.types.iter());
                flatten_namespaces(&ns.namespaces, types, raw);
            }
        }
    }
}

fn decorator_text(annotation: &Annotation) -> String {
    if annotation.arguments.is_empty() {
        format!("@{}", annotation.name)
    } else {
        format!("@{}({})", annotation.name, annotation.arguments.join(", "))
    }
}

/// Literal keywords written the C-family way.
fn python_literal(text: &str) -> String {
    match text.trim() {
        "null" => "None".into(),
        "true" => "True".into(),
        "false" => "False".into(),
        _ => text.to_string(),
    }
}

/// `i++` / `--i` as an augmented assignment.
fn python_increment(text: &str) -> Option<String> {
    let text = text.trim().trim_end_matches(';');
    let (target, op) = if let Some(t) = text.strip_suffix("++").or_else(|| text.strip_prefix("++")) {
        (t, "+=")
    } else if let Some(t) = text.strip_suffix("--").or_else(|| text.strip_prefix("--")) {
        (t, "-=")
    } else {
        return None;
    };
    let target = target.trim();
    let valid = !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    valid.then(|| format!("{} {} 1", target, op))
}

/// A for-loop clause as it would read in the header.
fn c_text(stmt: &Stmt) -> String {
    match &stmt.kind {
        StmtKind::Assignment {
            target,
            operator,
            value,
            ..
        } => format!("{} {} {}", target, operator, value),
        StmtKind::Raw(text) => text.trim().to_string(),
        _ => stmt.meta.raw_code.clone().unwrap_or_default(),
    }
}

/// Whether emitting `stmts` produces no executable line.
fn is_effectively_empty(stmts: &[Stmt]) -> bool {
    stmts.iter().all(|s| {
        s.meta.raw_code.is_none()
            && match &s.kind {
                StmtKind::Comment(_) => true,
                StmtKind::Block(inner) => is_effectively_empty(inner),
                _ => false,
            }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(file: &SourceFile) -> String {
        PythonGenerator::emit(file, &GenerateOptions::default()).unwrap()
    }

    fn emit_stmt(stmt: &Stmt) -> String {
        let mut generator = PythonGenerator::default();
        generator.generate_statement(stmt).unwrap();
        assert_eq!(generator.indent_depth(), 0);
        generator.finish()
    }

    #[test]
    fn test_simple_assignment() {
        let file = SourceFile::new("main", Language::Python).with_statement(Stmt::assign("x", "42"));
        assert_eq!(emit(&file), "x = 42\n");
    }

    #[test]
    fn test_c_style_for_becomes_while() {
        let stmt = Stmt::for_loop(
            Some(Stmt::assign("i", "0")),
            "i < 10",
            Some(Stmt::raw("i++")),
            vec![Stmt::raw("print(i)")],
        );
        assert_eq!(
            emit_stmt(&stmt),
            "# for (i = 0; i < 10; i++)\ni = 0\nwhile i < 10:\n    print(i)\n    i += 1\n"
        );
    }

    #[test]
    fn test_for_without_condition() {
        let stmt = Stmt::for_loop(None, "", None, vec![]);
        assert_eq!(emit_stmt(&stmt), "# for (; ; )\nwhile True:\n    pass\n");
    }

    #[test]
    fn test_switch_becomes_match() {
        let stmt = Stmt::switch(
            "command",
            vec![
                SwitchCase::new(vec!["\"start\"".into(), "\"go\"".into()], vec![Stmt::raw("run()")]),
                SwitchCase::new(vec!["\"stop\"".into()], vec![]),
            ],
            Some(vec![Stmt::raw("fail()")]),
        );
        assert_eq!(
            emit_stmt(&stmt),
            "match command:\n    case \"start\" | \"go\":\n        run()\n    case \"stop\":\n        pass\n    case _:\n        fail()\n"
        );
    }

    #[test]
    fn test_try_catch_rules() {
        let stmt = Stmt::try_catch(
            vec![Stmt::raw("work()")],
            vec![
                CatchClause::new(Some(TypeRef::new("ValueError")), None, vec![]),
                CatchClause::new(None, Some("e".into()), vec![Stmt::raw("log(e)")])
                    .with_filter("e.retryable"),
            ],
            None,
        );
        assert_eq!(
            emit_stmt(&stmt),
            "try:\n    work()\nexcept ValueError:\n    pass\nexcept Exception as e:\n    if not (e.retryable):\n        raise\n    log(e)\n"
        );
    }

    #[test]
    fn test_bare_try_gets_finally() {
        let stmt = Stmt::try_catch(vec![Stmt::raw("work()")], vec![], None);
        assert_eq!(emit_stmt(&stmt), "try:\n    work()\nfinally:\n    pass\n");
    }

    #[test]
    fn test_throw_drops_new() {
        let stmt = Stmt::throw(Some("new ValueError(\"bad\")"));
        assert_eq!(emit_stmt(&stmt), "raise ValueError(\"bad\")\n");
    }

    #[test]
    fn test_comment_only_body_gets_pass() {
        let stmt = Stmt::while_loop("busy()", vec![Stmt::comment("spin")]);
        assert_eq!(emit_stmt(&stmt), "while busy():\n    # spin\n    pass\n");
    }

    #[test]
    fn test_fields_synthesize_init() {
        let file = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::class("Counter")
                .with_member(Member::field("Count", TypeRef::new("int")))
                .with_member(
                    Member::field("Label", TypeRef::new("string")).with_access(Access::Private),
                )
                .with_member(
                    Member::field("Limit", TypeRef::new("int"))
                        .with_modifiers(Modifiers::STATIC | Modifiers::CONST)
                        .with_initial_value("10"),
                ),
        );
        assert_eq!(
            emit(&file),
            "class Counter:\n    LIMIT: int = 10\n\n    def __init__(self):\n        self.count = 0\n        self._label = \"\"\n"
        );
    }

    #[test]
    fn test_fields_prepend_to_constructor() {
        let ctor = Member::constructor(
            "Point",
            vec![Parameter::typed("x", TypeRef::new("int"))],
            vec![Stmt::assign("self.x", "x")],
        );
        let file = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::class("Point")
                .with_member(Member::field("X", TypeRef::new("int")))
                .with_member(Member::field("Y", TypeRef::new("int")))
                .with_member(ctor),
        );
        assert_eq!(
            emit(&file),
            "class Point:\n    def __init__(self, x: int):\n        self.y = 0\n        self.x = x\n"
        );
    }

    #[test]
    fn test_enum_values() {
        let file = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::enumeration("Color")
                .with_member(Member::field("Red", TypeRef::new("int")).with_initial_value("1"))
                .with_member(Member::field("DarkBlue", TypeRef::new("int"))),
        );
        assert_eq!(
            emit(&file),
            "from enum import Enum, auto\n\n\nclass Color(Enum):\n    RED = 1\n    DARK_BLUE = auto()\n"
        );
    }

    #[test]
    fn test_generic_class_declares_typevars() {
        let file = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::class("Box").with_generic(GenericParam::new("T")),
        );
        assert_eq!(
            emit(&file),
            "from typing import Generic, TypeVar\n\n\nT = TypeVar(\"T\")\n\n\nclass Box(Generic[T]):\n    pass\n"
        );
    }

    #[test]
    fn test_existing_import_not_duplicated() {
        let file = SourceFile::new("m", Language::Python)
            .with_import(Import::from("typing", vec!["Protocol".into()]))
            .with_type(TypeDecl::interface("Shape"));
        assert_eq!(
            emit(&file),
            "from typing import Protocol\n\n\nclass Shape(Protocol):\n    pass\n"
        );
    }

    #[test]
    fn test_unsupported_constructs() {
        let delegate = SourceFile::new("m", Language::Python)
            .with_type(TypeDecl::delegate("Handler", vec![], None));
        let err = PythonGenerator::emit(&delegate, &GenerateOptions::default()).unwrap_err();
        assert_eq!(err, GenerateError::unsupported(NodeKind::Delegate, Some("Handler")));

        let event = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::class("Button").with_member(Member::event("Clicked", TypeRef::new("Handler"))),
        );
        let err = PythonGenerator::emit(&event, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::UnsupportedConstruct { kind: NodeKind::Event, .. }
        ));

        let op = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::class("V").with_member(Member::operator(
                "<=>",
                vec![Parameter::new("a"), Parameter::new("b")],
                None,
                vec![],
            )),
        );
        let err = PythonGenerator::emit(&op, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::UnsupportedConstruct { kind: NodeKind::Operator, .. }
        ));
    }

    #[test]
    fn test_raw_code_overrides_node() {
        let raw = TypeDecl::class("Ignored").with_raw_code("class Custom:\n    x = 1");
        let file = SourceFile::new("m", Language::Python).with_type(raw);
        assert_eq!(emit(&file), "class Custom:\n    x = 1\n");
    }

    #[test]
    fn test_increment_lowering() {
        assert_eq!(python_increment("i++").as_deref(), Some("i += 1"));
        assert_eq!(python_increment("--self.count").as_deref(), Some("self.count -= 1"));
        assert_eq!(python_increment("a + b"), None);
    }
}
