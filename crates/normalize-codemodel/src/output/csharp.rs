//! C# generator for the code model.
//!
//! Brace-style output with Allman braces. Every IR kind has a C# rendering,
//! so this generator never reports an unsupported construct. Module-level
//! functions and statements, which C# has no home for, are hosted in a
//! static `<Stem>Module` class: functions as static methods, statements in
//! its static constructor.

use crate::ir::*;
use crate::naming::{to_camel_case, to_pascal_case};
use crate::resolve::TypeResolver;
use crate::traits::{GenerateError, GenerateOptions, Generator};

/// Static instance of the C# generator for registry.
pub static CSHARP_GENERATOR: CSharpGeneratorImpl = CSharpGeneratorImpl;

/// C# generator implementing the Generator trait.
pub struct CSharpGeneratorImpl;

impl Generator for CSharpGeneratorImpl {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn generate(&self, file: &SourceFile, options: &GenerateOptions) -> Result<String, GenerateError> {
        CSharpGenerator::emit(file, options)
    }
}

/// Python modules with no .NET counterpart; imports of them are dropped.
const PYTHON_ONLY_MODULES: &[&str] = &["__future__", "abc", "dataclasses", "enum", "typing"];

/// Emits the code model as C# source code.
pub struct CSharpGenerator {
    output: String,
    indent: usize,
    options: GenerateOptions,
    resolver: TypeResolver,
}

impl CSharpGenerator {
    pub fn new(options: GenerateOptions) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            options,
            resolver: TypeResolver::csharp(),
        }
    }

    /// Emit a whole file to C# source.
    pub fn emit(file: &SourceFile, options: &GenerateOptions) -> Result<String, GenerateError> {
        let mut generator = Self::new(*options);
        generator.generate_file(file)?;
        Ok(generator.finish())
    }

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
            "generating csharp"
        );
        if let Some(raw) = &file.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }

        let mut chunks = Vec::new();
        if let Some(doc) = &file.meta.doc {
            chunks.push(self.chunk(|g| {
                for line in doc.trim().lines() {
                    g.line(&comment_line(line));
                }
                Ok(())
            })?);
        }
        chunks.push(self.chunk(|g| {
            g.write_usings(&file.imports);
            Ok(())
        })?);
        for ns in &file.namespaces {
            chunks.push(self.chunk(|g| g.write_namespace(ns))?);
        }
        for ty in &file.types {
            chunks.push(self.chunk(|g| g.generate_type(ty))?);
        }
        if !file.functions.is_empty() || !file.statements.is_empty() {
            chunks.push(self.chunk(|g| g.write_module_class(file))?);
        }
        chunks.retain(|c| !c.is_empty());
        self.output.push_str(&chunks.join("\n"));
        Ok(())
    }

    /// Emit a type declaration at the current indent.
    pub fn generate_type(&mut self, ty: &TypeDecl) -> Result<(), GenerateError> {
        if let Some(raw) = &ty.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }
        if let Some(doc) = &ty.meta.doc {
            self.write_doc(doc);
        }
        self.write_attributes(&ty.meta.annotations);

        let modifiers = modifier_text(&ty.meta, false);
        let generics = generic_list(&ty.generic_params);
        let wheres = self.where_clauses(&ty.generic_params);

        if let TypeKind::Delegate {
            return_type,
            parameters,
        } = &ty.kind
        {
            let returns = self.return_text(return_type.as_ref());
            let params = self.param_list(parameters);
            self.line(&format!(
                "{}delegate {} {}{}({}){};",
                modifiers,
                returns,
                ty.name(),
                generics,
                params.join(", "),
                wheres
            ));
            return Ok(());
        }

        let keyword = match ty.kind {
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            _ => "class",
        };
        let bases: Vec<String> = ty.base_types.iter().map(|b| self.type_text(b)).collect();
        let bases = if bases.is_empty() {
            String::new()
        } else {
            format!(" : {}", bases.join(", "))
        };
        self.line(&format!(
            "{}{} {}{}{}{}",
            modifiers,
            keyword,
            ty.name(),
            generics,
            bases,
            wheres
        ));

        self.open_block();
        let result = self.write_type_body(ty);
        self.close_block();
        result
    }

    /// Emit a member at the current indent. `owner` is the declaring type;
    /// `None` renders a static module function.
    pub fn generate_member(
        &mut self,
        member: &Member,
        owner: Option<&TypeDecl>,
    ) -> Result<(), GenerateError> {
        if let Some(raw) = &member.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }
        let in_interface = owner.is_some_and(|o| o.kind == TypeKind::Interface);
        if let Some(doc) = &member.meta.doc {
            self.write_doc(doc);
        }
        self.write_attributes(&member.meta.annotations);

        let mut meta = member.meta.clone();
        if owner.is_none() {
            meta.modifiers |= Modifiers::STATIC;
        }
        let modifiers = modifier_text(&meta, in_interface);

        match &member.kind {
            MemberKind::Field { ty, initial_value } => {
                let ty = self.data_type_text(ty.as_ref());
                let name = field_name(member);
                match initial_value {
                    Some(value) => self.line(&format!(
                        "{}{} {} = {};",
                        modifiers,
                        ty,
                        name,
                        csharp_literal(value)
                    )),
                    None => self.line(&format!("{}{} {};", modifiers, ty, name)),
                }
            }

            MemberKind::Property {
                ty,
                getter,
                setter,
                initial_value,
            } => {
                let ty = self.data_type_text(ty.as_ref());
                let header = format!("{}{} {}", modifiers, ty, to_pascal_case(member.name()));
                self.write_accessors(
                    &header,
                    getter.as_ref(),
                    setter.as_ref(),
                    initial_value.as_deref(),
                );
            }

            MemberKind::Method {
                return_type,
                generic_params,
                parameters,
                body,
            } => {
                let returns = self.return_text(return_type.as_ref());
                let params = self.param_list(parameters);
                let header = format!(
                    "{}{} {}{}({}){}",
                    modifiers,
                    returns,
                    to_pascal_case(member.name()),
                    generic_list(generic_params),
                    params.join(", "),
                    self.where_clauses(generic_params)
                );
                self.write_body(&header, body.as_deref());
            }

            MemberKind::Constructor {
                parameters,
                base_call,
                body,
            } => {
                let name = owner.map_or(member.name(), |o| o.name());
                let params = self.param_list(parameters);
                let base = base_call
                    .as_ref()
                    .map(|args| format!(" : base({})", args))
                    .unwrap_or_default();
                let header = format!("{}{}({}){}", modifiers, name, params.join(", "), base);
                self.write_body(&header, body.as_deref());
            }

            MemberKind::Event { ty } => {
                let ty = self.type_text(ty);
                self.line(&format!(
                    "{}event {} {};",
                    modifiers,
                    ty,
                    to_pascal_case(member.name())
                ));
            }

            MemberKind::Indexer {
                ty,
                parameters,
                getter,
                setter,
            } => {
                let ty = self.type_text(ty);
                let params = self.param_list(parameters);
                let header = format!("{}{} this[{}]", modifiers, ty, params.join(", "));
                self.write_accessors(&header, getter.as_ref(), setter.as_ref(), None);
            }

            MemberKind::Operator {
                symbol,
                return_type,
                parameters,
                body,
            } => {
                // Operands without a type are the declaring type.
                let own = owner.map(|o| o.name().to_string());
                let returns = match (return_type, &own) {
                    (Some(ty), _) => self.type_text(ty),
                    (None, Some(own)) => own.clone(),
                    (None, None) => "object".to_string(),
                };
                let params: Vec<String> = parameters
                    .iter()
                    .map(|p| match (&p.ty, &own) {
                        (None, Some(own)) => format!("{} {}", own, to_camel_case(&p.name)),
                        _ => self.param_text(p),
                    })
                    .collect();
                let mut meta = member.meta.clone();
                meta.modifiers |= Modifiers::STATIC;
                let header = format!(
                    "{}{} operator {}({})",
                    modifier_text(&meta, false),
                    returns,
                    symbol,
                    params.join(", ")
                );
                self.write_body(&header, body.as_deref());
            }
        }
        Ok(())
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

    fn open_block(&mut self) {
        self.line("{");
        self.indent += 1;
    }

    fn close_block(&mut self) {
        self.indent -= 1;
        self.line("}");
    }

    fn write_doc(&mut self, doc: &str) {
        let lines: Vec<&str> = doc.trim().lines().collect();
        match lines.as_slice() {
            [] => {}
            [only] => self.line(&format!("/// <summary>{}</summary>", only.trim())),
            _ => {
                self.line("/// <summary>");
                for line in lines {
                    self.line(format!("/// {}", line.trim_end()).trim_end());
                }
                self.line("/// </summary>");
            }
        }
    }

    fn write_attributes(&mut self, annotations: &[Annotation]) {
        for annotation in annotations {
            if annotation.arguments.is_empty() {
                self.line(&format!("[{}]", annotation.name));
            } else {
                self.line(&format!(
                    "[{}({})]",
                    annotation.name,
                    annotation.arguments.join(", ")
                ));
            }
        }
    }

    fn type_text(&self, ty: &TypeRef) -> String {
        self.resolver.resolve(ty)
    }

    fn data_type_text(&self, ty: Option<&TypeRef>) -> String {
        ty.map_or_else(|| "object".to_string(), |t| self.type_text(t))
    }

    fn return_text(&self, ty: Option<&TypeRef>) -> String {
        ty.map_or_else(|| "void".to_string(), |t| self.type_text(t))
    }

    fn where_clauses(&self, params: &[GenericParam]) -> String {
        params
            .iter()
            .filter(|p| !p.constraints.is_empty())
            .map(|p| {
                let constraints: Vec<String> =
                    p.constraints.iter().map(|c| self.type_text(c)).collect();
                format!(" where {} : {}", p.name, constraints.join(", "))
            })
            .collect()
    }

    fn param_text(&self, param: &Parameter) -> String {
        let name = to_camel_case(&param.name);
        let ty = match (&param.kind, &param.ty) {
            (ParamKind::VarArgs, Some(ty)) if ty.is_array() => self.type_text(ty),
            (ParamKind::VarArgs, Some(ty)) => format!("{}[]", self.type_text(ty)),
            (ParamKind::VarArgs, None) => "object[]".to_string(),
            (ParamKind::KwArgs, _) => "IDictionary<string, object>".to_string(),
            (_, ty) => self.data_type_text(ty.as_ref()),
        };
        let prefix = match param.kind {
            ParamKind::Ref => "ref ",
            ParamKind::Out => "out ",
            ParamKind::VarArgs => "params ",
            _ => "",
        };
        let mut text = String::new();
        for annotation in &param.annotations {
            text.push_str(&format!("[{}] ", annotation.name));
        }
        text.push_str(&format!("{}{} {}", prefix, ty, name));
        if let Some(default) = &param.default_value {
            text.push_str(" = ");
            text.push_str(&csharp_literal(default));
        }
        text
    }

    fn param_list(&self, params: &[Parameter]) -> Vec<String> {
        params.iter().map(|p| self.param_text(p)).collect()
    }

    /// `header;` for a body-less member, else `header` and a brace block.
    fn write_body(&mut self, header: &str, body: Option<&[Stmt]>) {
        match body {
            None => self.line(&format!("{};", header)),
            Some(body) => {
                self.line(header);
                self.write_block(body);
            }
        }
    }

    /// Property and indexer accessors: one line when every accessor is auto.
    fn write_accessors(
        &mut self,
        header: &str,
        getter: Option<&Accessor>,
        setter: Option<&Accessor>,
        initial_value: Option<&str>,
    ) {
        let accessors: Vec<(&str, &Accessor)> = [("get", getter), ("set", setter)]
            .into_iter()
            .filter_map(|(keyword, accessor)| accessor.map(|a| (keyword, a)))
            .collect();

        if accessors.iter().all(|(_, a)| a.is_auto()) {
            let parts: Vec<String> = accessors
                .iter()
                .map(|(keyword, a)| format!("{}{};", accessor_access(a), keyword))
                .collect();
            let init = initial_value
                .map(|v| format!(" = {};", csharp_literal(v)))
                .unwrap_or_default();
            self.line(&format!("{} {{ {} }}{}", header, parts.join(" "), init));
            return;
        }

        self.line(header);
        self.open_block();
        for (keyword, accessor) in accessors {
            let header = format!("{}{}", accessor_access(accessor), keyword);
            self.write_body(&header, accessor.body.as_deref());
        }
        self.close_block();
    }

    fn write_usings(&mut self, imports: &[Import]) {
        let mut seen: Vec<String> = Vec::new();
        for import in imports {
            if let Some(raw) = &import.meta.raw_code {
                self.write_raw(raw);
                continue;
            }
            if PYTHON_ONLY_MODULES.contains(&import.module.as_str()) {
                continue;
            }
            let text = match (&import.alias, import.names.as_slice()) {
                (Some(alias), []) => format!("using {} = {};", alias, import.module),
                (Some(alias), [name]) => {
                    format!("using {} = {}.{};", alias, import.module, name)
                }
                _ => format!("using {};", import.module),
            };
            if !seen.contains(&text) {
                self.line(&text);
                seen.push(text);
            }
        }
    }

    fn write_namespace(&mut self, ns: &Namespace) -> Result<(), GenerateError> {
        if let Some(raw) = &ns.meta.raw_code {
            self.write_raw(raw);
            return Ok(());
        }
        if let Some(doc) = &ns.meta.doc {
            self.write_doc(doc);
        }
        self.line(&format!("namespace {}", ns.name()));
        self.open_block();
        let mut chunks = Vec::new();
        for nested in &ns.namespaces {
            chunks.push(self.chunk(|g| g.write_namespace(nested))?);
        }
        for ty in &ns.types {
            chunks.push(self.chunk(|g| g.generate_type(ty))?);
        }
        self.output.push_str(&chunks.join("\n"));
        self.close_block();
        Ok(())
    }

    /// Free functions and statements as a static `<Stem>Module` class.
    fn write_module_class(&mut self, file: &SourceFile) -> Result<(), GenerateError> {
        let name = format!("{}Module", to_pascal_case(&file.file_name));
        self.line(&format!("public static class {}", name));
        self.open_block();
        let mut chunks = Vec::new();
        if !file.statements.is_empty() {
            chunks.push(self.chunk(|g| {
                g.line(&format!("static {}()", name));
                g.write_block(&file.statements);
                Ok(())
            })?);
        }
        for function in &file.functions {
            chunks.push(self.chunk(|g| g.generate_member(function, None))?);
        }
        self.output.push_str(&chunks.join("\n"));
        self.close_block();
        Ok(())
    }

    fn write_type_body(&mut self, ty: &TypeDecl) -> Result<(), GenerateError> {
        if ty.kind == TypeKind::Enum {
            let (values, rest): (Vec<&Member>, Vec<&Member>) = ty
                .members
                .iter()
                .partition(|m| matches!(m.kind, MemberKind::Field { .. }) && m.meta.raw_code.is_none());
            for (i, member) in values.iter().enumerate() {
                if let Some(doc) = &member.meta.doc {
                    self.write_doc(doc);
                }
                let comma = if i + 1 < values.len() { "," } else { "" };
                let name = to_pascal_case(member.name());
                match member.initial_value() {
                    Some(value) => self.line(&format!("{} = {}{}", name, value, comma)),
                    None => self.line(&format!("{}{}", name, comma)),
                }
            }
            // Enums cannot declare other members; keep them verbatim.
            for member in rest {
                if let Some(raw) = &member.meta.raw_code {
                    self.write_raw(raw);
                }
            }
            return Ok(());
        }

        let mut chunks = Vec::new();
        let (data, rest): (Vec<&Member>, Vec<&Member>) = ty.members.iter().partition(|m| {
            m.meta.raw_code.is_none()
                && (matches!(m.kind, MemberKind::Field { .. } | MemberKind::Event { .. })
                    || (matches!(m.kind, MemberKind::Property { .. }) && m.is_data()))
        });
        chunks.push(self.chunk(|g| {
            for member in &data {
                g.generate_member(member, Some(ty))?;
            }
            Ok(())
        })?);
        for member in rest {
            chunks.push(self.chunk(|g| g.generate_member(member, Some(ty)))?);
        }
        for nested in &ty.nested_types {
            chunks.push(self.chunk(|g| g.generate_type(nested))?);
        }
        chunks.retain(|c| !c.is_empty());
        self.output.push_str(&chunks.join("\n"));
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

    fn write_block(&mut self, stmts: &[Stmt]) {
        self.open_block();
        self.write_statements(stmts);
        self.close_block();
    }

    fn write_stmt(&mut self, stmt: &Stmt) {
        if let Some(raw) = &stmt.meta.raw_code {
            self.write_raw(raw);
            return;
        }
        match &stmt.kind {
            StmtKind::Assignment { .. } => {
                let text = self.assignment_text(stmt);
                self.line(&format!("{};", text));
            }

            StmtKind::Comment(text) => {
                for line in text.lines() {
                    self.line(&comment_line(line));
                }
                if text.is_empty() {
                    self.line("//");
                }
            }

            StmtKind::Raw(text) => self.write_lines(text),

            StmtKind::Return(value) => match value {
                Some(value) => self.line(&format!("return {};", csharp_literal(value))),
                None => self.line("return;"),
            },

            StmtKind::Throw(value) => match value {
                Some(value) => self.line(&format!("throw {};", throw_value(value))),
                None => self.line("throw;"),
            },

            StmtKind::If {
                condition,
                then_branch,
                else_ifs,
                else_branch,
            } => {
                self.line(&format!("if ({})", condition));
                self.write_block(then_branch);
                for else_if in else_ifs {
                    self.line(&format!("else if ({})", else_if.condition));
                    self.write_block(&else_if.body);
                }
                if let Some(else_branch) = else_branch {
                    self.line("else");
                    self.write_block(else_branch);
                }
            }

            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                let init = init.as_deref().map(|s| self.assignment_text(s)).unwrap_or_default();
                let increment = increment
                    .as_deref()
                    .map(|s| self.assignment_text(s))
                    .unwrap_or_default();
                self.line(&format!("for ({}; {}; {})", init, condition, increment));
                self.write_block(body);
            }

            StmtKind::ForEach {
                variable,
                variable_type,
                iterable,
                body,
            } => {
                let ty = variable_type
                    .as_ref()
                    .map_or_else(|| "var".to_string(), |t| self.type_text(t));
                self.line(&format!("foreach ({} {} in {})", ty, variable, iterable));
                self.write_block(body);
            }

            StmtKind::While { condition, body } => {
                self.line(&format!("while ({})", condition));
                self.write_block(body);
            }

            StmtKind::Switch {
                subject,
                cases,
                default,
            } => {
                self.line(&format!("switch ({})", subject));
                self.open_block();
                for case in cases {
                    for label in &case.labels {
                        self.line(&format!("case {}:", label));
                    }
                    if case.labels.is_empty() {
                        self.line("default:");
                    }
                    self.write_case_body(&case.body);
                }
                if let Some(default) = default {
                    self.line("default:");
                    self.write_case_body(default);
                }
                self.close_block();
            }

            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.line("try");
                self.write_block(body);
                for catch in catches {
                    let ty = match (&catch.exception_type, &catch.variable) {
                        (Some(ty), _) => Some(self.type_text(ty)),
                        (None, Some(_)) => Some("Exception".to_string()),
                        (None, None) => None,
                    };
                    let mut header = match (ty, &catch.variable) {
                        (Some(ty), Some(var)) => format!("catch ({} {})", ty, var),
                        (Some(ty), None) => format!("catch ({})", ty),
                        _ => "catch".to_string(),
                    };
                    if let Some(filter) = &catch.filter {
                        header.push_str(&format!(" when ({})", filter));
                    }
                    self.line(&header);
                    self.write_block(&catch.body);
                }
                match finally {
                    Some(finally) => {
                        self.line("finally");
                        self.write_block(finally);
                    }
                    None if catches.is_empty() => {
                        self.line("finally");
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
                    Some(var) => self.line(&format!("using (var {} = {})", var, resource)),
                    None => self.line(&format!("using ({})", resource)),
                }
                self.write_block(body);
            }

            StmtKind::Block(stmts) => self.write_block(stmts),
        }
    }

    /// Case bodies fall through to `break;` unless they already leave.
    fn write_case_body(&mut self, body: &[Stmt]) {
        self.indent += 1;
        self.write_statements(body);
        if !body.last().is_some_and(leaves_case) {
            self.line("break;");
        }
        self.indent -= 1;
    }

    /// An assignment without its terminator, as used in `for` headers.
    fn assignment_text(&self, stmt: &Stmt) -> String {
        match &stmt.kind {
            StmtKind::Assignment {
                target,
                operator,
                value,
                declared_type,
            } => match declared_type {
                Some(ty) if operator == "=" => {
                    let ty = self.type_text(ty);
                    if value.is_empty() {
                        format!("{} {}", ty, target)
                    } else {
                        format!("{} {} = {}", ty, target, csharp_literal(value))
                    }
                }
                _ => format!("{} {} {}", target, operator, csharp_literal(value)),
            },
            StmtKind::Raw(text) => text.trim().trim_end_matches(';').to_string(),
            _ => stmt.meta.raw_code.clone().unwrap_or_default(),
        }
    }
}

impl Default for CSharpGenerator {
    fn default() -> Self {
        Self::new(GenerateOptions::default())
    }
}

/// `public static ` style prefix. Interface members carry no access keyword.
fn modifier_text(meta: &NodeMeta, in_interface: bool) -> String {
    let mut words = Vec::new();
    if !in_interface {
        words.push(meta.access.keyword());
    }
    let m = meta.modifiers;
    if m.contains(Modifiers::STATIC) && !m.contains(Modifiers::CONST) {
        words.push("static");
    }
    for (flag, word) in [
        (Modifiers::ABSTRACT, "abstract"),
        (Modifiers::VIRTUAL, "virtual"),
        (Modifiers::OVERRIDE, "override"),
        (Modifiers::SEALED, "sealed"),
        (Modifiers::READONLY, "readonly"),
        (Modifiers::CONST, "const"),
        (Modifiers::ASYNC, "async"),
        (Modifiers::PARTIAL, "partial"),
    ] {
        if m.contains(flag) {
            words.push(word);
        }
    }
    words.iter().map(|w| format!("{} ", w)).collect()
}

fn generic_list(params: &[GenericParam]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

fn accessor_access(accessor: &Accessor) -> String {
    accessor
        .access
        .map(|a| format!("{} ", a.keyword()))
        .unwrap_or_default()
}

/// C# spelling of a field name: public fields and constants in PascalCase,
/// everything else in camelCase.
fn field_name(member: &Member) -> String {
    if member.meta.access == Access::Public || member.has_modifier(Modifiers::CONST) {
        to_pascal_case(member.name())
    } else {
        to_camel_case(member.name())
    }
}

fn comment_line(line: &str) -> String {
    if line.is_empty() {
        "//".to_string()
    } else {
        format!("// {}", line)
    }
}

/// Literal keywords written the Python way.
fn csharp_literal(text: &str) -> String {
    match text.trim() {
        "None" => "null".into(),
        "True" => "true".into(),
        "False" => "false".into(),
        _ => text.to_string(),
    }
}

/// `ValueError("x")` → `new ValueError("x")`; variables are thrown as-is.
fn throw_value(value: &str) -> String {
    let value = value.trim();
    let constructs = value.starts_with(|c: char| c.is_uppercase())
        && value.ends_with(')')
        && value
            .split('(')
            .next()
            .is_some_and(|head| head.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.'));
    if constructs {
        format!("new {}", value)
    } else {
        value.to_string()
    }
}

/// Whether a statement ends control flow through a `case`.
fn leaves_case(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) | StmtKind::Throw(_) => true,
        StmtKind::Raw(text) => {
            let text = text.trim().trim_end_matches(';');
            matches!(text, "break" | "continue") || text.starts_with("goto ")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(file: &SourceFile) -> String {
        CSharpGenerator::emit(file, &GenerateOptions::default()).unwrap()
    }

    fn emit_stmt(stmt: &Stmt) -> String {
        let mut generator = CSharpGenerator::default();
        generator.generate_statement(stmt).unwrap();
        generator.finish()
    }

    fn emit_member(member: &Member, owner: &TypeDecl) -> String {
        let mut generator = CSharpGenerator::default();
        generator.generate_member(member, Some(owner)).unwrap();
        generator.finish()
    }

    #[test]
    fn test_class_with_auto_property_and_method() {
        let ty = TypeDecl::class("Greeter")
            .with_doc("Says hello.")
            .with_member(
                Member::field("prefix", TypeRef::new("str"))
                    .with_access(Access::Private)
                    .with_initial_value("\"Hello\""),
            )
            .with_member(Member::property("Name", TypeRef::new("str")))
            .with_member(Member::method(
                "greet",
                vec![Parameter::typed("other_name", TypeRef::new("str"))],
                Some(TypeRef::new("str")),
                Some(vec![Stmt::return_stmt(Some("prefix + otherName"))]),
            ));
        let file = SourceFile::new("greeter", Language::CSharp).with_type(ty);
        assert_eq!(
            emit(&file),
            "/// <summary>Says hello.</summary>\n\
             public class Greeter\n\
             {\n    \
                 private string prefix = \"Hello\";\n    \
                 public string Name { get; set; }\n\
             \n    \
                 public string Greet(string otherName)\n    \
                 {\n        \
                     return prefix + otherName;\n    \
                 }\n\
             }\n"
        );
    }

    #[test]
    fn test_interface_members_have_no_access_or_body() {
        let ty = TypeDecl::interface("IShape")
            .with_member(Member::method("area", vec![], Some(TypeRef::new("float")), None));
        let file = SourceFile::new("shapes", Language::CSharp).with_type(ty);
        assert_eq!(
            emit(&file),
            "public interface IShape\n{\n    double Area();\n}\n"
        );
    }

    #[test]
    fn test_generic_class_with_constraint() {
        let ty = TypeDecl::class("Box")
            .with_generic(GenericParam::constrained("T", vec![TypeRef::new("IComparable")]))
            .with_base(TypeRef::new("Base"));
        let file = SourceFile::new("box", Language::CSharp).with_type(ty);
        assert_eq!(
            emit(&file),
            "public class Box<T> : Base where T : IComparable\n{\n}\n"
        );
    }

    #[test]
    fn test_enum_values() {
        let ty = TypeDecl::enumeration("Color")
            .with_member(Member::field("RED", TypeRef::new("int")).with_initial_value("1"))
            .with_member(Member::field("dark_blue", TypeRef::new("int")));
        let file = SourceFile::new("color", Language::CSharp).with_type(ty);
        assert_eq!(
            emit(&file),
            "public enum Color\n{\n    Red = 1,\n    DarkBlue\n}\n"
        );
    }

    #[test]
    fn test_delegate_event_indexer_operator() {
        let handler = TypeDecl::delegate(
            "Handler",
            vec![Parameter::typed("sender", TypeRef::new("object"))],
            None,
        );
        let file = SourceFile::new("events", Language::CSharp).with_type(handler);
        assert_eq!(
            emit(&file),
            "public delegate void Handler(object sender);\n"
        );

        let owner = TypeDecl::class("Vector");
        let event = Member::event("changed", TypeRef::new("Handler"));
        assert_eq!(emit_member(&event, &owner), "public event Handler Changed;\n");

        let indexer = Member::indexer(
            TypeRef::new("float"),
            vec![Parameter::typed("i", TypeRef::new("int"))],
            Some(Accessor::with_body(vec![Stmt::return_stmt(Some("items[i]"))])),
            None,
        );
        assert_eq!(
            emit_member(&indexer, &owner),
            "public double this[int i]\n{\n    get\n    {\n        return items[i];\n    }\n}\n"
        );

        let op = Member::operator(
            "+",
            vec![Parameter::new("a"), Parameter::new("b")],
            None,
            vec![Stmt::return_stmt(Some("a.Add(b)"))],
        );
        assert_eq!(
            emit_member(&op, &owner),
            "public static Vector operator +(Vector a, Vector b)\n{\n    return a.Add(b);\n}\n"
        );
    }

    #[test]
    fn test_switch_adds_break() {
        let stmt = Stmt::switch(
            "cmd",
            vec![
                SwitchCase::new(vec!["\"a\"".into(), "\"b\"".into()], vec![Stmt::raw("Go();")]),
                SwitchCase::new(vec!["\"q\"".into()], vec![Stmt::return_stmt(None::<String>)]),
            ],
            Some(vec![]),
        );
        assert_eq!(
            emit_stmt(&stmt),
            "switch (cmd)\n{\n    case \"a\":\n    case \"b\":\n        Go();\n        break;\n    \
             case \"q\":\n        return;\n    default:\n        break;\n}\n"
        );
    }

    #[test]
    fn test_try_catch_when() {
        let stmt = Stmt::try_catch(
            vec![Stmt::raw("Run();")],
            vec![
                CatchClause::new(Some(TypeRef::new("IOException")), Some("e".into()), vec![])
                    .with_filter("e.Retry"),
                CatchClause::new(None, None, vec![Stmt::throw(None::<String>)]),
            ],
            None,
        );
        assert_eq!(
            emit_stmt(&stmt),
            "try\n{\n    Run();\n}\ncatch (IOException e) when (e.Retry)\n{\n}\ncatch\n{\n    throw;\n}\n"
        );
    }

    #[test]
    fn test_for_using_foreach() {
        let stmt = Stmt::for_loop(
            Some(Stmt::declare(TypeRef::new("int"), "i", "0")),
            "i < n",
            Some(Stmt::raw("i++")),
            vec![Stmt::using("Open(i)", Some("f"), vec![Stmt::for_each(
                "line",
                "f.Lines",
                vec![],
            )])],
        );
        assert_eq!(
            emit_stmt(&stmt),
            "for (int i = 0; i < n; i++)\n{\n    using (var f = Open(i))\n    {\n        \
             foreach (var line in f.Lines)\n        {\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_python_literals_and_raise() {
        assert_eq!(emit_stmt(&Stmt::assign("done", "True")), "done = true;\n");
        assert_eq!(
            emit_stmt(&Stmt::throw(Some("ValueError(\"bad\")"))),
            "throw new ValueError(\"bad\");\n"
        );
        assert_eq!(emit_stmt(&Stmt::throw(Some("error"))), "throw error;\n");
    }

    #[test]
    fn test_free_functions_become_module_class() {
        let file = SourceFile::new("tools", Language::Python)
            .with_import(Import::from("typing", vec!["Any".into()]))
            .with_import(Import::module("System.IO"))
            .with_function(Member::method(
                "main",
                vec![],
                None,
                Some(vec![Stmt::raw("Run();")]),
            ))
            .with_statement(Stmt::assign("count", "0"));
        assert_eq!(
            emit(&file),
            "using System.IO;\n\
             \n\
             public static class ToolsModule\n\
             {\n    \
                 static ToolsModule()\n    \
                 {\n        \
                     count = 0;\n    \
                 }\n\
             \n    \
                 public static void Main()\n    \
                 {\n        \
                     Run();\n    \
                 }\n\
             }\n"
        );
    }

    #[test]
    fn test_namespaces_nest() {
        let ns = Namespace::new("App").with_type(TypeDecl::structure("Point"));
        let file = SourceFile::new("app", Language::CSharp).with_namespace(ns);
        assert_eq!(
            emit(&file),
            "namespace App\n{\n    public struct Point\n    {\n    }\n}\n"
        );
    }

    #[test]
    fn test_raw_code_overrides_node() {
        let owner = TypeDecl::class("C");
        let member = Member::method("f", vec![], None, None).with_raw_code("int F() => 1;");
        assert_eq!(emit_member(&member, &owner), "int F() => 1;\n");
    }

    #[test]
    fn test_indent_returns_to_zero() {
        let mut generator = CSharpGenerator::default();
        let file = SourceFile::new("x", Language::CSharp).with_type(
            TypeDecl::class("A").with_nested(TypeDecl::class("B").with_member(Member::method(
                "f",
                vec![],
                None,
                Some(vec![Stmt::while_loop("true", vec![Stmt::raw("break;")])]),
            ))),
        );
        generator.generate_file(&file).unwrap();
        assert_eq!(generator.indent_depth(), 0);
    }
}
