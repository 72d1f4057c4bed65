//! Compilation units, imports and namespaces.

use super::members::Member;
use super::meta::{Node, NodeKind, NodeMeta};
use super::stmt::Stmt;
use super::types::TypeDecl;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages the code model can be rendered to or read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    CSharp,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::Python, Language::CSharp];

    /// Language identifier used by the registry (e.g. `"python"`).
    pub fn id(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::CSharp => "csharp",
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::CSharp => "cs",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Language::Python),
            "csharp" | "c#" | "cs" => Some(Language::CSharp),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.') {
            "py" | "pyi" => Some(Language::Python),
            "cs" => Some(Language::CSharp),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An import / using directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    #[serde(default, skip_serializing_if = "is_default_meta")]
    pub meta: NodeMeta,
    /// Imported module or namespace (`os.path`, `System.Text`).
    pub module: String,
    /// Names imported from the module; empty for a whole-module import.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

fn is_default_meta(meta: &NodeMeta) -> bool {
    *meta == NodeMeta::default()
}

impl Import {
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::default(),
            module: module.into(),
            names: Vec::new(),
            alias: None,
        }
    }

    pub fn from(module: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            names,
            ..Self::module(module)
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Whether this import already brings `name` in from `module`.
    pub fn provides(&self, module: &str, name: &str) -> bool {
        self.module == module && self.names.iter().any(|n| n == name || n == "*")
    }
}

/// A grouping scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub meta: NodeMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Namespace>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: NodeMeta::named(name),
            namespaces: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.meta.name_or_empty()
    }

    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.namespaces.push(ns);
        self
    }

    pub fn add_type(&mut self, ty: TypeDecl) {
        self.types.push(ty);
    }

    /// All types in this namespace and its nested namespaces (not nested types).
    pub fn all_types(&self) -> Vec<&TypeDecl> {
        let mut out: Vec<&TypeDecl> = self.types.iter().collect();
        for ns in &self.namespaces {
            out.extend(ns.all_types());
        }
        out
    }
}

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub meta: NodeMeta,
    /// File name without extension.
    pub file_name: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Namespace>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDecl>,
    /// Module-level functions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<Member>,
    /// Module-level free statements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Stmt>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, language: Language) -> Self {
        let file_name = file_name.into();
        Self {
            meta: NodeMeta::named(file_name.clone()),
            file_name,
            language,
            imports: Vec::new(),
            namespaces: Vec::new(),
            types: Vec::new(),
            functions: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Extension derived from the language.
    pub fn extension(&self) -> &'static str {
        self.language.extension()
    }

    /// `file_name.ext`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.file_name, self.extension())
    }

    /// Copy of this file retagged for another language.
    pub fn with_language(&self, language: Language) -> Self {
        Self {
            language,
            ..self.clone()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.meta.doc = Some(doc.into());
        self
    }

    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_namespace(mut self, ns: Namespace) -> Self {
        self.namespaces.push(ns);
        self
    }

    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }

    pub fn with_function(mut self, function: Member) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_statement(mut self, stmt: Stmt) -> Self {
        self.statements.push(stmt);
        self
    }

    pub fn add_type(&mut self, ty: TypeDecl) {
        self.types.push(ty);
    }

    pub fn remove_type(&mut self, name: &str) -> Option<TypeDecl> {
        let index = self.types.iter().position(|t| t.name() == name)?;
        Some(self.types.remove(index))
    }

    /// Every type declared at the top level or inside namespaces,
    /// excluding nested types.
    pub fn all_types(&self) -> Vec<&TypeDecl> {
        let mut out: Vec<&TypeDecl> = self.types.iter().collect();
        for ns in &self.namespaces {
            out.extend(ns.all_types());
        }
        out
    }

    /// Look up a declared type by simple or qualified name.
    ///
    /// Qualified names are tried against namespace paths first, then as
    /// paths through nested types (`Outer.Inner`).
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        if let Some(found) = find_in_namespaces(&self.namespaces, "", name) {
            return Some(found);
        }
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        self.all_types()
            .into_iter()
            .filter(|t| t.name() == head)
            .find_map(|t| match rest {
                Some(rest) => t.find_nested(rest),
                None => Some(t),
            })
    }

    /// Count of types, including nested ones.
    pub fn type_count(&self) -> usize {
        let mut count = 0;
        for ty in self.all_types() {
            ty.walk(&mut |_| count += 1);
        }
        count
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn find_in_namespaces<'a>(
    namespaces: &'a [Namespace],
    prefix: &str,
    name: &str,
) -> Option<&'a TypeDecl> {
    for ns in namespaces {
        let qualified = if prefix.is_empty() {
            ns.name().to_string()
        } else {
            format!("{}.{}", prefix, ns.name())
        };
        if let Some(rest) = name
            .strip_prefix(qualified.as_str())
            .and_then(|r| r.strip_prefix('.'))
        {
            let (head, nested) = match rest.split_once('.') {
                Some((head, nested)) => (head, Some(nested)),
                None => (rest, None),
            };
            let found = ns
                .types
                .iter()
                .filter(|t| t.name() == head)
                .find_map(|t| match nested {
                    Some(nested) => t.find_nested(nested),
                    None => Some(t),
                });
            if found.is_some() {
                return found;
            }
        }
        if let Some(found) = find_in_namespaces(&ns.namespaces, &qualified, name) {
            return Some(found);
        }
    }
    None
}

impl Node for SourceFile {
    fn node_kind(&self) -> NodeKind {
        NodeKind::File
    }

    fn name(&self) -> Option<&str> {
        Some(&self.file_name)
    }

    fn raw_code(&self) -> Option<&str> {
        self.meta.raw_code.as_deref()
    }
}

impl Node for Import {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Import
    }

    fn name(&self) -> Option<&str> {
        Some(&self.module)
    }

    fn raw_code(&self) -> Option<&str> {
        self.meta.raw_code.as_deref()
    }
}

impl Node for Namespace {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Namespace
    }

    fn name(&self) -> Option<&str> {
        self.meta.name.as_deref()
    }

    fn raw_code(&self) -> Option<&str> {
        self.meta.raw_code.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeRef;

    fn sample() -> SourceFile {
        SourceFile::new("models", Language::Python)
            .with_type(TypeDecl::class("User").with_nested(TypeDecl::enumeration("Role")))
            .with_namespace(
                Namespace::new("Company")
                    .with_namespace(Namespace::new("Billing").with_type(TypeDecl::class("Invoice"))),
            )
    }

    #[test]
    fn test_extension_follows_language() {
        let file = SourceFile::new("main", Language::CSharp);
        assert_eq!(file.extension(), "cs");
        assert_eq!(file.with_language(Language::Python).full_name(), "main.py");
    }

    #[test]
    fn test_find_type_by_simple_and_qualified_name() {
        let file = sample();
        assert!(file.find_type("User").is_some());
        assert!(file.find_type("User.Role").is_some());
        assert!(file.find_type("Invoice").is_some());
        assert!(file.find_type("Company.Billing.Invoice").is_some());
        assert!(file.find_type("Company.Invoice").is_none());
        assert!(file.find_type("Role").is_none());
    }

    #[test]
    fn test_type_count_includes_nested() {
        assert_eq!(sample().type_count(), 3);
    }

    #[test]
    fn test_json_roundtrip() {
        let file = sample().with_type(
            TypeDecl::class("Box").with_member(Member::field(
                "Items",
                TypeRef::generic("List", vec![TypeRef::new("int")]),
            )),
        );
        let json = file.to_json_pretty().unwrap();
        assert_eq!(SourceFile::from_json(&json).unwrap(), file);
    }

    #[test]
    fn test_import_provides() {
        let import = Import::from("typing", vec!["Optional".into(), "Any".into()]);
        assert!(import.provides("typing", "Any"));
        assert!(!import.provides("typing", "Protocol"));
        assert!(Import::from("typing", vec!["*".into()]).provides("typing", "Protocol"));
    }

    #[test]
    fn test_language_lookup() {
        assert_eq!(Language::from_extension(".pyi"), Some(Language::Python));
        assert_eq!(Language::from_id("C#"), Some(Language::CSharp));
        assert_eq!(Language::from_id("cobol"), None);
    }
}
