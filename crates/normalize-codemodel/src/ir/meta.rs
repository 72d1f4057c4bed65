//! Attributes shared by every node: name, docs, annotations, access,
//! modifiers and the raw-code override.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access level of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Access {
    pub fn keyword(self) -> &'static str {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Internal => "internal",
            Access::Private => "private",
        }
    }

    /// Whether the declaration is hidden from outside its type.
    pub fn is_hidden(self) -> bool {
        matches!(self, Access::Protected | Access::Private)
    }
}

bitflags::bitflags! {
    /// Declaration modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u16 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const VIRTUAL = 1 << 2;
        const OVERRIDE = 1 << 3;
        const SEALED = 1 << 4;
        const READONLY = 1 << 5;
        const CONST = 1 << 6;
        const ASYNC = 1 << 7;
        const PARTIAL = 1 << 8;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::empty()
    }
}

/// An attribute or decorator attached to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation name, possibly dotted (e.g. `functools.cache`).
    pub name: String,
    /// Argument expressions as opaque text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// The base capability set carried by every declaration node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub access: Access,
    #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
    pub modifiers: Modifiers,
    /// When set, generators emit this text instead of rendering the node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_code: Option<String>,
}

impl NodeMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }
}

/// Every kind of node in the IR, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Import,
    Namespace,
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Field,
    Property,
    Method,
    Constructor,
    Event,
    Indexer,
    Operator,
    Parameter,
    Assignment,
    Comment,
    Raw,
    Return,
    Throw,
    If,
    For,
    ForEach,
    While,
    Switch,
    Try,
    Using,
    Block,
    TypeReference,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Import => "import",
            NodeKind::Namespace => "namespace",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Struct => "struct",
            NodeKind::Enum => "enum",
            NodeKind::Delegate => "delegate",
            NodeKind::Field => "field",
            NodeKind::Property => "property",
            NodeKind::Method => "method",
            NodeKind::Constructor => "constructor",
            NodeKind::Event => "event",
            NodeKind::Indexer => "indexer",
            NodeKind::Operator => "operator",
            NodeKind::Parameter => "parameter",
            NodeKind::Assignment => "assignment",
            NodeKind::Comment => "comment",
            NodeKind::Raw => "raw",
            NodeKind::Return => "return",
            NodeKind::Throw => "throw",
            NodeKind::If => "if",
            NodeKind::For => "for",
            NodeKind::ForEach => "foreach",
            NodeKind::While => "while",
            NodeKind::Switch => "switch",
            NodeKind::Try => "try",
            NodeKind::Using => "using",
            NodeKind::Block => "block",
            NodeKind::TypeReference => "type reference",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform read access to the base capabilities of any node.
pub trait Node {
    fn node_kind(&self) -> NodeKind;

    fn name(&self) -> Option<&str>;

    fn raw_code(&self) -> Option<&str>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_json_roundtrip() {
        let mods = Modifiers::STATIC | Modifiers::CONST;
        let json = serde_json::to_string(&mods).unwrap();
        let back: Modifiers = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mods);
    }

    #[test]
    fn test_meta_defaults_are_skipped() {
        let json = serde_json::to_value(NodeMeta::named("x")).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "x", "access": "public" }));
    }
}
