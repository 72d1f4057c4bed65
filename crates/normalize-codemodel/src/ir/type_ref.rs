//! References to types.

use super::meta::{Node, NodeKind};
use serde::{Deserialize, Serialize};

/// A reference to a type, possibly generic, array or nullable.
///
/// References are by name only: they never own or point at the declared
/// type. Use [`SourceFile::find_type`](super::SourceFile::find_type) to look
/// the declaration up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Base type name (e.g. `List`, `System.String`, `int`).
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_args: Vec<TypeRef>,
    /// Array rank; 0 for non-array types.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub array_rank: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_code: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_args: Vec::new(),
            array_rank: 0,
            nullable: false,
            raw_code: None,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            generic_args: args,
            ..Self::new(name)
        }
    }

    /// A type reference rendered verbatim by every generator.
    pub fn raw(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            raw_code: Some(code.clone()),
            ..Self::new(code)
        }
    }

    pub fn array(mut self, rank: usize) -> Self {
        self.array_rank = rank;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_args.is_empty()
    }

    /// The last segment of a dotted name (`System.String` → `String`).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Depth of generic nesting (`int` → 0, `List<int>` → 1).
    pub fn generic_depth(&self) -> usize {
        self.generic_args
            .iter()
            .map(|arg| arg.generic_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Node for TypeRef {
    fn node_kind(&self) -> NodeKind {
        NodeKind::TypeReference
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn raw_code(&self) -> Option<&str> {
        self.raw_code.as_deref()
    }
}
