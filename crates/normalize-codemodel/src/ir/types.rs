//! Type declarations.

use super::members::{Member, Parameter};
use super::meta::{Access, Annotation, Modifiers, Node, NodeKind, NodeMeta};
use super::type_ref::TypeRef;
use serde::{Deserialize, Serialize};

/// A declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub meta: NodeMeta,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_types: Vec<TypeRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_params: Vec<GenericParam>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nested_types: Vec<TypeDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Delegate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeRef>,
        parameters: Vec<Parameter>,
    },
}

/// A generic type parameter and its constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<TypeRef>,
}

impl GenericParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    pub fn constrained(name: impl Into<String>, constraints: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            constraints,
        }
    }
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            meta: NodeMeta::named(name),
            kind,
            base_types: Vec::new(),
            generic_params: Vec::new(),
            members: Vec::new(),
            nested_types: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Enum)
    }

    pub fn delegate(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: Option<TypeRef>,
    ) -> Self {
        Self::new(
            name,
            TypeKind::Delegate {
                return_type,
                parameters,
            },
        )
    }

    pub fn name(&self) -> &str {
        self.meta.name_or_empty()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.meta.name = Some(name.into());
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.meta.doc = Some(doc.into());
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.meta.access = access;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.meta.modifiers |= modifiers;
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.meta.annotations.push(annotation);
        self
    }

    pub fn with_raw_code(mut self, code: impl Into<String>) -> Self {
        self.meta.raw_code = Some(code.into());
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base_types.push(base);
        self
    }

    pub fn with_generic(mut self, param: GenericParam) -> Self {
        self.generic_params.push(param);
        self
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_nested(mut self, nested: TypeDecl) -> Self {
        self.nested_types.push(nested);
        self
    }

    pub fn add_member(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Detach the first member with the given name.
    pub fn remove_member(&mut self, name: &str) -> Option<Member> {
        let index = self.members.iter().position(|m| m.name() == name)?;
        Some(self.members.remove(index))
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.name() == name)
    }

    pub fn add_nested(&mut self, nested: TypeDecl) {
        self.nested_types.push(nested);
    }

    pub fn remove_nested(&mut self, name: &str) -> Option<TypeDecl> {
        let index = self.nested_types.iter().position(|t| t.name() == name)?;
        Some(self.nested_types.remove(index))
    }

    /// Find a nested type by a dotted path relative to this type.
    pub fn find_nested(&self, path: &str) -> Option<&TypeDecl> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let nested = self.nested_types.iter().find(|t| t.name() == head)?;
        match rest {
            Some(rest) => nested.find_nested(rest),
            None => Some(nested),
        }
    }

    /// Visit this type and every nested type, depth first.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a TypeDecl)) {
        visit(self);
        for nested in &self.nested_types {
            nested.walk(visit);
        }
    }
}

impl TypeKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            TypeKind::Class => NodeKind::Class,
            TypeKind::Interface => NodeKind::Interface,
            TypeKind::Struct => NodeKind::Struct,
            TypeKind::Enum => NodeKind::Enum,
            TypeKind::Delegate { .. } => NodeKind::Delegate,
        }
    }
}

impl Node for TypeDecl {
    fn node_kind(&self) -> NodeKind {
        self.kind.node_kind()
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

    #[test]
    fn test_remove_member_detaches() {
        let mut ty = TypeDecl::class("Point")
            .with_member(Member::field("X", TypeRef::new("int")))
            .with_member(Member::field("Y", TypeRef::new("int")));

        let removed = ty.remove_member("X").unwrap();
        assert_eq!(removed.name(), "X");
        assert_eq!(ty.members.len(), 1);
        assert!(ty.remove_member("X").is_none());
    }

    #[test]
    fn test_find_nested_path() {
        let ty = TypeDecl::class("Outer")
            .with_nested(TypeDecl::class("Middle").with_nested(TypeDecl::enumeration("Inner")));

        let inner = ty.find_nested("Middle.Inner").unwrap();
        assert_eq!(inner.node_kind(), NodeKind::Enum);
        assert!(ty.find_nested("Inner").is_none());
    }

    #[test]
    fn test_walk_visits_all() {
        let ty = TypeDecl::class("A")
            .with_nested(TypeDecl::class("B").with_nested(TypeDecl::class("C")))
            .with_nested(TypeDecl::class("D"));
        let mut names = Vec::new();
        ty.walk(&mut |t| names.push(t.name().to_string()));
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }
}
