//! Structural equality for IR types.
//!
//! `structure_eq` compares IR trees ignoring "surface hints" - details that
//! a generator or parser may legitimately change without changing the shape
//! of the program.
//!
//! # Hint Fields (ignored during comparison)
//!
//! - documentation, annotations and access levels
//! - `Comment` statements
//! - whitespace inside opaque expression text
//! - type references (targets map type names differently)
//! - namespace nesting (types are compared as a flat list)
//! - naming convention (`GetValue` and `get_value` are the same member)
//!
//! # Core Fields (must match exactly)
//!
//! - node kinds, member/type/parameter order
//! - control flow structure and expression text

use super::{
    CatchClause, ElseIf, Import, Member, MemberKind, Parameter, SourceFile, Stmt, StmtKind,
    SwitchCase, TypeDecl,
};
use crate::naming::to_snake_case;
use std::mem::discriminant;

/// Trait for structural equality comparison.
///
/// Unlike `PartialEq`, this ignores surface hint fields that may differ
/// between languages but don't affect program structure.
pub trait StructureEq {
    fn structure_eq(&self, other: &Self) -> bool;
}

impl StructureEq for SourceFile {
    fn structure_eq(&self, other: &Self) -> bool {
        vec_structure_eq(&self.imports, &other.imports)
            && self.all_types().len() == other.all_types().len()
            && self
                .all_types()
                .iter()
                .zip(other.all_types())
                .all(|(a, b)| a.structure_eq(b))
            && vec_structure_eq(&self.functions, &other.functions)
            && stmts_structure_eq(&self.statements, &other.statements)
    }
}

impl StructureEq for Import {
    fn structure_eq(&self, other: &Self) -> bool {
        self.module == other.module && self.names == other.names && self.alias == other.alias
    }
}

impl StructureEq for TypeDecl {
    fn structure_eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && discriminant(&self.kind) == discriminant(&other.kind)
            && self.generic_params.len() == other.generic_params.len()
            && vec_structure_eq(&self.members, &other.members)
            && vec_structure_eq(&self.nested_types, &other.nested_types)
    }
}

impl StructureEq for Member {
    fn structure_eq(&self, other: &Self) -> bool {
        // Operators are identified by symbol; the first operand is `self` in
        // some targets.
        if let (
            MemberKind::Operator { symbol: o1, .. },
            MemberKind::Operator { symbol: o2, .. },
        ) = (&self.kind, &other.kind)
        {
            return o1 == o2
                && self.parameters().len() == other.parameters().len()
                && option_body_eq(self.body(), other.body());
        }
        if !same_name(self.name(), other.name()) {
            return false;
        }
        match (&self.kind, &other.kind) {
            (
                MemberKind::Field {
                    initial_value: v1, ..
                },
                MemberKind::Field {
                    initial_value: v2, ..
                },
            ) => option_text_eq(v1.as_deref(), v2.as_deref()),

            (
                MemberKind::Property {
                    getter: g1,
                    setter: s1,
                    ..
                },
                MemberKind::Property {
                    getter: g2,
                    setter: s2,
                    ..
                },
            )
            | (
                MemberKind::Indexer {
                    getter: g1,
                    setter: s1,
                    ..
                },
                MemberKind::Indexer {
                    getter: g2,
                    setter: s2,
                    ..
                },
            ) => {
                vec_structure_eq(self.parameters(), other.parameters())
                    && g1.is_some() == g2.is_some()
                    && s1.is_some() == s2.is_some()
                    && option_body_eq(
                        g1.as_ref().and_then(|g| g.body.as_deref()),
                        g2.as_ref().and_then(|g| g.body.as_deref()),
                    )
                    && option_body_eq(
                        s1.as_ref().and_then(|s| s.body.as_deref()),
                        s2.as_ref().and_then(|s| s.body.as_deref()),
                    )
            }

            (MemberKind::Event { .. }, MemberKind::Event { .. }) => true,

            (a, b) if discriminant(a) == discriminant(b) => {
                vec_structure_eq(self.parameters(), other.parameters())
                    && option_body_eq(self.body(), other.body())
            }

            _ => false,
        }
    }
}

impl StructureEq for Parameter {
    fn structure_eq(&self, other: &Self) -> bool {
        same_name(&self.name, &other.name)
            && self.kind == other.kind
            && option_text_eq(self.default_value.as_deref(), other.default_value.as_deref())
    }
}

impl StructureEq for Stmt {
    fn structure_eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (
                StmtKind::Assignment {
                    target: t1,
                    operator: o1,
                    value: v1,
                    ..
                },
                StmtKind::Assignment {
                    target: t2,
                    operator: o2,
                    value: v2,
                    ..
                },
            ) => text_eq(t1, t2) && o1 == o2 && text_eq(v1, v2),

            (StmtKind::Comment(a), StmtKind::Comment(b)) => a.trim() == b.trim(),
            (StmtKind::Raw(a), StmtKind::Raw(b)) => text_eq(a, b),
            (StmtKind::Return(a), StmtKind::Return(b))
            | (StmtKind::Throw(a), StmtKind::Throw(b)) => {
                option_text_eq(a.as_deref(), b.as_deref())
            }

            (
                StmtKind::If {
                    condition: c1,
                    then_branch: t1,
                    else_ifs: e1,
                    else_branch: b1,
                },
                StmtKind::If {
                    condition: c2,
                    then_branch: t2,
                    else_ifs: e2,
                    else_branch: b2,
                },
            ) => {
                text_eq(c1, c2)
                    && stmts_structure_eq(t1, t2)
                    && vec_structure_eq(e1, e2)
                    && option_body_eq(b1.as_deref(), b2.as_deref())
            }

            (
                StmtKind::For {
                    init: i1,
                    condition: c1,
                    increment: n1,
                    body: b1,
                },
                StmtKind::For {
                    init: i2,
                    condition: c2,
                    increment: n2,
                    body: b2,
                },
            ) => {
                option_structure_eq(i1.as_deref(), i2.as_deref())
                    && text_eq(c1, c2)
                    && option_structure_eq(n1.as_deref(), n2.as_deref())
                    && stmts_structure_eq(b1, b2)
            }

            (
                StmtKind::ForEach {
                    variable: v1,
                    iterable: i1,
                    body: b1,
                    ..
                },
                StmtKind::ForEach {
                    variable: v2,
                    iterable: i2,
                    body: b2,
                    ..
                },
            ) => text_eq(v1, v2) && text_eq(i1, i2) && stmts_structure_eq(b1, b2),

            (
                StmtKind::While {
                    condition: c1,
                    body: b1,
                },
                StmtKind::While {
                    condition: c2,
                    body: b2,
                },
            ) => text_eq(c1, c2) && stmts_structure_eq(b1, b2),

            (
                StmtKind::Switch {
                    subject: s1,
                    cases: c1,
                    default: d1,
                },
                StmtKind::Switch {
                    subject: s2,
                    cases: c2,
                    default: d2,
                },
            ) => {
                text_eq(s1, s2)
                    && vec_structure_eq(c1, c2)
                    && option_body_eq(d1.as_deref(), d2.as_deref())
            }

            (
                StmtKind::Try {
                    body: b1,
                    catches: c1,
                    finally: f1,
                },
                StmtKind::Try {
                    body: b2,
                    catches: c2,
                    finally: f2,
                },
            ) => {
                stmts_structure_eq(b1, b2)
                    && vec_structure_eq(c1, c2)
                    && option_body_eq(f1.as_deref(), f2.as_deref())
            }

            (
                StmtKind::Using {
                    resource: r1,
                    variable: v1,
                    body: b1,
                },
                StmtKind::Using {
                    resource: r2,
                    variable: v2,
                    body: b2,
                },
            ) => {
                text_eq(r1, r2)
                    && option_text_eq(v1.as_deref(), v2.as_deref())
                    && stmts_structure_eq(b1, b2)
            }

            (StmtKind::Block(a), StmtKind::Block(b)) => stmts_structure_eq(a, b),

            _ => false,
        }
    }
}

impl StructureEq for ElseIf {
    fn structure_eq(&self, other: &Self) -> bool {
        text_eq(&self.condition, &other.condition) && stmts_structure_eq(&self.body, &other.body)
    }
}

impl StructureEq for SwitchCase {
    fn structure_eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|(a, b)| text_eq(a, b))
            && stmts_structure_eq(&self.body, &other.body)
    }
}

impl StructureEq for CatchClause {
    fn structure_eq(&self, other: &Self) -> bool {
        self.exception_type.is_some() == other.exception_type.is_some()
            && option_text_eq(self.variable.as_deref(), other.variable.as_deref())
            && option_text_eq(self.filter.as_deref(), other.filter.as_deref())
            && stmts_structure_eq(&self.body, &other.body)
    }
}

fn vec_structure_eq<T: StructureEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structure_eq(y))
}

fn option_structure_eq<T: StructureEq>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.structure_eq(b),
        _ => false,
    }
}

/// Statement lists compare without their comments.
fn stmts_structure_eq(a: &[Stmt], b: &[Stmt]) -> bool {
    let a: Vec<&Stmt> = a.iter().filter(|s| !is_comment(s)).collect();
    let b: Vec<&Stmt> = b.iter().filter(|s| !is_comment(s)).collect();
    a.len() == b.len() && a.iter().zip(&b).all(|(x, y)| x.structure_eq(y))
}

fn option_body_eq(a: Option<&[Stmt]>, b: Option<&[Stmt]>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => stmts_structure_eq(a, b),
        _ => false,
    }
}

fn is_comment(stmt: &Stmt) -> bool {
    matches!(stmt.kind, StmtKind::Comment(_))
}

fn same_name(a: &str, b: &str) -> bool {
    a == b || to_snake_case(a) == to_snake_case(b)
}

fn text_eq(a: &str, b: &str) -> bool {
    a.split_whitespace().eq(b.split_whitespace())
}

fn option_text_eq(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => text_eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Language, TypeRef};

    #[test]
    fn test_ignores_comments_and_whitespace() {
        let a = vec![Stmt::comment("setup"), Stmt::assign("x", "a  +  b")];
        let b = vec![Stmt::assign("x", "a + b")];
        assert!(stmts_structure_eq(&a, &b));
    }

    #[test]
    fn test_naming_convention_is_a_hint() {
        let a = Member::method("GetValue", vec![Parameter::new("itemCount")], None, Some(vec![]));
        let b = Member::method("get_value", vec![Parameter::new("item_count")], None, Some(vec![]));
        assert!(a.structure_eq(&b));
    }

    #[test]
    fn test_body_presence_matters() {
        let a = Member::method("run", vec![], None, None);
        let b = Member::method("run", vec![], None, Some(vec![]));
        assert!(!a.structure_eq(&b));
    }

    #[test]
    fn test_file_compares_flattened_types() {
        let flat = SourceFile::new("m", Language::Python).with_type(TypeDecl::class("A"));
        let nested = SourceFile::new("m", Language::CSharp)
            .with_namespace(crate::ir::Namespace::new("N").with_type(TypeDecl::class("A")));
        assert!(flat.structure_eq(&nested));

        let other = SourceFile::new("m", Language::Python).with_type(
            TypeDecl::class("A").with_member(Member::field("x", TypeRef::new("int"))),
        );
        assert!(!flat.structure_eq(&other));
    }
}
