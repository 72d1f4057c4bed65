//! The language-neutral code model.
//!
//! A [`SourceFile`] owns its imports, namespaces, types, functions and
//! statements; every node is owned by exactly one parent, so cycles and
//! shared statement lists cannot be expressed. Type references point at
//! declarations by name only (see [`SourceFile::find_type`]).

mod file;
mod members;
mod meta;
mod stmt;
mod structure_eq;
mod type_ref;
mod types;

pub use file::{Import, Language, Namespace, SourceFile};
pub use members::{Accessor, Member, MemberKind, ParamKind, Parameter};
pub use meta::{Access, Annotation, Modifiers, Node, NodeKind, NodeMeta};
pub use stmt::{CatchClause, ElseIf, Stmt, StmtKind, SwitchCase};
pub use structure_eq::StructureEq;
pub use type_ref::TypeRef;
pub use types::{GenericParam, TypeDecl, TypeKind};
