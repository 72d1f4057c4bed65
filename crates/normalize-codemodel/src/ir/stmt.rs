//! Statement nodes.

use super::meta::{Node, NodeKind, NodeMeta};
use super::type_ref::TypeRef;
use serde::{Deserialize, Serialize};

/// A statement: shared metadata plus the statement shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    #[serde(default, skip_serializing_if = "is_default_meta")]
    pub meta: NodeMeta,
    pub kind: StmtKind,
}

fn is_default_meta(meta: &NodeMeta) -> bool {
    *meta == NodeMeta::default()
}

/// The shape of a statement. Expressions are opaque text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtKind {
    /// `target op value`, optionally declaring a local type.
    Assignment {
        target: String,
        /// `=`, `+=`, `-=`, ...
        operator: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        declared_type: Option<TypeRef>,
    },
    Comment(String),
    /// Opaque statement text.
    Raw(String),
    Return(Option<String>),
    Throw(Option<String>),
    If {
        condition: String,
        then_branch: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        else_ifs: Vec<ElseIf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_branch: Option<Vec<Stmt>>,
    },
    /// C-style three-part loop.
    For {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        init: Option<Box<Stmt>>,
        condition: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        increment: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    ForEach {
        variable: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable_type: Option<TypeRef>,
        iterable: String,
        body: Vec<Stmt>,
    },
    While {
        condition: String,
        body: Vec<Stmt>,
    },
    Switch {
        subject: String,
        cases: Vec<SwitchCase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Vec<Stmt>>,
    },
    Try {
        body: Vec<Stmt>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        catches: Vec<CatchClause>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finally: Option<Vec<Stmt>>,
    },
    /// Resource scope (`using` / `with`).
    Using {
        resource: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variable: Option<String>,
        body: Vec<Stmt>,
    },
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIf {
    pub condition: String,
    pub body: Vec<Stmt>,
}

/// One case of a switch: a group of labels sharing a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    pub labels: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    /// Additional guard condition (`when (...)`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub body: Vec<Stmt>,
}

impl CatchClause {
    pub fn new(exception_type: Option<TypeRef>, variable: Option<String>, body: Vec<Stmt>) -> Self {
        Self {
            exception_type,
            variable,
            filter: None,
            body,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Self {
            meta: NodeMeta::default(),
            kind,
        }
    }

    pub fn assign(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::assign_op(target, "=", value)
    }

    pub fn assign_op(
        target: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(StmtKind::Assignment {
            target: target.into(),
            operator: operator.into(),
            value: value.into(),
            declared_type: None,
        })
    }

    /// A local declaration with an explicit type.
    pub fn declare(ty: TypeRef, target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(StmtKind::Assignment {
            target: target.into(),
            operator: "=".into(),
            value: value.into(),
            declared_type: Some(ty),
        })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(StmtKind::Comment(text.into()))
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(StmtKind::Raw(text.into()))
    }

    pub fn return_stmt(value: Option<impl Into<String>>) -> Self {
        Self::new(StmtKind::Return(value.map(Into::into)))
    }

    pub fn throw(value: Option<impl Into<String>>) -> Self {
        Self::new(StmtKind::Throw(value.map(Into::into)))
    }

    pub fn if_stmt(
        condition: impl Into<String>,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    ) -> Self {
        Self::new(StmtKind::If {
            condition: condition.into(),
            then_branch,
            else_ifs: Vec::new(),
            else_branch,
        })
    }

    pub fn for_loop(
        init: Option<Stmt>,
        condition: impl Into<String>,
        increment: Option<Stmt>,
        body: Vec<Stmt>,
    ) -> Self {
        Self::new(StmtKind::For {
            init: init.map(Box::new),
            condition: condition.into(),
            increment: increment.map(Box::new),
            body,
        })
    }

    pub fn for_each(
        variable: impl Into<String>,
        iterable: impl Into<String>,
        body: Vec<Stmt>,
    ) -> Self {
        Self::new(StmtKind::ForEach {
            variable: variable.into(),
            variable_type: None,
            iterable: iterable.into(),
            body,
        })
    }

    pub fn while_loop(condition: impl Into<String>, body: Vec<Stmt>) -> Self {
        Self::new(StmtKind::While {
            condition: condition.into(),
            body,
        })
    }

    pub fn switch(
        subject: impl Into<String>,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    ) -> Self {
        Self::new(StmtKind::Switch {
            subject: subject.into(),
            cases,
            default,
        })
    }

    pub fn try_catch(
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    ) -> Self {
        Self::new(StmtKind::Try {
            body,
            catches,
            finally,
        })
    }

    pub fn using(
        resource: impl Into<String>,
        variable: Option<impl Into<String>>,
        body: Vec<Stmt>,
    ) -> Self {
        Self::new(StmtKind::Using {
            resource: resource.into(),
            variable: variable.map(Into::into),
            body,
        })
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block(stmts))
    }

    pub fn with_raw_code(mut self, code: impl Into<String>) -> Self {
        self.meta.raw_code = Some(code.into());
        self
    }

    /// Nested statement lists owned by this statement, in source order.
    pub fn child_blocks(&self) -> Vec<&[Stmt]> {
        match &self.kind {
            StmtKind::Assignment { .. }
            | StmtKind::Comment(_)
            | StmtKind::Raw(_)
            | StmtKind::Return(_)
            | StmtKind::Throw(_) => Vec::new(),
            StmtKind::If {
                then_branch,
                else_ifs,
                else_branch,
                ..
            } => {
                let mut blocks = vec![then_branch.as_slice()];
                blocks.extend(else_ifs.iter().map(|e| e.body.as_slice()));
                blocks.extend(else_branch.as_deref());
                blocks
            }
            StmtKind::For { body, .. }
            | StmtKind::ForEach { body, .. }
            | StmtKind::While { body, .. }
            | StmtKind::Using { body, .. }
            | StmtKind::Block(body) => vec![body.as_slice()],
            StmtKind::Switch { cases, default, .. } => {
                let mut blocks: Vec<&[Stmt]> = cases.iter().map(|c| c.body.as_slice()).collect();
                blocks.extend(default.as_deref());
                blocks
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                let mut blocks = vec![body.as_slice()];
                blocks.extend(catches.iter().map(|c| c.body.as_slice()));
                blocks.extend(finally.as_deref());
                blocks
            }
        }
    }

    /// Total number of statements in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self
            .child_blocks()
            .iter()
            .flat_map(|block| block.iter())
            .map(Stmt::count)
            .sum::<usize>()
    }
}

impl SwitchCase {
    pub fn new(labels: Vec<String>, body: Vec<Stmt>) -> Self {
        Self { labels, body }
    }
}

impl StmtKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            StmtKind::Assignment { .. } => NodeKind::Assignment,
            StmtKind::Comment(_) => NodeKind::Comment,
            StmtKind::Raw(_) => NodeKind::Raw,
            StmtKind::Return(_) => NodeKind::Return,
            StmtKind::Throw(_) => NodeKind::Throw,
            StmtKind::If { .. } => NodeKind::If,
            StmtKind::For { .. } => NodeKind::For,
            StmtKind::ForEach { .. } => NodeKind::ForEach,
            StmtKind::While { .. } => NodeKind::While,
            StmtKind::Switch { .. } => NodeKind::Switch,
            StmtKind::Try { .. } => NodeKind::Try,
            StmtKind::Using { .. } => NodeKind::Using,
            StmtKind::Block(_) => NodeKind::Block,
        }
    }
}

impl Node for Stmt {
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
    fn test_count_includes_nested_blocks() {
        let stmt = Stmt::if_stmt(
            "x > 0",
            vec![Stmt::return_stmt(Some("x"))],
            Some(vec![Stmt::raw("pass"), Stmt::return_stmt(None::<String>)]),
        );
        assert_eq!(stmt.count(), 4);
        assert_eq!(stmt.child_blocks().len(), 2);
    }

    #[test]
    fn test_try_blocks_in_order() {
        let stmt = Stmt::try_catch(
            vec![Stmt::raw("a()")],
            vec![
                CatchClause::new(Some(TypeRef::new("ValueError")), None, vec![Stmt::raw("b()")]),
                CatchClause::new(None, Some("e".into()), vec![Stmt::raw("c()")]),
            ],
            Some(vec![Stmt::raw("d()")]),
        );
        let texts: Vec<_> = stmt
            .child_blocks()
            .iter()
            .map(|b| match &b[0].kind {
                StmtKind::Raw(t) => t.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(texts, vec!["a()", "b()", "c()", "d()"]);
    }

    #[test]
    fn test_json_is_tagged() {
        let json = serde_json::to_value(Stmt::assign("x", "1")).unwrap();
        assert_eq!(json["kind"]["assignment"]["target"], "x");
        assert!(json.get("meta").is_none());
    }
}
