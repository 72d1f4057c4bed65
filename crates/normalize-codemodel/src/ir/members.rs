//! Type members and their signatures.

use super::meta::{Access, Annotation, Modifiers, Node, NodeKind, NodeMeta};
use super::stmt::Stmt;
use super::type_ref::TypeRef;
use super::types::GenericParam;
use serde::{Deserialize, Serialize};

/// A member of a type (or a module-level function).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub meta: NodeMeta,
    pub kind: MemberKind,
}

/// Member shapes. A `None` body means the member has no body at all
/// (abstract, interface or extern members).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<TypeRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
    },
    Property {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ty: Option<TypeRef>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        getter: Option<Accessor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        setter: Option<Accessor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
    },
    Method {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeRef>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        generic_params: Vec<GenericParam>,
        parameters: Vec<Parameter>,
        body: Option<Vec<Stmt>>,
    },
    Constructor {
        parameters: Vec<Parameter>,
        /// Arguments passed to the base constructor, as opaque text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_call: Option<String>,
        body: Option<Vec<Stmt>>,
    },
    Event {
        ty: TypeRef,
    },
    Indexer {
        ty: TypeRef,
        parameters: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        getter: Option<Accessor>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        setter: Option<Accessor>,
    },
    /// An operator overload. Parameters list every operand.
    Operator {
        symbol: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeRef>,
        parameters: Vec<Parameter>,
        body: Option<Vec<Stmt>>,
    },
}

/// A property or indexer accessor. `body == None` is an auto accessor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Accessor {
    /// Accessor-specific access level (`private set;`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Stmt>>,
}

impl Accessor {
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn with_body(body: Vec<Stmt>) -> Self {
        Self {
            access: None,
            body: Some(body),
        }
    }

    pub fn is_auto(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    #[default]
    Normal,
    Ref,
    Out,
    /// Variadic positional parameters (`params T[]`, `*args`).
    VarArgs,
    /// Variadic keyword parameters (`**kwargs`).
    KwArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub kind: ParamKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default_value: None,
            kind: ParamKind::Normal,
            annotations: Vec::new(),
        }
    }

    pub fn typed(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            ty: Some(ty),
            ..Self::new(name)
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_kind(mut self, kind: ParamKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Member {
    fn build(name: impl Into<String>, kind: MemberKind) -> Self {
        Self {
            meta: NodeMeta::named(name),
            kind,
        }
    }

    pub fn field(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::build(
            name,
            MemberKind::Field {
                ty: Some(ty),
                initial_value: None,
            },
        )
    }

    /// An auto property with a getter and a setter.
    pub fn property(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::build(
            name,
            MemberKind::Property {
                ty: Some(ty),
                getter: Some(Accessor::auto()),
                setter: Some(Accessor::auto()),
                initial_value: None,
            },
        )
    }

    pub fn method(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: Option<TypeRef>,
        body: Option<Vec<Stmt>>,
    ) -> Self {
        Self::build(
            name,
            MemberKind::Method {
                return_type,
                generic_params: Vec::new(),
                parameters,
                body,
            },
        )
    }

    /// Constructors are named after their declaring type.
    pub fn constructor(
        type_name: impl Into<String>,
        parameters: Vec<Parameter>,
        body: Vec<Stmt>,
    ) -> Self {
        Self::build(
            type_name,
            MemberKind::Constructor {
                parameters,
                base_call: None,
                body: Some(body),
            },
        )
    }

    pub fn event(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::build(name, MemberKind::Event { ty })
    }

    pub fn indexer(
        ty: TypeRef,
        parameters: Vec<Parameter>,
        getter: Option<Accessor>,
        setter: Option<Accessor>,
    ) -> Self {
        Self::build(
            "this",
            MemberKind::Indexer {
                ty,
                parameters,
                getter,
                setter,
            },
        )
    }

    pub fn operator(
        symbol: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: Option<TypeRef>,
        body: Vec<Stmt>,
    ) -> Self {
        let symbol = symbol.into();
        let mut member = Self::build(
            format!("operator {}", symbol),
            MemberKind::Operator {
                symbol,
                return_type,
                parameters,
                body: Some(body),
            },
        );
        member.meta.modifiers |= Modifiers::STATIC;
        member
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

    /// Set the initial value of a field or property.
    pub fn with_initial_value(mut self, value: impl Into<String>) -> Self {
        match &mut self.kind {
            MemberKind::Field { initial_value, .. } | MemberKind::Property { initial_value, .. } => {
                *initial_value = Some(value.into());
            }
            _ => {}
        }
        self
    }

    pub fn with_base_call(mut self, args: impl Into<String>) -> Self {
        if let MemberKind::Constructor { base_call, .. } = &mut self.kind {
            *base_call = Some(args.into());
        }
        self
    }

    pub fn has_modifier(&self, modifier: Modifiers) -> bool {
        self.meta.modifiers.contains(modifier)
    }

    pub fn is_static(&self) -> bool {
        self.meta.is_static()
    }

    /// Whether the member carries an explicit body.
    pub fn has_body(&self) -> bool {
        self.body().is_some()
    }

    pub fn body(&self) -> Option<&[Stmt]> {
        match &self.kind {
            MemberKind::Method { body, .. }
            | MemberKind::Constructor { body, .. }
            | MemberKind::Operator { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Mutable access to the body, for members that can have one.
    pub fn body_mut(&mut self) -> Option<&mut Option<Vec<Stmt>>> {
        match &mut self.kind {
            MemberKind::Method { body, .. }
            | MemberKind::Constructor { body, .. }
            | MemberKind::Operator { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.kind {
            MemberKind::Method { parameters, .. }
            | MemberKind::Constructor { parameters, .. }
            | MemberKind::Indexer { parameters, .. }
            | MemberKind::Operator { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// Fields and auto properties: members that only hold data.
    pub fn is_data(&self) -> bool {
        match &self.kind {
            MemberKind::Field { .. } => true,
            MemberKind::Property { getter, setter, .. } => {
                getter.as_ref().is_none_or(Accessor::is_auto)
                    && setter.as_ref().is_none_or(Accessor::is_auto)
            }
            _ => false,
        }
    }

    /// Declared type of a data member.
    pub fn data_type(&self) -> Option<&TypeRef> {
        match &self.kind {
            MemberKind::Field { ty, .. } | MemberKind::Property { ty, .. } => ty.as_ref(),
            MemberKind::Event { ty } | MemberKind::Indexer { ty, .. } => Some(ty),
            _ => None,
        }
    }

    pub fn initial_value(&self) -> Option<&str> {
        match &self.kind {
            MemberKind::Field { initial_value, .. } | MemberKind::Property { initial_value, .. } => {
                initial_value.as_deref()
            }
            _ => None,
        }
    }
}

impl MemberKind {
    pub fn node_kind(&self) -> NodeKind {
        match self {
            MemberKind::Field { .. } => NodeKind::Field,
            MemberKind::Property { .. } => NodeKind::Property,
            MemberKind::Method { .. } => NodeKind::Method,
            MemberKind::Constructor { .. } => NodeKind::Constructor,
            MemberKind::Event { .. } => NodeKind::Event,
            MemberKind::Indexer { .. } => NodeKind::Indexer,
            MemberKind::Operator { .. } => NodeKind::Operator,
        }
    }
}

impl Node for Member {
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

impl Node for Parameter {
    fn node_kind(&self) -> NodeKind {
        NodeKind::Parameter
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn raw_code(&self) -> Option<&str> {
        None
    }
}
