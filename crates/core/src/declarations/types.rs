//! Declaration IR.
//!
//! - TsType: type expressions (primitives, references, unions, objects, conditionals, ...)
//! - TsMember: members of interfaces and object literals
//! - TsTypeDef: one top-level `interface` or `type` declaration

/// TypeScript type expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Keyword types: string, number, unknown, ...
    Primitive(TsPrimitive),
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named reference with optional type arguments: `Item`, `Item<D>`
    Ref { name: String, args: Vec<TsType> },
    /// Array type: T[]
    Array(Box<TsType>),
    /// Tuple type: [A, B]
    Tuple(Vec<TsType>),
    /// Rest element inside a tuple: ...T[]
    Rest(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object literal type: { foo: string; [k: string]: unknown }
    Object(Vec<TsMember>),
    /// Conditional type: C extends E ? T : F
    Conditional {
        check: Box<TsType>,
        extends: Box<TsType>,
        true_type: Box<TsType>,
        false_type: Box<TsType>,
    },
    /// Indexed access type: T['key']
    IndexedAccess {
        object: Box<TsType>,
        index: Box<TsType>,
    },
    /// keyof T
    Keyof(Box<TsType>),
}

/// TypeScript keyword types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Void,
    Unknown,
    Any,
    Never,
    Object,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    String(String),
    /// Kept in source form so `1.50` or `1e3` survive a round trip.
    Number(String),
    Bool(bool),
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub ty: TsType,
    pub optional: bool,
    pub readonly: bool,
    pub doc: Option<String>,
}

/// Index signature: `[k: string]: unknown`
#[derive(Debug, Clone, PartialEq)]
pub struct TsIndexSignature {
    pub key_name: String,
    pub key_ty: TsType,
    pub value: TsType,
    pub readonly: bool,
    pub doc: Option<String>,
}

/// Member of an interface body or object literal
#[derive(Debug, Clone, PartialEq)]
pub enum TsMember {
    Prop(TsProp),
    Index(TsIndexSignature),
}

/// Generic parameter: `D extends ItemTypeDefinition = ItemTypeDefinition`
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeParam {
    pub name: String,
    pub constraint: Option<TsType>,
    pub default: Option<TsType>,
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo extends Bar { ... }
    Interface {
        extends: Vec<TsType>,
        members: Vec<TsMember>,
    },
    /// type Foo = ...
    TypeAlias { ty: TsType },
}

/// Top-level declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    pub name: String,
    /// JSDoc text without the comment markers, lines joined with `\n`
    pub doc: Option<String>,
    pub type_params: Vec<TsTypeParam>,
    pub kind: TypeDefKind,
    pub is_export: bool,
}

impl TsType {
    /// Bare reference without type arguments.
    pub fn named(name: impl Into<String>) -> TsType {
        TsType::Ref {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Reference with type arguments.
    pub fn generic(name: impl Into<String>, args: Vec<TsType>) -> TsType {
        TsType::Ref {
            name: name.into(),
            args,
        }
    }

    /// Whether this is exactly the open shape `{ [k: string]: unknown }` (or `any`).
    pub fn is_open_object(&self) -> bool {
        match self {
            TsType::Object(members) => {
                !members.is_empty() && members.iter().all(TsMember::is_open_index)
            }
            _ => false,
        }
    }
}

impl TsMember {
    pub fn prop(name: impl Into<String>, ty: TsType, optional: bool) -> TsMember {
        TsMember::Prop(TsProp {
            name: name.into(),
            ty,
            optional,
            readonly: false,
            doc: None,
        })
    }

    pub fn is_index(&self) -> bool {
        matches!(self, TsMember::Index(_))
    }

    /// An index signature whose value is `unknown` or `any`.
    pub fn is_open_index(&self) -> bool {
        matches!(
            self,
            TsMember::Index(sig)
                if matches!(sig.value, TsType::Primitive(TsPrimitive::Unknown | TsPrimitive::Any))
        )
    }
}

impl TsTypeDef {
    /// Body of the declaration as a type expression (an interface body becomes an object literal).
    pub fn body(&self) -> TsType {
        match &self.kind {
            TypeDefKind::TypeAlias { ty } => ty.clone(),
            TypeDefKind::Interface { extends, members } => {
                let object = TsType::Object(members.clone());
                if extends.is_empty() {
                    object
                } else {
                    let mut parts = extends.clone();
                    parts.push(object);
                    TsType::Intersection(parts)
                }
            }
        }
    }
}
