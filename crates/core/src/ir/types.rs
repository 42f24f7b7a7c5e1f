//! TypeScript declaration IR.

/// TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, null, any
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object type: { foo: string; bar?: number }
    Object(TsObject),
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named declaration reference
    Ref(String),
}

impl TsType {
    /// The `any` type.
    pub const ANY: TsType = TsType::Primitive(TsPrimitive::Any);

    /// Allow `null` in addition to this type.
    pub fn nullable(self) -> TsType {
        let null = TsType::Primitive(TsPrimitive::Null);
        match self {
            TsType::Primitive(TsPrimitive::Null | TsPrimitive::Any) => self,
            TsType::Union(mut members) => {
                if !members.contains(&null) {
                    members.push(null);
                }
                TsType::Union(members)
            }
            other => TsType::Union(vec![other, null]),
        }
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
    /// `any`
    Any,
}

/// Structural object type, also the body of an interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsObject {
    /// Declared properties.
    pub props: Vec<TsProp>,
    /// Value type of the `[key: string]` index signature.
    pub index: Option<Box<TsType>>,
}

impl TsObject {
    /// Order properties by name (byte order). Stable, so already sorted input is unchanged.
    pub fn sort_props(&mut self) {
        self.props.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property name as written in the document.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Rendered with `?`.
    pub optional: bool,
    /// Doc comment text.
    pub doc: Option<String>,
    /// Format hint, rendered as a trailing comment.
    pub format: Option<String>,
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// `"text"`
    String(String),
    /// Non-integral number.
    Number(f64),
    /// Integral number.
    Int(i64),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface(TsObject),
    /// type Foo = ...
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
}

/// One named declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Declared name (already a valid identifier).
    pub name: String,
    /// Prefixed with `export`.
    pub exported: bool,
    /// Doc comment text.
    pub doc: Option<String>,
    /// Interface or alias.
    pub kind: TypeDefKind,
}

/// Complete declaration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsModule {
    /// Enclosing `declare namespace`, if any.
    pub namespace: Option<String>,
    /// Declarations in production order.
    pub types: Vec<TsTypeDef>,
}
