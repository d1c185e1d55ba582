//! The type model: one immutable description per generated type.
//!
//! A run derives the whole set once, hands it to the declaration emitter and
//! the codec emitter by reference, and then drops it.

/// Underlying scalar kind of a [`PrimitiveType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Integer,
    /// Floating-point or arbitrary-precision decimal number.
    Float,
    Boolean,
    /// Untyped JSON value.
    Any,
    /// Reference to another generated type by identifier.
    Reference,
}

/// A leaf type: a built-in scalar or a reference to another generated type.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveType {
    pub identifier: String,
    pub kind: ScalarKind,
}

impl PrimitiveType {
    #[must_use]
    pub fn new(identifier: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
        }
    }

    #[must_use]
    pub fn reference(identifier: impl Into<String>) -> Self {
        Self::new(identifier, ScalarKind::Reference)
    }
}

/// A named member of a [`RecordType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Raw schema property name, used verbatim as the JSON key.
    pub name: String,
    pub r#type: TypeModel,
    pub required: bool,
}

/// A type with named, ordered members and optional open properties.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub identifier: String,
    pub description: Option<String>,
    /// Members in schema order. Names are unique within a record.
    pub properties: Vec<Property>,
    /// Value type of keys beyond `properties`; `None` when the schema
    /// forbids or ignores additional properties.
    pub additional: Option<Box<TypeModel>>,
}

/// An ordered sequence, or a set when `unique` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub identifier: String,
    pub items: Box<TypeModel>,
    pub unique: bool,
}

/// A literal permitted by an [`EnumerationType`].
#[derive(Debug, Clone, PartialEq)]
pub enum EnumLiteral {
    String(String),
    Integer(i64),
    Float(f64),
}

/// A closed set of literal values over one scalar kind.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationType {
    pub identifier: String,
    pub description: Option<String>,
    pub underlying: PrimitiveType,
    pub values: Vec<EnumLiteral>,
}

impl EnumerationType {
    /// Floating-point enumerations are never emitted.
    #[must_use]
    pub fn is_floating_point(&self) -> bool {
        self.underlying.kind == ScalarKind::Float
    }
}

/// Closed set of type-model variants.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeModel {
    Primitive(PrimitiveType),
    Record(RecordType),
    Array(ArrayType),
    Enumeration(EnumerationType),
}

impl TypeModel {
    /// The generated type name. Unique across one type set.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Primitive(primitive) => &primitive.identifier,
            Self::Record(record) => &record.identifier,
            Self::Array(array) => &array.identifier,
            Self::Enumeration(enumeration) => &enumeration.identifier,
        }
    }

    /// True when rendering this type as a member type needs `BTreeSet`.
    #[must_use]
    pub fn mentions_set(&self) -> bool {
        match self {
            Self::Array(array) => array.unique || array.items.mentions_set(),
            Self::Primitive(_) | Self::Record(_) | Self::Enumeration(_) => false,
        }
    }
}
