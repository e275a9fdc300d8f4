//! Static entity shapes and runtime property access
//!
//! Entities describe themselves once through a `static TypeInfo` and expose
//! property values by name through `Reflect`. The path resolver only ever
//! reads the static shape; the reference evaluator reads values.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::Value;

/// Runtime type tag of a property
#[derive(Clone, Copy)]
pub enum TypeKind {
    Bool,
    Int32,
    Int64,
    Float64,
    Text,
    Uuid,
    Date,
    DateTime,
    /// A nested entity exposing its own properties
    Object(&'static TypeInfo),
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Bool => "Bool",
            TypeKind::Int32 => "Int32",
            TypeKind::Int64 => "Int64",
            TypeKind::Float64 => "Float64",
            TypeKind::Text => "Text",
            TypeKind::Uuid => "Uuid",
            TypeKind::Date => "Date",
            TypeKind::DateTime => "DateTime",
            TypeKind::Object(info) => info.name,
        }
    }

    pub fn object_type(&self) -> Option<&'static TypeInfo> {
        match self {
            TypeKind::Object(info) => Some(info),
            _ => None,
        }
    }
}

// Object kinds compare by type identity; type names are unique per entity.
impl PartialEq for TypeKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeKind::Object(a), TypeKind::Object(b)) => a.same_type(b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Eq for TypeKind {}

impl Hash for TypeKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        if let TypeKind::Object(info) = self {
            info.name.hash(state);
        }
    }
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Object(info) => write!(f, "Object({})", info.name),
            other => f.write_str(other.name()),
        }
    }
}

/// Declared type of a property: a kind plus nullability
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType {
    pub kind: TypeKind,
    pub nullable: bool,
}

impl FieldType {
    pub const BOOL: FieldType = FieldType::required(TypeKind::Bool);

    pub const fn required(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    pub const fn nullable(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    /// A nested entity property that is always present
    pub const fn object(info: &'static TypeInfo) -> Self {
        Self::required(TypeKind::Object(info))
    }

    /// A nested entity property that may be absent
    pub const fn optional_object(info: &'static TypeInfo) -> Self {
        Self::nullable(TypeKind::Object(info))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, TypeKind::Bool)
    }

    /// Contains / StartsWith / EndsWith are only defined on text
    pub fn supports_text_search(&self) -> bool {
        matches!(self.kind, TypeKind::Text)
    }

    /// Whether `<`, `<=`, `>`, `>=` are defined
    pub fn supports_ordering_comparison(&self) -> bool {
        !matches!(self.kind, TypeKind::Bool | TypeKind::Object(_))
    }

    /// Whether values of this type can be used as a sort key
    pub fn is_sortable(&self) -> bool {
        !self.is_object()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A declared property of an entity type
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl PropertyInfo {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

/// Static shape of an entity type
pub struct TypeInfo {
    pub name: &'static str,
    pub properties: &'static [PropertyInfo],
}

impl TypeInfo {
    pub const fn new(name: &'static str, properties: &'static [PropertyInfo]) -> Self {
        Self { name, properties }
    }

    /// Look up a property by exact name
    pub fn property(&'static self, name: &str) -> Option<&'static PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Look up a property ignoring ASCII case
    pub fn property_ignore_case(&'static self, name: &str) -> Option<&'static PropertyInfo> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn same_type(&self, other: &TypeInfo) -> bool {
        std::ptr::eq(self, other) || self.name == other.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.same_type(other)
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field(
                "properties",
                &self.properties.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Value of a property read through `Reflect`
pub enum PropertyValue<'a> {
    Scalar(Value),
    /// A nested entity; `None` when the reference is absent
    Object(Option<&'a dyn Reflect>),
}

/// Runtime property access for entity types
///
/// # Example
///
/// ```
/// use querex_core::model::{
///     FieldType, PropertyInfo, PropertyValue, Reflect, TypeInfo, TypeKind, Value,
/// };
///
/// struct Tag {
///     label: String,
/// }
///
/// static TAG: TypeInfo = TypeInfo::new(
///     "Tag",
///     &[PropertyInfo::new("Label", FieldType::required(TypeKind::Text))],
/// );
///
/// impl Reflect for Tag {
///     fn type_info() -> &'static TypeInfo {
///         &TAG
///     }
///
///     fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
///         match name {
///             "Label" => Some(PropertyValue::Scalar(Value::from(self.label.as_str()))),
///             _ => None,
///         }
///     }
/// }
///
/// assert_eq!(Tag::type_info().name, "Tag");
/// ```
pub trait Reflect {
    /// Static shape of the implementing type
    fn type_info() -> &'static TypeInfo
    where
        Self: Sized;

    /// Read a property by its declared (canonical) name
    fn property(&self, name: &str) -> Option<PropertyValue<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    static INNER: TypeInfo = TypeInfo::new(
        "Inner",
        &[PropertyInfo::new("Code", FieldType::required(TypeKind::Text))],
    );

    static OUTER: TypeInfo = TypeInfo::new(
        "Outer",
        &[
            PropertyInfo::new("Count", FieldType::required(TypeKind::Int32)),
            PropertyInfo::new("Inner", FieldType::optional_object(&INNER)),
        ],
    );

    #[test]
    fn test_property_lookup_modes() {
        assert!(OUTER.property("Count").is_some());
        assert!(OUTER.property("count").is_none());
        assert_eq!(OUTER.property_ignore_case("COUNT").unwrap().name, "Count");
    }

    #[test]
    fn test_object_kind_equality_is_by_type() {
        let a = TypeKind::Object(&INNER);
        let b = TypeKind::Object(&INNER);
        assert_eq!(a, b);
        assert_ne!(a, TypeKind::Object(&OUTER));
        assert_ne!(TypeKind::Int32, TypeKind::Int64);
    }

    #[test]
    fn test_capabilities() {
        let text = FieldType::required(TypeKind::Text);
        let flag = FieldType::required(TypeKind::Bool);
        assert!(text.supports_text_search());
        assert!(!flag.supports_ordering_comparison());
        assert!(flag.is_sortable());
        assert!(!FieldType::object(&INNER).is_sortable());
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::nullable(TypeKind::Int32).to_string(), "Int32?");
        assert_eq!(FieldType::object(&INNER).to_string(), "Inner");
    }
}
