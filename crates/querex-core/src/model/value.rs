use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use super::TypeKind;

/// Dynamic scalar value
///
/// Raw descriptor values, coerced constants and evaluated property values all
/// travel as `Value`. Nested entities never appear here; property access
/// hands those out as `&dyn Reflect` instead.
///
/// On the wire a value is a bare scalar. Strings arrive as `Text` and whole
/// numbers as `Int32` or `Int64`; coercion converts them to the property's
/// declared type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Text(String),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

/// Where null keys land when ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    #[default]
    NullsFirst,
    NullsLast,
}

impl Value {
    /// Runtime type of the value; `None` for null
    pub fn kind(&self) -> Option<TypeKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(TypeKind::Bool),
            Value::Int32(_) => Some(TypeKind::Int32),
            Value::Int64(_) => Some(TypeKind::Int64),
            Value::Float64(_) => Some(TypeKind::Float64),
            Value::Text(_) => Some(TypeKind::Text),
            Value::Uuid(_) => Some(TypeKind::Uuid),
            Value::Date(_) => Some(TypeKind::Date),
            Value::DateTime(_) => Some(TypeKind::DateTime),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the runtime type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        self.kind().map_or("Null", |k| k.name())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Culture-free textual form, parseable back by coercion
    pub fn to_invariant_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            other => other.to_string(),
        }
    }

    /// Compare two non-null values of compatible types
    ///
    /// Integers and floats compare numerically across widths. Returns `None`
    /// when either side is null, the kinds differ, or a float is NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Int32(a), Int32(b)) => Some(a.cmp(b)),
            (Int64(a), Int64(b)) => Some(a.cmp(b)),
            (Int32(a), Int64(b)) => Some(i64::from(*a).cmp(b)),
            (Int64(a), Int32(b)) => Some(a.cmp(&i64::from(*b))),
            (Float64(a), Float64(b)) => a.partial_cmp(b),
            (Float64(a), Int32(b)) => a.partial_cmp(&f64::from(*b)),
            (Int32(a), Float64(b)) => f64::from(*a).partial_cmp(b),
            (Float64(a), Int64(b)) => a.partial_cmp(&(*b as f64)),
            (Int64(a), Float64(b)) => (*a as f64).partial_cmp(b),
            (Text(a), Text(b)) => Some(a.as_str().cmp(b.as_str())),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Date(a), Date(b)) => Some(a.cmp(b)),
            (DateTime(a), DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used when sorting keys
    ///
    /// Nulls are placed according to `nulls`; NaN sorts after every other
    /// float; mismatched kinds compare equal so a stable sort keeps them in
    /// input order.
    pub fn sort_cmp(&self, other: &Value, nulls: NullOrdering) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match nulls {
                NullOrdering::NullsFirst => Ordering::Less,
                NullOrdering::NullsLast => Ordering::Greater,
            },
            (false, true) => match nulls {
                NullOrdering::NullsFirst => Ordering::Greater,
                NullOrdering::NullsLast => Ordering::Less,
            },
            (false, false) => match (self, other) {
                (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
                _ => self.compare(other).unwrap_or(Ordering::Equal),
            },
        }
    }
}

// Floats compare by bit pattern so that `Value` can be `Eq + Hash` for
// structural expression equality. Numeric comparison lives in `compare`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (Float64(a), Float64(b)) => a.to_bits() == b.to_bits(),
            (Text(a), Text(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int32(i) => i.hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(i) => write!(f, "{}", i),
            Value::Int64(i) => write!(f, "{}", i),
            Value::Float64(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f64 => Float64,
    String => Text,
    Uuid => Uuid,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
