//! Statically typed key slots
//!
//! `KeyType` links a Rust type to the `TypeKind` a resolved path reports at
//! runtime, so the generic builder can be instantiated per key type.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::model::{FieldType, TypeKind, Value};

/// A scalar type usable as the key of a typed builder
pub trait KeyType: Clone + Send + Sync + 'static {
    const KIND: TypeKind;
    const NULLABLE: bool = false;

    /// Take a value of exactly this type out of a `Value`
    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;

    fn field_type() -> FieldType {
        FieldType {
            kind: Self::KIND,
            nullable: Self::NULLABLE,
        }
    }
}

macro_rules! key_type {
    ($ty:ty, $kind:ident) => {
        impl KeyType for $ty {
            const KIND: TypeKind = TypeKind::$kind;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(v),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$kind(self)
            }
        }
    };
}

key_type!(bool, Bool);
key_type!(i32, Int32);
key_type!(i64, Int64);
key_type!(f64, Float64);
key_type!(String, Text);
key_type!(Uuid, Uuid);
key_type!(NaiveDate, Date);
key_type!(DateTime<Utc>, DateTime);

impl<T: KeyType> KeyType for Option<T> {
    const KIND: TypeKind = T::KIND;
    const NULLABLE: bool = true;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, T::into_value)
    }
}
