//! Runtime key type to generic builder dispatch
//!
//! A resolved path only reports its leaf type at runtime. `builder_for` maps
//! that `FieldType` onto the matching monomorphized `ExpressionBuilder<E, K>`
//! and hands it back behind the object-safe `ErasedBuilder<E>`.

use super::key_type::KeyType;
use super::typed::{check_operator, ExpressionBuilder};
use crate::coercion::coerce;
use crate::descriptor::OperatorKind;
use crate::errors::{QueryError, Result};
use crate::expr::{KeySelector, Predicate, TextComparison};
use crate::model::{FieldType, Reflect, TypeKind, Value};
use crate::path::PropertyPath;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Object-safe face of `ExpressionBuilder<E, K>` for one unknown `K`
pub trait ErasedBuilder<E>: Send + Sync {
    fn key_type(&self) -> FieldType;

    /// Coerce `raw` to the key type, then build the comparison
    ///
    /// # Errors
    ///
    /// `UnsupportedOperatorForType`, `NullDescriptor`, `ConversionFailed`
    /// or `KeyTypeMismatch`.
    fn predicate(&self, path: &PropertyPath, op: OperatorKind, raw: &Value)
        -> Result<Predicate<E>>;

    /// # Errors
    ///
    /// `KeyTypeMismatch` if the path does not end in this key type.
    fn key(&self, path: &PropertyPath) -> Result<KeySelector<E>>;
}

impl<E: Reflect, K: KeyType> ErasedBuilder<E> for ExpressionBuilder<E, K> {
    fn key_type(&self) -> FieldType {
        K::field_type()
    }

    fn predicate(
        &self,
        path: &PropertyPath,
        op: OperatorKind,
        raw: &Value,
    ) -> Result<Predicate<E>> {
        check_operator(path, op, raw)?;
        if raw.is_null() && !K::NULLABLE {
            return Err(QueryError::null_descriptor(format!(
                "{} on required '{}' requires a value",
                op, path
            )));
        }
        let coerced = coerce(raw, K::field_type())?;
        let actual = coerced.type_name();
        let value = K::from_value(coerced).ok_or_else(|| QueryError::KeyTypeMismatch {
            path: path.text(),
            expected: K::field_type().to_string(),
            actual: actual.to_string(),
        })?;
        self.build_predicate(path, op, value)
    }

    fn key(&self, path: &PropertyPath) -> Result<KeySelector<E>> {
        self.build_key(path).map(|typed| typed.erase())
    }
}

macro_rules! dispatch {
    ($field_type:expr, $comparison:expr, { $($kind:ident => $ty:ty),* $(,)? }) => {
        match ($field_type.kind, $field_type.nullable) {
            $(
                (TypeKind::$kind, false) => {
                    Some(Box::new(ExpressionBuilder::<E, $ty>::new($comparison)) as Box<dyn ErasedBuilder<E>>)
                }
                (TypeKind::$kind, true) => {
                    Some(Box::new(ExpressionBuilder::<E, Option<$ty>>::new($comparison)) as Box<dyn ErasedBuilder<E>>)
                }
            )*
            (TypeKind::Object(_), _) => None,
        }
    };
}

/// Instantiate the builder whose key type matches `field_type`
///
/// Returns `None` for nested entity types; those can be navigated through
/// but never compared or sorted on.
pub fn builder_for<E: Reflect + 'static>(
    field_type: FieldType,
    text_comparison: TextComparison,
) -> Option<Box<dyn ErasedBuilder<E>>> {
    dispatch!(field_type, text_comparison, {
        Bool => bool,
        Int32 => i32,
        Int64 => i64,
        Float64 => f64,
        Text => String,
        Uuid => Uuid,
        Date => NaiveDate,
        DateTime => DateTime<Utc>,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertyInfo, PropertyValue, TypeInfo};

    struct Ticket {
        id: Uuid,
        priority: Option<i64>,
    }

    static TICKET: TypeInfo = TypeInfo::new(
        "Ticket",
        &[
            PropertyInfo::new("Id", FieldType::required(TypeKind::Uuid)),
            PropertyInfo::new("Priority", FieldType::nullable(TypeKind::Int64)),
            PropertyInfo::new("Parent", FieldType::optional_object(&TICKET)),
        ],
    );

    impl Reflect for Ticket {
        fn type_info() -> &'static TypeInfo {
            &TICKET
        }

        fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
            match name {
                "Id" => Some(PropertyValue::Scalar(Value::Uuid(self.id))),
                "Priority" => Some(PropertyValue::Scalar(Value::from(self.priority))),
                "Parent" => Some(PropertyValue::Object(None)),
                _ => None,
            }
        }
    }

    fn erased(path: &PropertyPath) -> Box<dyn ErasedBuilder<Ticket>> {
        builder_for::<Ticket>(path.leaf_type(), TextComparison::Ordinal).unwrap()
    }

    #[test]
    fn test_dispatch_picks_matching_key_type() {
        let path = PropertyPath::resolve(&TICKET, "Priority").unwrap();
        assert_eq!(erased(&path).key_type(), FieldType::nullable(TypeKind::Int64));
    }

    #[test]
    fn test_object_leaf_has_no_builder() {
        let parent = FieldType::optional_object(&TICKET);
        assert!(builder_for::<Ticket>(parent, TextComparison::Ordinal).is_none());
    }

    #[test]
    fn test_raw_text_is_coerced_before_building() {
        let id = Uuid::new_v4();
        let path = PropertyPath::resolve(&TICKET, "id").unwrap();
        let predicate = erased(&path)
            .predicate(&path, OperatorKind::Equal, &Value::Text(id.to_string()))
            .unwrap();

        let ticket = Ticket {
            id,
            priority: None,
        };
        assert!(predicate.evaluate(&ticket).unwrap());
    }

    #[test]
    fn test_empty_text_on_nullable_means_null() {
        let path = PropertyPath::resolve(&TICKET, "Priority").unwrap();
        let predicate = erased(&path)
            .predicate(&path, OperatorKind::Equal, &Value::from(""))
            .unwrap();

        let ticket = Ticket {
            id: Uuid::new_v4(),
            priority: None,
        };
        assert!(predicate.evaluate(&ticket).unwrap());
    }

    #[test]
    fn test_null_on_required_key_is_null_descriptor() {
        let path = PropertyPath::resolve(&TICKET, "Id").unwrap();
        let err = erased(&path)
            .predicate(&path, OperatorKind::Equal, &Value::Null)
            .unwrap_err();
        assert!(matches!(err, QueryError::NullDescriptor { .. }));
    }

    #[test]
    fn test_bad_literal_fails_conversion() {
        let path = PropertyPath::resolve(&TICKET, "Priority").unwrap();
        let err = erased(&path)
            .predicate(&path, OperatorKind::GreaterThan, &Value::from("high"))
            .unwrap_err();
        assert!(matches!(err, QueryError::ConversionFailed { .. }));
    }
}
