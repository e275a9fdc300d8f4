//! Declarative filter and sort inputs
//!
//! Descriptors are plain data handed in by callers, typically deserialized
//! from a request. They carry a dotted property path and either an operator
//! plus raw value or a sort direction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Value;
use querex_core_types::Sensitive;

/// Closed set of filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorKind {
    Equal,
    NotEqual,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 9] = [
        OperatorKind::Equal,
        OperatorKind::NotEqual,
        OperatorKind::Contains,
        OperatorKind::StartsWith,
        OperatorKind::EndsWith,
        OperatorKind::GreaterThan,
        OperatorKind::GreaterThanOrEqual,
        OperatorKind::LessThan,
        OperatorKind::LessThanOrEqual,
    ];

    /// Contains, StartsWith and EndsWith
    pub fn is_text_search(&self) -> bool {
        matches!(
            self,
            OperatorKind::Contains | OperatorKind::StartsWith | OperatorKind::EndsWith
        )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            OperatorKind::GreaterThan
                | OperatorKind::GreaterThanOrEqual
                | OperatorKind::LessThan
                | OperatorKind::LessThanOrEqual
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Equal => "Equal",
            OperatorKind::NotEqual => "NotEqual",
            OperatorKind::Contains => "Contains",
            OperatorKind::StartsWith => "StartsWith",
            OperatorKind::EndsWith => "EndsWith",
            OperatorKind::GreaterThan => "GreaterThan",
            OperatorKind::GreaterThanOrEqual => "GreaterThanOrEqual",
            OperatorKind::LessThan => "LessThan",
            OperatorKind::LessThanOrEqual => "LessThanOrEqual",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// `{path, operator, value}`
///
/// `Debug` redacts the raw value; it is client input and may be sensitive.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub property: String,
    pub operator: OperatorKind,
    #[serde(default)]
    pub value: Value,
}

impl FilterDescriptor {
    pub fn new(property: impl Into<String>, operator: OperatorKind, value: impl Into<Value>) -> Self {
        Self {
            property: property.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::Equal, value)
    }

    pub fn not_eq(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::NotEqual, value)
    }

    pub fn contains(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::Contains, value)
    }

    pub fn starts_with(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::StartsWith, value)
    }

    pub fn ends_with(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::EndsWith, value)
    }

    pub fn gt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::GreaterThan, value)
    }

    pub fn gte(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::GreaterThanOrEqual, value)
    }

    pub fn lt(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::LessThan, value)
    }

    pub fn lte(property: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(property, OperatorKind::LessThanOrEqual, value)
    }
}

impl fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("property", &self.property)
            .field("operator", &self.operator)
            .field("value", &Sensitive::new(&self.value))
            .finish()
    }
}

/// `{path, direction}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub property: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Ascending)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes_are_disjoint() {
        for op in OperatorKind::ALL {
            assert!(!(op.is_text_search() && op.is_ordering()), "{}", op);
        }
        assert_eq!(
            OperatorKind::ALL.iter().filter(|o| o.is_text_search()).count(),
            3
        );
    }

    #[test]
    fn test_filter_debug_redacts_value() {
        let d = FilterDescriptor::eq("Email", "alice@example.com");
        let rendered = format!("{:?}", d);
        assert!(rendered.contains("Email"));
        assert!(!rendered.contains("alice"));
    }

    #[test]
    fn test_descriptors_deserialize_from_json() {
        let filter: FilterDescriptor = serde_json::from_str(
            r#"{"property": "Age", "operator": "GreaterThan", "value": "18"}"#,
        )
        .unwrap();
        assert_eq!(filter, FilterDescriptor::gt("Age", "18"));

        let filter: FilterDescriptor = serde_json::from_str(
            r#"{"property": "Age", "operator": "GreaterThan", "value": 18}"#,
        )
        .unwrap();
        assert_eq!(filter, FilterDescriptor::gt("Age", 18));

        let filter: FilterDescriptor =
            serde_json::from_str(r#"{"property": "Email", "operator": "Equal", "value": null}"#)
                .unwrap();
        assert_eq!(filter, FilterDescriptor::eq("Email", None::<String>));

        let sort: SortDescriptor = serde_json::from_str(r#"{"property": "Name"}"#).unwrap();
        assert_eq!(sort.direction, SortDirection::Ascending);
    }
}
