//! Value coercion
//!
//! Converts a raw descriptor value (usually text from a query string) into
//! the exact declared type of the property it is compared against, so that
//! the built comparison holds a constant of the statically expected type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use querex_core_types::Sensitive;
use uuid::Uuid;

use crate::errors::{QueryError, Result};
use crate::model::{FieldType, TypeKind, Value};

/// Coerce `raw` into a value of `target`
///
/// Rules, first match wins:
/// 1. `raw` already has the target kind: returned unchanged
/// 2. `raw` is null or empty text and `target` is nullable: null
/// 3. `target` is `Uuid`: parsed from text
/// 4. otherwise a culture-free conversion, or `ConversionFailed`
///
/// # Errors
///
/// Returns `ConversionFailed` carrying the (redacted) raw value, the target
/// type and the reason. Never falls back to a default value.
pub fn coerce(raw: &Value, target: FieldType) -> Result<Value> {
    if raw.kind() == Some(target.kind) {
        return Ok(raw.clone());
    }

    let blank = match raw {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    };
    if blank && target.nullable {
        return Ok(Value::Null);
    }
    if raw.is_null() {
        return Err(failed(raw, target, "null is not allowed for a required value"));
    }

    match target.kind {
        TypeKind::Uuid => match raw {
            Value::Text(s) => Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .map_err(|e| failed(raw, target, e.to_string())),
            _ => Err(unsupported(raw, target)),
        },
        TypeKind::Text => Ok(Value::Text(raw.to_invariant_string())),
        TypeKind::Bool => to_bool(raw, target),
        TypeKind::Int32 => to_i64(raw, target).and_then(|v| {
            i32::try_from(v)
                .map(Value::Int32)
                .map_err(|_| failed(raw, target, "value out of range for Int32"))
        }),
        TypeKind::Int64 => to_i64(raw, target).map(Value::Int64),
        TypeKind::Float64 => to_f64(raw, target).map(Value::Float64),
        TypeKind::Date => to_date(raw, target).map(Value::Date),
        TypeKind::DateTime => to_date_time(raw, target).map(Value::DateTime),
        TypeKind::Object(_) => Err(unsupported(raw, target)),
    }
}

fn failed(raw: &Value, target: FieldType, reason: impl Into<String>) -> QueryError {
    QueryError::ConversionFailed {
        value: Sensitive::new(raw.clone()),
        target: target.to_string(),
        reason: reason.into(),
    }
}

fn unsupported(raw: &Value, target: FieldType) -> QueryError {
    failed(
        raw,
        target,
        format!("no conversion from {}", raw.type_name()),
    )
}

fn to_bool(raw: &Value, target: FieldType) -> Result<Value> {
    match raw {
        Value::Text(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(failed(raw, target, "expected 'true' or 'false'"))
            }
        }
        Value::Int32(i) => Ok(Value::Bool(*i != 0)),
        Value::Int64(i) => Ok(Value::Bool(*i != 0)),
        _ => Err(unsupported(raw, target)),
    }
}

fn to_i64(raw: &Value, target: FieldType) -> Result<i64> {
    match raw {
        Value::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| failed(raw, target, e.to_string())),
        Value::Int32(i) => Ok(i64::from(*i)),
        Value::Int64(i) => Ok(*i),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Float64(f) => {
            // Only integral floats convert; rounding would change the filter.
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                Ok(*f as i64)
            } else {
                Err(failed(raw, target, "float is not an integral value in range"))
            }
        }
        _ => Err(unsupported(raw, target)),
    }
}

fn to_f64(raw: &Value, target: FieldType) -> Result<f64> {
    match raw {
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| failed(raw, target, e.to_string())),
        Value::Int32(i) => Ok(f64::from(*i)),
        Value::Int64(i) => Ok(*i as f64),
        _ => Err(unsupported(raw, target)),
    }
}

fn to_date(raw: &Value, target: FieldType) -> Result<NaiveDate> {
    match raw {
        Value::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| failed(raw, target, e.to_string())),
        Value::DateTime(dt) => Ok(dt.date_naive()),
        _ => Err(unsupported(raw, target)),
    }
}

fn to_date_time(raw: &Value, target: FieldType) -> Result<DateTime<Utc>> {
    match raw {
        Value::Text(s) => parse_date_time(s.trim()).ok_or_else(|| {
            failed(
                raw,
                target,
                "expected RFC 3339, 'YYYY-MM-DDTHH:MM:SS' or 'YYYY-MM-DD'",
            )
        }),
        Value::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| failed(raw, target, "date out of range")),
        _ => Err(unsupported(raw, target)),
    }
}

// Offset-less forms are taken as UTC.
fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
