//! Property-based checks for coercion and built predicates

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::{DateTime, NaiveDate, Utc};
use common::{person, Person};
use proptest::prelude::*;
use querex_core::model::{FieldType, Value};
use querex_core::{build_filter, coerce, FilterDescriptor, OperatorKind, SortDescriptor};
use uuid::Uuid;

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::Int32),
        any::<i64>().prop_map(Value::Int64),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float64),
        "[a-zA-Z0-9 ]{1,12}".prop_map(Value::Text),
        any::<u128>().prop_map(|n| Value::Uuid(Uuid::from_u128(n))),
        (1i32..9999, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())),
        (0i64..4_102_444_800, 0u32..1_000_000_000).prop_map(|(secs, nanos)| {
            Value::DateTime(DateTime::<Utc>::from_timestamp(secs, nanos).unwrap())
        }),
    ]
}

fn person_strategy() -> impl Strategy<Value = Person> {
    ("[a-c]{0,4}", -5i32..120).prop_map(|(name, age)| person(&name, age))
}

fn manual(op: OperatorKind, actual: i32, expected: i32) -> bool {
    match op {
        OperatorKind::Equal => actual == expected,
        OperatorKind::NotEqual => actual != expected,
        OperatorKind::GreaterThan => actual > expected,
        OperatorKind::GreaterThanOrEqual => actual >= expected,
        OperatorKind::LessThan => actual < expected,
        OperatorKind::LessThanOrEqual => actual <= expected,
        _ => unreachable!("text operators are not defined on Age"),
    }
}

fn manual_text(op: OperatorKind, actual: &str, expected: &str) -> bool {
    match op {
        OperatorKind::Equal => actual == expected,
        OperatorKind::NotEqual => actual != expected,
        OperatorKind::Contains => actual.contains(expected),
        OperatorKind::StartsWith => actual.starts_with(expected),
        OperatorKind::EndsWith => actual.ends_with(expected),
        OperatorKind::GreaterThan => actual > expected,
        OperatorKind::GreaterThanOrEqual => actual >= expected,
        OperatorKind::LessThan => actual < expected,
        OperatorKind::LessThanOrEqual => actual <= expected,
    }
}

proptest! {
    #[test]
    fn prop_coerce_round_trips_through_text(value in scalar_value()) {
        let kind = value.kind().unwrap();
        let text = Value::Text(value.to_invariant_string());
        let back = coerce(&text, FieldType::required(kind)).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_age_predicate_matches_manual_comparison(
        p in person_strategy(),
        threshold in -5i32..120,
        op_index in 0usize..6,
    ) {
        let ops = [
            OperatorKind::Equal,
            OperatorKind::NotEqual,
            OperatorKind::GreaterThan,
            OperatorKind::GreaterThanOrEqual,
            OperatorKind::LessThan,
            OperatorKind::LessThanOrEqual,
        ];
        let op = ops[op_index];
        let chain = build_filter::<Person>(&[
            FilterDescriptor::new("Age", op, threshold.to_string().as_str()),
        ]).unwrap();
        let predicate = chain.extract_expression().unwrap();

        prop_assert_eq!(predicate.evaluate(&p).unwrap(), manual(op, p.age, threshold));
    }

    #[test]
    fn prop_name_predicate_matches_manual_comparison(
        p in person_strategy(),
        needle in "[a-c]{0,2}",
        op_index in 0usize..9,
    ) {
        let op = OperatorKind::ALL[op_index];
        let chain = build_filter::<Person>(&[
            FilterDescriptor::new("Name", op, needle.as_str()),
        ]).unwrap();
        let predicate = chain.extract_expression().unwrap();

        prop_assert_eq!(
            predicate.evaluate(&p).unwrap(),
            manual_text(op, &p.name, &needle)
        );
    }

    #[test]
    fn prop_conjunction_matches_both_parts(
        p in person_strategy(),
        low in -5i32..60,
        prefix in "[a-c]{0,1}",
    ) {
        let d1 = FilterDescriptor::gte("Age", low);
        let d2 = FilterDescriptor::starts_with("Name", prefix.as_str());
        let merged = build_filter::<Person>(&[d1, d2]).unwrap().extract_expression().unwrap();

        let expected = p.age >= low && p.name.starts_with(prefix.as_str());
        prop_assert_eq!(merged.evaluate(&p).unwrap(), expected);
    }

    #[test]
    fn prop_sort_orders_by_age_then_keeps_input_order(
        people in prop::collection::vec(person_strategy(), 0..20),
    ) {
        let sorter = querex_core::build_sorter::<Person>(&[SortDescriptor::asc("Age")]).unwrap();
        let sorted = sorter
            .apply_to(querex_core::MemorySource::new(people.clone()))
            .unwrap()
            .into_vec()
            .unwrap();

        let mut expected = people;
        expected.sort_by_key(|p| p.age);
        prop_assert_eq!(sorted, expected);
    }
}
