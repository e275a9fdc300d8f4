#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{names, person, Person};
use querex_core::{
    build_filter, build_sorter, FilterDescriptor, MemorySource, OperatorKind, QueryError,
    SortDescriptor,
};

fn people() -> Vec<Person> {
    vec![person("A", 17), person("B", 20)]
}

#[test]
fn test_age_greater_than_text_value() {
    let chain = build_filter::<Person>(&[FilterDescriptor::new(
        "Age",
        OperatorKind::GreaterThan,
        "18",
    )])
    .unwrap();

    let result = chain.apply_to(MemorySource::new(people())).unwrap().into_vec();
    assert_eq!(names(&result), vec!["B"]);
}

#[test]
fn test_name_starts_with() {
    let chain = build_filter::<Person>(&[FilterDescriptor::starts_with("Name", "A")]).unwrap();

    let result = chain.apply_to(MemorySource::new(people())).unwrap().into_vec();
    assert_eq!(names(&result), vec!["A"]);
}

#[test]
fn test_sort_by_age_ascending() {
    let sorter = build_sorter::<Person>(&[SortDescriptor::asc("Age")]).unwrap();
    let source = MemorySource::new(vec![person("five", 5), person("one", 1)]);

    let result = sorter.apply_to(source).unwrap().into_vec().unwrap();
    let ages: Vec<i32> = result.iter().map(|p| p.age).collect();
    assert_eq!(ages, vec![1, 5]);
}

#[test]
fn test_contains_on_integer_is_rejected() {
    let err = build_filter::<Person>(&[FilterDescriptor::contains("Age", "1")]).unwrap_err();
    assert!(
        matches!(err, QueryError::UnsupportedOperatorForType { ref operator, .. } if operator == "Contains"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_unresolvable_filter_is_never_a_no_op() {
    let err = build_filter::<Person>(&[
        FilterDescriptor::gt("Age", "18"),
        FilterDescriptor::eq("Nickname", "x"),
    ])
    .unwrap_err();

    assert_eq!(
        err,
        QueryError::UnknownProperty {
            path: "Nickname".to_string(),
            type_name: "Person".to_string(),
            segment: "Nickname".to_string(),
        }
    );
}
