#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{ADDRESS, ORDER, PERSON};
use querex_core::model::{FieldType, TypeKind};
use querex_core::{EngineConfig, PathMatching, PathResolver, PropertyPath, QueryError};

#[test]
fn test_leaf_type_follows_manual_walk() {
    let path = PropertyPath::resolve(&ORDER, "Customer.Address.City").unwrap();

    let customer = ORDER.property("Customer").unwrap();
    let address = customer
        .field_type
        .kind
        .object_type()
        .unwrap()
        .property("Address")
        .unwrap();
    let city = address.field_type.kind.object_type().unwrap().property("City").unwrap();

    assert_eq!(path.segments(), &[customer, address, city]);
    assert_eq!(path.leaf_type(), FieldType::required(TypeKind::Text));
}

#[test]
fn test_unknown_segment_is_named() {
    let err = PropertyPath::resolve(&ORDER, "Customer.Adress.City").unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownProperty {
            path: "Customer.Adress.City".to_string(),
            type_name: "Person".to_string(),
            segment: "Adress".to_string(),
        }
    );
}

#[test]
fn test_stepping_into_scalar_fails() {
    let err = PropertyPath::resolve(&PERSON, "Age.Value").unwrap_err();
    match err {
        QueryError::UnknownProperty {
            segment, type_name, ..
        } => {
            assert_eq!(segment, "Value");
            assert_eq!(type_name, "Int32");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_exact_matching_from_config() {
    let config = EngineConfig::from_toml_str(r#"path_matching = "exact""#).unwrap();
    let resolver = config.path_resolver();

    assert!(resolver.resolve(&ADDRESS, "City").is_ok());
    assert!(matches!(
        resolver.resolve(&ADDRESS, "city"),
        Err(QueryError::UnknownProperty { .. })
    ));
}

#[test]
fn test_depth_limit() {
    let resolver = PathResolver::new(PathMatching::CaseInsensitive, 2);
    assert!(resolver.resolve(&PERSON, "Address.Zip").is_ok());
    assert_eq!(
        resolver.resolve(&ORDER, "Customer.Address.Zip").unwrap_err(),
        QueryError::PathTooDeep {
            path: "Customer.Address.Zip".to_string(),
            max_depth: 2,
        }
    );
}

#[test]
fn test_blank_path_is_null_descriptor() {
    assert!(matches!(
        PropertyPath::resolve(&PERSON, "  "),
        Err(QueryError::NullDescriptor { .. })
    ));
}
