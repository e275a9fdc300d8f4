//! querex core: descriptor-driven query expressions
//!
//! Builds typed predicate and ordering expressions over reflected entities
//! from declarative descriptors (a dotted property path plus an operator and
//! raw value, or a path plus a direction), and composes them:
//!
//! - [`path`] resolves dotted paths against an entity's static shape
//! - [`coercion`] converts raw values to the property's declared type
//! - [`builder`] bridges the runtime key type into `ExpressionBuilder<E, K>`
//! - [`chain`] accumulates filters and sort keys as immutable chains
//! - [`specification`] merges predicates with AND / OR / NOT
//! - [`queryable`] is the seam to whatever evaluates the expressions, with
//!   an in-memory implementation
//!
//! # Example
//!
//! ```
//! use querex_core::model::{
//!     FieldType, PropertyInfo, PropertyValue, Reflect, TypeInfo, TypeKind, Value,
//! };
//! use querex_core::{build_filter, FilterDescriptor, MemorySource};
//!
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! static PERSON: TypeInfo = TypeInfo::new(
//!     "Person",
//!     &[
//!         PropertyInfo::new("Name", FieldType::required(TypeKind::Text)),
//!         PropertyInfo::new("Age", FieldType::required(TypeKind::Int32)),
//!     ],
//! );
//!
//! impl Reflect for Person {
//!     fn type_info() -> &'static TypeInfo {
//!         &PERSON
//!     }
//!
//!     fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
//!         match name {
//!             "Name" => Some(PropertyValue::Scalar(Value::from(self.name.as_str()))),
//!             "Age" => Some(PropertyValue::Scalar(Value::Int32(self.age))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let people = vec![
//!     Person { name: "A".into(), age: 17 },
//!     Person { name: "B".into(), age: 20 },
//! ];
//! let chain = build_filter::<Person>(&[FilterDescriptor::gt("Age", "18")]).unwrap();
//! let adults = chain.apply_to(MemorySource::new(people)).unwrap().into_vec();
//! assert_eq!(adults.len(), 1);
//! assert_eq!(adults[0].name, "B");
//! ```

pub mod builder;
pub mod chain;
pub mod coercion;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod expr;
pub mod logging_facility;
pub mod model;
pub mod path;
pub mod query;
pub mod queryable;
pub mod specification;

pub use builder::{builder_for, ErasedBuilder, ExpressionBuilder, KeyType, TypedKey};
pub use chain::{FilterChain, SorterChain};
pub use coercion::coerce;
pub use config::EngineConfig;
pub use descriptor::{FilterDescriptor, OperatorKind, SortDescriptor, SortDirection};
pub use errors::{ExError, ExErrorKind, QueryError, Result};
pub use expr::{Expr, KeySelector, Lambda, Parameter, Predicate};
pub use path::{PathMatching, PathResolver, PropertyPath};
pub use query::{
    build_filter, build_query, build_sorter, Page, PlannedQuery, QueryBuilder, QueryPlan,
    QueryRequest,
};
pub use queryable::{MemorySource, OrderedMemorySource, OrderedQueryable, Paginate, Queryable};
pub use specification::Specification;
