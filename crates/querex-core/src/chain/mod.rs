//! Immutable filter and sorter chains
//!
//! Each node owns its new predicate or key and shares its base through an
//! `Arc`, so extending a chain never touches the node it extends.

pub mod filter;
pub mod sorter;

pub use filter::FilterChain;
pub use sorter::SorterChain;
