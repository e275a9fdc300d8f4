//! Queryable source abstraction
//!
//! The seam between the chains and whatever evaluates them. Chains only ever
//! call these traits; `MemorySource` is the in-process implementation.

pub mod memory;

pub use memory::{MemorySource, OrderedMemorySource};

use crate::descriptor::SortDirection;
use crate::errors::Result;
use crate::expr::{KeySelector, Predicate};

/// A source of `E` that can be filtered and ordered
pub trait Queryable<E>: Sized {
    type Ordered: OrderedQueryable<E>;

    /// # Errors
    ///
    /// Implementations report predicate evaluation failures.
    fn filter(self, predicate: &Predicate<E>) -> Result<Self>;

    /// Start a new ordering, discarding any previous one
    ///
    /// # Errors
    ///
    /// Implementations report key evaluation failures.
    fn order_by(self, key: &KeySelector<E>, direction: SortDirection) -> Result<Self::Ordered>;
}

/// An ordered source that accepts further tie-breaking keys
pub trait OrderedQueryable<E>: Sized {
    /// Order ties of all previous keys by `key`
    ///
    /// # Errors
    ///
    /// Implementations report key evaluation failures.
    fn then_by(self, key: &KeySelector<E>, direction: SortDirection) -> Result<Self>;
}

/// Skip/take windowing
pub trait Paginate: Sized {
    fn skip(self, count: usize) -> Self;
    fn take(self, count: usize) -> Self;
}
