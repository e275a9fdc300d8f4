//! In-memory queryable over a `Vec<E>`
//!
//! Filtering runs eagerly through the reference evaluator. Ordering is
//! deferred: keys accumulate on `OrderedMemorySource` and one stable sort
//! with the composed comparator runs when the items are collected, so later
//! keys only ever break ties left by earlier ones.

use std::cmp::Ordering;

use super::{OrderedQueryable, Paginate, Queryable};
use crate::descriptor::SortDirection;
use crate::errors::Result;
use crate::expr::{KeySelector, Predicate};
use crate::model::{NullOrdering, Reflect, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Window {
    offset: usize,
    limit: Option<usize>,
}

impl Window {
    fn skip(self, count: usize) -> Self {
        Self {
            offset: self.offset.saturating_add(count),
            limit: self.limit.map(|l| l.saturating_sub(count)),
        }
    }

    fn take(self, count: usize) -> Self {
        Self {
            offset: self.offset,
            limit: Some(self.limit.map_or(count, |l| l.min(count))),
        }
    }

    fn apply<T>(self, items: Vec<T>) -> Vec<T> {
        let rest = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => rest.take(limit).collect(),
            None => rest.collect(),
        }
    }
}

/// Unordered in-memory source
pub struct MemorySource<E> {
    items: Vec<E>,
    null_ordering: NullOrdering,
}

impl<E> MemorySource<E> {
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items,
            null_ordering: NullOrdering::default(),
        }
    }

    /// Where null keys land once this source is ordered
    pub fn with_null_ordering(mut self, null_ordering: NullOrdering) -> Self {
        self.null_ordering = null_ordering;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E> From<Vec<E>> for MemorySource<E> {
    fn from(items: Vec<E>) -> Self {
        Self::new(items)
    }
}

impl<E: Reflect> Queryable<E> for MemorySource<E> {
    type Ordered = OrderedMemorySource<E>;

    fn filter(self, predicate: &Predicate<E>) -> Result<Self> {
        let mut kept = Vec::with_capacity(self.items.len());
        for item in self.items {
            if predicate.evaluate(&item)? {
                kept.push(item);
            }
        }
        Ok(Self {
            items: kept,
            null_ordering: self.null_ordering,
        })
    }

    fn order_by(self, key: &KeySelector<E>, direction: SortDirection) -> Result<Self::Ordered> {
        Ok(OrderedMemorySource {
            items: self.items,
            keys: vec![(key.clone(), direction)],
            null_ordering: self.null_ordering,
            window: Window::default(),
        })
    }
}

impl<E> Paginate for MemorySource<E> {
    fn skip(mut self, count: usize) -> Self {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.items.truncate(count);
        self
    }
}

/// Ordered in-memory source with pending sort keys and window
pub struct OrderedMemorySource<E> {
    items: Vec<E>,
    keys: Vec<(KeySelector<E>, SortDirection)>,
    null_ordering: NullOrdering,
    window: Window,
}

impl<E: Reflect> OrderedMemorySource<E> {
    /// Number of ordering keys applied so far
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Sort, then apply skip/take
    ///
    /// # Errors
    ///
    /// Returns the first key evaluation error.
    pub fn into_vec(self) -> Result<Vec<E>> {
        let mut rows = Vec::with_capacity(self.items.len());
        for item in self.items {
            let keys = self
                .keys
                .iter()
                .map(|(selector, _)| selector.evaluate(&item))
                .collect::<Result<Vec<Value>>>()?;
            rows.push((keys, item));
        }

        let directions: Vec<SortDirection> = self.keys.iter().map(|(_, d)| *d).collect();
        let nulls = self.null_ordering;
        rows.sort_by(|(a, _), (b, _)| compose(a, b, &directions, nulls));

        let sorted = rows.into_iter().map(|(_, item)| item).collect();
        Ok(self.window.apply(sorted))
    }
}

impl<E: Reflect> OrderedQueryable<E> for OrderedMemorySource<E> {
    fn then_by(mut self, key: &KeySelector<E>, direction: SortDirection) -> Result<Self> {
        self.keys.push((key.clone(), direction));
        Ok(self)
    }
}

impl<E> Paginate for OrderedMemorySource<E> {
    fn skip(mut self, count: usize) -> Self {
        self.window = self.window.skip(count);
        self
    }

    fn take(mut self, count: usize) -> Self {
        self.window = self.window.take(count);
        self
    }
}

fn compose(a: &[Value], b: &[Value], directions: &[SortDirection], nulls: NullOrdering) -> Ordering {
    a.iter()
        .zip(b)
        .zip(directions)
        .map(|((x, y), direction)| {
            let ordering = x.sort_cmp(y, nulls);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}
