use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::SortDirection;
use crate::errors::{QueryError, Result};
use crate::expr::KeySelector;
use crate::queryable::{OrderedQueryable, Queryable};

/// Accumulated ordering keys, primary first
pub enum SorterChain<E> {
    /// No keys yet; applying it is an error
    Empty,
    Primary {
        key: KeySelector<E>,
        direction: SortDirection,
    },
    Secondary {
        base: Arc<SorterChain<E>>,
        key: KeySelector<E>,
        direction: SortDirection,
    },
}

impl<E> SorterChain<E> {
    pub fn new() -> Self {
        Self::Empty
    }

    /// Add a key that orders ties left by every existing key
    pub fn then_by(self, key: KeySelector<E>, direction: SortDirection) -> Self {
        match self {
            Self::Empty => Self::Primary { key, direction },
            base => Self::Secondary {
                base: Arc::new(base),
                key,
                direction,
            },
        }
    }

    /// Order `source` by every key in the chain
    ///
    /// # Errors
    ///
    /// - `EmptyChainInvoked` if the chain has no keys
    /// - the source's ordering errors
    pub fn apply_to<Q: Queryable<E>>(&self, source: Q) -> Result<Q::Ordered> {
        match self {
            Self::Empty => Err(QueryError::EmptyChainInvoked),
            Self::Primary { key, direction } => source.order_by(key, *direction),
            Self::Secondary {
                base,
                key,
                direction,
            } => base.apply_to(source)?.then_by(key, *direction),
        }
    }

    /// Keys with their directions, primary first
    pub fn keys(&self) -> Vec<(&KeySelector<E>, SortDirection)> {
        match self {
            Self::Empty => Vec::new(),
            Self::Primary { key, direction } => vec![(key, *direction)],
            Self::Secondary {
                base,
                key,
                direction,
            } => {
                let mut all = base.keys();
                all.push((key, *direction));
                all
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl<E> Default for SorterChain<E> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<E> Clone for SorterChain<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Primary { key, direction } => Self::Primary {
                key: key.clone(),
                direction: *direction,
            },
            Self::Secondary {
                base,
                key,
                direction,
            } => Self::Secondary {
                base: Arc::clone(base),
                key: key.clone(),
                direction: *direction,
            },
        }
    }
}

impl<E> PartialEq for SorterChain<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (
                Self::Primary { key: ak, direction: ad },
                Self::Primary { key: bk, direction: bd },
            ) => ak == bk && ad == bd,
            (
                Self::Secondary {
                    base: ab,
                    key: ak,
                    direction: ad,
                },
                Self::Secondary {
                    base: bb,
                    key: bk,
                    direction: bd,
                },
            ) => ak == bk && ad == bd && (Arc::ptr_eq(ab, bb) || ab == bb),
            _ => false,
        }
    }
}

impl<E> Eq for SorterChain<E> {}

impl<E> Hash for SorterChain<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (key, direction) in self.keys() {
            key.hash(state);
            direction.hash(state);
        }
    }
}

impl<E> fmt::Debug for SorterChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
