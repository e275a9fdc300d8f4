use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::errors::Result;
use crate::expr::Predicate;
use crate::queryable::Queryable;
use crate::specification::Specification;

/// Accumulated conjunction of predicates
pub enum FilterChain<E> {
    /// No filter: sources pass through unchanged
    Empty,
    Single(Predicate<E>),
    Conjoined {
        base: Arc<FilterChain<E>>,
        predicate: Predicate<E>,
    },
}

impl<E> FilterChain<E> {
    pub fn new() -> Self {
        Self::Empty
    }

    /// Extend with one more predicate, leaving `self` shared as the base
    pub fn and(self, predicate: Predicate<E>) -> Self {
        match self {
            Self::Empty => Self::Single(predicate),
            base => Self::Conjoined {
                base: Arc::new(base),
                predicate,
            },
        }
    }

    /// Filter `source` by the base chain, then by this node's predicate
    ///
    /// # Errors
    ///
    /// Propagates the source's filter errors.
    pub fn apply_to<Q: Queryable<E>>(&self, source: Q) -> Result<Q> {
        self.predicates()
            .into_iter()
            .try_fold(source, |source, predicate| source.filter(predicate))
    }

    /// The whole chain as one predicate; `None` for an empty chain
    ///
    /// Adjacent predicates are paired through `Specification::and` layer by
    /// layer, so the merged tree is balanced and its depth grows with the
    /// logarithm of the chain length. The result binds a single parameter.
    pub fn extract_expression(&self) -> Option<Predicate<E>> {
        let mut layer: Vec<Specification<E>> = self
            .predicates()
            .into_iter()
            .map(|predicate| Specification::leaf(predicate.clone()))
            .collect();
        while layer.len() > 1 {
            let mut paired = Vec::with_capacity(layer.len().div_ceil(2));
            let mut specs = layer.into_iter();
            while let Some(left) = specs.next() {
                paired.push(match specs.next() {
                    Some(right) => left.and(right),
                    None => left,
                });
            }
            layer = paired;
        }
        layer.pop().map(|spec| spec.satisfy())
    }

    /// Number of predicates in the chain
    pub fn len(&self) -> usize {
        self.predicates().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Predicates in application order
    pub fn predicates(&self) -> Vec<&Predicate<E>> {
        let mut all = Vec::new();
        let mut node = self;
        loop {
            match node {
                Self::Empty => break,
                Self::Single(predicate) => {
                    all.push(predicate);
                    break;
                }
                Self::Conjoined { base, predicate } => {
                    all.push(predicate);
                    node = base.as_ref();
                }
            }
        }
        all.reverse();
        all
    }

    pub fn base(&self) -> Option<&FilterChain<E>> {
        match self {
            Self::Conjoined { base, .. } => Some(base.as_ref()),
            _ => None,
        }
    }

    fn take_base(&mut self) -> Option<Arc<FilterChain<E>>> {
        match self {
            Self::Conjoined { base, .. } => Some(std::mem::replace(base, Arc::new(Self::Empty))),
            _ => None,
        }
    }
}

/// Unlinks the base spine one node at a time, stopping at the first node
/// another chain still shares.
impl<E> Drop for FilterChain<E> {
    fn drop(&mut self) {
        let mut next = self.take_base();
        while let Some(base) = next {
            next = match Arc::try_unwrap(base) {
                Ok(mut chain) => chain.take_base(),
                Err(_) => None,
            };
        }
    }
}

impl<E> Default for FilterChain<E> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<E> Clone for FilterChain<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Single(p) => Self::Single(p.clone()),
            Self::Conjoined { base, predicate } => Self::Conjoined {
                base: Arc::clone(base),
                predicate: predicate.clone(),
            },
        }
    }
}

impl<E> PartialEq for FilterChain<E> {
    fn eq(&self, other: &Self) -> bool {
        let (mut left, mut right) = (self, other);
        loop {
            match (left, right) {
                (Self::Empty, Self::Empty) => return true,
                (Self::Single(a), Self::Single(b)) => return a == b,
                (
                    Self::Conjoined {
                        base: ab,
                        predicate: ap,
                    },
                    Self::Conjoined {
                        base: bb,
                        predicate: bp,
                    },
                ) => {
                    if ap != bp {
                        return false;
                    }
                    if Arc::ptr_eq(ab, bb) {
                        return true;
                    }
                    left = ab.as_ref();
                    right = bb.as_ref();
                }
                _ => return false,
            }
        }
    }
}

impl<E> Eq for FilterChain<E> {}

impl<E> Hash for FilterChain<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let predicates = self.predicates();
        predicates.len().hash(state);
        for predicate in predicates {
            predicate.hash(state);
        }
    }
}

impl<E> fmt::Debug for FilterChain<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.predicates()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, Expr, Lambda, Parameter};
    use crate::model::{
        FieldType, PropertyInfo, PropertyValue, Reflect, TypeInfo, TypeKind, Value,
    };
    use crate::queryable::MemorySource;

    #[derive(Debug, PartialEq)]
    struct Pt {
        x: i32,
    }

    static PT: TypeInfo = TypeInfo::new(
        "Pt",
        &[PropertyInfo::new("X", FieldType::required(TypeKind::Int32))],
    );

    impl Reflect for Pt {
        fn type_info() -> &'static TypeInfo {
            &PT
        }

        fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
            (name == "X").then(|| PropertyValue::Scalar(Value::Int32(self.x)))
        }
    }

    fn x(op: CompareOp, n: i32) -> Predicate<Pt> {
        let p = Parameter::new("p", &PT);
        let body = Expr::compare(
            op,
            Expr::member(Expr::parameter(&p), &PT.properties[0]),
            Expr::constant(Value::Int32(n), FieldType::required(TypeKind::Int32)),
        );
        Predicate::new(Lambda::new(p, body).unwrap()).unwrap()
    }

    fn points() -> MemorySource<Pt> {
        MemorySource::new((0..6).map(|x| Pt { x }).collect())
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = FilterChain::<Pt>::new();
        assert!(chain.extract_expression().is_none());
        assert_eq!(chain.apply_to(points()).unwrap().len(), 6);
    }

    #[test]
    fn test_conjoined_applies_every_predicate() {
        let chain = FilterChain::new()
            .and(x(CompareOp::Gt, 1))
            .and(x(CompareOp::Lt, 4));
        assert_eq!(chain.len(), 2);

        let kept = chain.apply_to(points()).unwrap().into_vec();
        assert_eq!(kept, vec![Pt { x: 2 }, Pt { x: 3 }]);
    }

    #[test]
    fn test_extracted_expression_matches_application() {
        let chain = FilterChain::new()
            .and(x(CompareOp::Gte, 2))
            .and(x(CompareOp::Ne, 3))
            .and(x(CompareOp::Lte, 4));
        let merged = chain.extract_expression().unwrap();

        assert_eq!(merged.body().parameters().len(), 1);
        for pt in points().into_vec() {
            let expected = (2..=4).contains(&pt.x) && pt.x != 3;
            assert_eq!(merged.evaluate(&pt).unwrap(), expected, "x = {}", pt.x);
        }
    }

    #[test]
    fn test_conjoined_over_empty_base() {
        let chain = FilterChain::Conjoined {
            base: Arc::new(FilterChain::Empty),
            predicate: x(CompareOp::Eq, 5),
        };
        assert_eq!(chain.extract_expression(), Some(x(CompareOp::Eq, 5)));
    }

    #[test]
    fn test_extending_leaves_base_untouched() {
        let base = FilterChain::new().and(x(CompareOp::Gt, 0));
        let extended = base.clone().and(x(CompareOp::Lt, 3));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.base(), Some(&base));
    }

    fn depth(expr: &Expr) -> usize {
        1 + expr.children().into_iter().map(depth).max().unwrap_or(0)
    }

    #[test]
    fn test_long_chain_merges_into_shallow_tree() {
        let chain = (0..4096).fold(FilterChain::new(), |chain, i| {
            chain.and(x(CompareOp::Gte, i % 3))
        });
        assert_eq!(chain.len(), 4096);

        let merged = chain.extract_expression().unwrap();
        assert!(depth(merged.body()) <= 16, "depth {}", depth(merged.body()));
        assert_eq!(merged.body().parameters().len(), 1);
        for pt in points().into_vec() {
            assert_eq!(merged.evaluate(&pt).unwrap(), pt.x >= 2, "x = {}", pt.x);
        }
        assert_eq!(chain.apply_to(points()).unwrap().len(), 4);
        assert_eq!(chain.clone(), chain);
    }

    #[test]
    fn test_dropping_extension_keeps_shared_base() {
        let base = (0..100).fold(FilterChain::new(), |chain, i| chain.and(x(CompareOp::Ne, i)));
        let extended = base.clone().and(x(CompareOp::Lt, 3));
        drop(extended);
        assert_eq!(base.len(), 100);
        assert_eq!(base.apply_to(points()).unwrap().len(), 0);
    }

    #[test]
    fn test_structural_equality() {
        let a = FilterChain::new().and(x(CompareOp::Gt, 1));
        let b = FilterChain::new().and(x(CompareOp::Gt, 1));
        let c = FilterChain::new().and(x(CompareOp::Gt, 2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
