//! Specification algebra
//!
//! Predicates wrapped as composable values. Composites keep their children
//! until `satisfy` merges them into one predicate, unifying the children's
//! bound parameters with `rebind` so the merged tree has exactly one.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not};

use crate::errors::Result;
use crate::expr::{rebind, Expr, Lambda, LogicalOp, Predicate};
use crate::model::Reflect;

pub enum Specification<E> {
    Leaf(Predicate<E>),
    And(Box<Specification<E>>, Box<Specification<E>>),
    Or(Box<Specification<E>>, Box<Specification<E>>),
    /// Short-circuit AND: the right side is only evaluated when the left holds
    AndAlso(Box<Specification<E>>, Box<Specification<E>>),
    /// Short-circuit OR: the right side is only evaluated when the left fails
    OrElse(Box<Specification<E>>, Box<Specification<E>>),
    Not(Box<Specification<E>>),
}

impl<E> Specification<E> {
    pub fn leaf(predicate: Predicate<E>) -> Self {
        Self::Leaf(predicate)
    }

    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn and_also(self, other: Self) -> Self {
        Self::AndAlso(Box::new(self), Box::new(other))
    }

    pub fn or_else(self, other: Self) -> Self {
        Self::OrElse(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// AND of every specification; `None` when empty
    pub fn all(specs: impl IntoIterator<Item = Self>) -> Option<Self> {
        specs.into_iter().reduce(Self::and)
    }

    /// OR of every specification; `None` when empty
    pub fn any(specs: impl IntoIterator<Item = Self>) -> Option<Self> {
        specs.into_iter().reduce(Self::or)
    }

    /// Merge the whole tree into one single-parameter predicate
    ///
    /// The right operand of every binary node is rebound onto the left
    /// operand's parameter, so the result never nests one lambda inside
    /// another.
    pub fn satisfy(&self) -> Predicate<E> {
        match self {
            Self::Leaf(predicate) => predicate.clone(),
            Self::Not(inner) => {
                let inner = inner.satisfy();
                let parameter = inner.parameter().clone();
                let body = Expr::negate(inner.body().clone());
                Predicate::from_lambda(Lambda::from_parts(parameter, body))
            }
            Self::And(l, r) => merge(LogicalOp::And, l, r),
            Self::Or(l, r) => merge(LogicalOp::Or, l, r),
            Self::AndAlso(l, r) => merge(LogicalOp::AndAlso, l, r),
            Self::OrElse(l, r) => merge(LogicalOp::OrElse, l, r),
        }
    }

    /// Number of leaf predicates
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Not(inner) => inner.leaf_count(),
            Self::And(l, r) | Self::Or(l, r) | Self::AndAlso(l, r) | Self::OrElse(l, r) => {
                l.leaf_count() + r.leaf_count()
            }
        }
    }
}

impl<E: Reflect> Specification<E> {
    /// Evaluate the merged predicate against one entity
    ///
    /// # Errors
    ///
    /// Propagates evaluation errors from the reference evaluator.
    pub fn is_satisfied_by(&self, entity: &E) -> Result<bool> {
        self.satisfy().evaluate(entity)
    }
}

fn merge<E>(op: LogicalOp, left: &Specification<E>, right: &Specification<E>) -> Predicate<E> {
    let left = left.satisfy();
    let right = right.satisfy();
    let parameter = left.parameter().clone();
    let right_body = rebind(right.body(), right.parameter(), &parameter);
    let body = Expr::logical(op, left.body().clone(), right_body);
    Predicate::from_lambda(Lambda::from_parts(parameter, body))
}

impl<E> From<Predicate<E>> for Specification<E> {
    fn from(predicate: Predicate<E>) -> Self {
        Self::Leaf(predicate)
    }
}

impl<E> BitAnd for Specification<E> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<E> BitOr for Specification<E> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<E> Not for Specification<E> {
    type Output = Self;

    fn not(self) -> Self::Output {
        Specification::not(self)
    }
}

impl<E> Clone for Specification<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(p) => Self::Leaf(p.clone()),
            Self::And(l, r) => Self::And(l.clone(), r.clone()),
            Self::Or(l, r) => Self::Or(l.clone(), r.clone()),
            Self::AndAlso(l, r) => Self::AndAlso(l.clone(), r.clone()),
            Self::OrElse(l, r) => Self::OrElse(l.clone(), r.clone()),
            Self::Not(inner) => Self::Not(inner.clone()),
        }
    }
}

impl<E> PartialEq for Specification<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a == b,
            (Self::Not(a), Self::Not(b)) => a == b,
            (Self::And(al, ar), Self::And(bl, br))
            | (Self::Or(al, ar), Self::Or(bl, br))
            | (Self::AndAlso(al, ar), Self::AndAlso(bl, br))
            | (Self::OrElse(al, ar), Self::OrElse(bl, br)) => al == bl && ar == br,
            _ => false,
        }
    }
}

impl<E> Eq for Specification<E> {}

impl<E> Hash for Specification<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Leaf(p) => p.hash(state),
            Self::Not(inner) => inner.hash(state),
            Self::And(l, r) | Self::Or(l, r) | Self::AndAlso(l, r) | Self::OrElse(l, r) => {
                l.hash(state);
                r.hash(state);
            }
        }
    }
}

impl<E> fmt::Display for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.satisfy(), f)
    }
}

impl<E> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Specification({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{CompareOp, Parameter};
    use crate::model::{FieldType, PropertyInfo, PropertyValue, TypeInfo, TypeKind, Value};

    struct Reading {
        level: i32,
    }

    static READING: TypeInfo = TypeInfo::new(
        "Reading",
        &[PropertyInfo::new("Level", FieldType::required(TypeKind::Int32))],
    );

    impl Reflect for Reading {
        fn type_info() -> &'static TypeInfo {
            &READING
        }

        fn property(&self, name: &str) -> Option<PropertyValue<'_>> {
            (name == "Level").then(|| PropertyValue::Scalar(Value::Int32(self.level)))
        }
    }

    // Each call binds a fresh parameter, as independently built predicates do.
    fn level(name: &str, op: CompareOp, n: i32) -> Specification<Reading> {
        let p = Parameter::new(name, &READING);
        let body = Expr::compare(
            op,
            Expr::member(Expr::parameter(&p), &READING.properties[0]),
            Expr::constant(Value::Int32(n), FieldType::required(TypeKind::Int32)),
        );
        Specification::leaf(Predicate::new(Lambda::new(p, body).unwrap()).unwrap())
    }

    #[test]
    fn test_and_unifies_parameters() {
        let spec = level("a", CompareOp::Gt, 1) & level("b", CompareOp::Lt, 5);
        let merged = spec.satisfy();

        assert_eq!(merged.body().parameters(), vec![merged.parameter().clone()]);
        assert_eq!(merged.to_string(), "a => ((a.Level > 1) & (a.Level < 5))");
        assert!(spec.is_satisfied_by(&Reading { level: 3 }).unwrap());
        assert!(!spec.is_satisfied_by(&Reading { level: 5 }).unwrap());
    }

    #[test]
    fn test_not_reuses_parameter() {
        let spec = !level("a", CompareOp::Eq, 0);
        assert_eq!(spec.to_string(), "a => !(a.Level == 0)");
        assert!(spec.is_satisfied_by(&Reading { level: 2 }).unwrap());
    }

    #[test]
    fn test_short_circuit_variants_render_distinctly() {
        let also = level("a", CompareOp::Gt, 1).and_also(level("b", CompareOp::Gt, 2));
        let orelse = level("a", CompareOp::Gt, 1).or_else(level("b", CompareOp::Gt, 2));
        assert!(also.to_string().contains("&&"));
        assert!(orelse.to_string().contains("||"));
        assert!(orelse.is_satisfied_by(&Reading { level: 2 }).unwrap());
        assert!(!also.is_satisfied_by(&Reading { level: 2 }).unwrap());
    }

    #[test]
    fn test_all_and_any() {
        assert!(Specification::<Reading>::all(Vec::new()).is_none());

        let any = Specification::any(vec![
            level("a", CompareOp::Eq, 1),
            level("b", CompareOp::Eq, 2),
            level("c", CompareOp::Eq, 3),
        ])
        .unwrap();
        assert_eq!(any.leaf_count(), 3);
        assert!(any.is_satisfied_by(&Reading { level: 3 }).unwrap());
        assert!(!any.is_satisfied_by(&Reading { level: 4 }).unwrap());
    }

    #[test]
    fn test_structural_equality_ignores_parameter_names() {
        let a = level("a", CompareOp::Gt, 1) | level("b", CompareOp::Lt, 0);
        let b = level("x", CompareOp::Gt, 1) | level("y", CompareOp::Lt, 0);
        assert_eq!(a, b);
        assert_ne!(a, level("x", CompareOp::Gt, 1) & level("y", CompareOp::Lt, 0));
    }
}
