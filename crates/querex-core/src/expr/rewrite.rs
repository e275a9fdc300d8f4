//! Tree traversal and rewriting
//!
//! `ExprVisitor` walks a tree read-only; `ExprRewriter` produces a new tree,
//! replacing the nodes it chooses and rebuilding the rest around them.
//! `ParameterRebinder` is the rewrite that lets two independently built
//! lambdas share one parameter before their bodies are merged.

use std::collections::BTreeMap;

use super::ast::{Expr, Parameter, ParameterId};

/// Read-only pre-order traversal
pub trait ExprVisitor {
    fn visit(&mut self, expr: &Expr);
}

/// Node replacement during a rewrite
///
/// Returning `Some` replaces the node (its children are not visited);
/// returning `None` keeps the node and rewrites its children.
pub trait ExprRewriter {
    fn rewrite(&mut self, expr: &Expr) -> Option<Expr>;
}

impl Expr {
    /// Visit this node and every descendant, parents first
    pub fn walk<V: ExprVisitor + ?Sized>(&self, visitor: &mut V) {
        visitor.visit(self);
        for child in self.children() {
            child.walk(visitor);
        }
    }

    /// Produce a rewritten copy of this tree
    pub fn rewrite_with<R: ExprRewriter + ?Sized>(&self, rewriter: &mut R) -> Expr {
        if let Some(replacement) = rewriter.rewrite(self) {
            return replacement;
        }

        match self {
            Expr::Parameter(_) | Expr::Constant { .. } => self.clone(),
            Expr::Member { object, property } => {
                Expr::member(object.rewrite_with(rewriter), *property)
            }
            Expr::Compare { op, left, right } => Expr::compare(
                *op,
                left.rewrite_with(rewriter),
                right.rewrite_with(rewriter),
            ),
            Expr::TextCall {
                method,
                target,
                argument,
                comparison,
            } => Expr::text_call(
                *method,
                target.rewrite_with(rewriter),
                argument.rewrite_with(rewriter),
                *comparison,
            ),
            Expr::Logical { op, left, right } => Expr::logical(
                *op,
                left.rewrite_with(rewriter),
                right.rewrite_with(rewriter),
            ),
            Expr::Not(inner) => Expr::negate(inner.rewrite_with(rewriter)),
        }
    }

    /// Distinct parameters referenced anywhere in the tree, by id
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut collector = ParameterCollector::default();
        self.walk(&mut collector);
        collector.found.into_values().collect()
    }
}

#[derive(Default)]
struct ParameterCollector {
    found: BTreeMap<ParameterId, Parameter>,
}

impl ExprVisitor for ParameterCollector {
    fn visit(&mut self, expr: &Expr) {
        if let Expr::Parameter(p) = expr {
            self.found.entry(p.id()).or_insert_with(|| p.clone());
        }
    }
}

/// Replaces every occurrence of one parameter with another
#[derive(Debug)]
pub struct ParameterRebinder<'a> {
    from: ParameterId,
    to: &'a Parameter,
}

impl<'a> ParameterRebinder<'a> {
    pub fn new(from: &Parameter, to: &'a Parameter) -> Self {
        Self {
            from: from.id(),
            to,
        }
    }
}

impl ExprRewriter for ParameterRebinder<'_> {
    fn rewrite(&mut self, expr: &Expr) -> Option<Expr> {
        match expr {
            Expr::Parameter(p) if p.id() == self.from => Some(Expr::Parameter(self.to.clone())),
            _ => None,
        }
    }
}

/// Rewrite `expr` so that every use of `from` refers to `to`
pub fn rebind(expr: &Expr, from: &Parameter, to: &Parameter) -> Expr {
    if from.id() == to.id() {
        return expr.clone();
    }
    expr.rewrite_with(&mut ParameterRebinder::new(from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ast::CompareOp;
    use crate::model::{FieldType, PropertyInfo, TypeInfo, TypeKind, Value};

    static ITEM: TypeInfo = TypeInfo::new(
        "Item",
        &[PropertyInfo::new("Qty", FieldType::required(TypeKind::Int32))],
    );

    fn qty_gt(parameter: &Parameter, n: i32) -> Expr {
        Expr::compare(
            CompareOp::Gt,
            Expr::member(Expr::parameter(parameter), &ITEM.properties[0]),
            Expr::constant(Value::Int32(n), FieldType::required(TypeKind::Int32)),
        )
    }

    #[test]
    fn test_rebind_replaces_only_target_parameter() {
        let a = Parameter::new("x", &ITEM);
        let b = Parameter::new("x", &ITEM);
        let body = qty_gt(&b, 3);

        let rebound = rebind(&body, &b, &a);
        let params = rebound.parameters();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].id(), a.id());
        assert_eq!(rebound, qty_gt(&a, 3));
    }

    #[test]
    fn test_rebind_leaves_foreign_parameters_alone() {
        let a = Parameter::new("a", &ITEM);
        let b = Parameter::new("b", &ITEM);
        let c = Parameter::new("c", &ITEM);
        let body = Expr::logical(
            crate::expr::ast::LogicalOp::And,
            qty_gt(&b, 1),
            qty_gt(&c, 2),
        );

        let rebound = rebind(&body, &b, &a);
        let ids: Vec<_> = rebound.parameters().iter().map(Parameter::id).collect();
        assert!(ids.contains(&a.id()));
        assert!(ids.contains(&c.id()));
        assert!(!ids.contains(&b.id()));
    }

    #[test]
    fn test_walk_visits_every_node() {
        struct Counter(usize);
        impl ExprVisitor for Counter {
            fn visit(&mut self, _expr: &Expr) {
                self.0 += 1;
            }
        }

        let p = Parameter::new("x", &ITEM);
        let mut counter = Counter(0);
        qty_gt(&p, 1).walk(&mut counter);
        // compare, member, parameter, constant
        assert_eq!(counter.0, 4);
    }
}
