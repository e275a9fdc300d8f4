//! Expression trees, rewriting and evaluation

pub mod ast;
pub mod eval;
pub mod lambda;
pub mod render;
pub mod rewrite;

pub use ast::{
    CompareOp, Expr, LogicalOp, Parameter, ParameterId, TextComparison, TextMethod,
};
pub use lambda::{KeySelector, Lambda, Predicate};
pub use rewrite::{rebind, ExprRewriter, ExprVisitor, ParameterRebinder};
