//! Human-readable rendering, e.g. `x => ((x.Age > 18) && x.Name.StartsWith("A"))`

use std::fmt;

use super::ast::{Expr, TextComparison};
use super::lambda::Lambda;

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Parameter(p) => f.write_str(p.name()),
            Expr::Constant { value, .. } => write!(f, "{}", value),
            Expr::Member { object, property } => write!(f, "{}.{}", object, property.name),
            Expr::Compare { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::TextCall {
                method,
                target,
                argument,
                comparison,
            } => match comparison {
                TextComparison::Ordinal => write!(f, "{}.{}({})", target, method.name(), argument),
                TextComparison::OrdinalIgnoreCase => write!(
                    f,
                    "{}.{}({}, OrdinalIgnoreCase)",
                    target,
                    method.name(),
                    argument
                ),
            },
            Expr::Logical { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Not(inner) => write!(f, "!{}", inner),
        }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.parameter().name(), self.body())
    }
}
