//! Reference evaluator
//!
//! Interprets expression trees directly against `Reflect` entities, the way
//! an in-memory queryable would. Null handling follows lifted semantics:
//!
//! - member access through an absent object yields null
//! - `null == null` is true, `null == v` is false
//! - ordering comparisons involving null are false
//! - text search on a null target or argument is false
//! - a null boolean operand counts as false

use std::cmp::Ordering;

use super::ast::{CompareOp, Expr, LogicalOp, ParameterId, TextComparison, TextMethod};
use super::lambda::Lambda;
use crate::errors::{QueryError, Result};
use crate::model::{PropertyValue, Reflect, Value};

enum Operand<'a> {
    Value(Value),
    Object(&'a dyn Reflect),
}

struct Interpreter<'a> {
    parameter: ParameterId,
    entity: &'a dyn Reflect,
}

impl Lambda {
    /// Evaluate the body with the parameter bound to `entity`
    ///
    /// # Errors
    ///
    /// Returns `Evaluation` if the body yields an entity rather than a value,
    /// or if operand types cannot be compared.
    pub fn evaluate(&self, entity: &dyn Reflect) -> Result<Value> {
        let interpreter = Interpreter {
            parameter: self.parameter().id(),
            entity,
        };
        match interpreter.eval(self.body())? {
            Operand::Value(v) => Ok(v),
            Operand::Object(_) => Err(QueryError::evaluation(
                "lambda body yields an entity, not a value",
            )),
        }
    }

    pub(crate) fn evaluate_predicate(&self, entity: &dyn Reflect) -> Result<bool> {
        let interpreter = Interpreter {
            parameter: self.parameter().id(),
            entity,
        };
        interpreter.boolean(self.body())
    }
}

impl<'a> Interpreter<'a> {
    fn eval(&self, expr: &Expr) -> Result<Operand<'a>> {
        match expr {
            Expr::Parameter(p) => {
                if p.id() == self.parameter {
                    Ok(Operand::Object(self.entity))
                } else {
                    Err(QueryError::UnboundParameter {
                        parameter: p.name().to_string(),
                    })
                }
            }
            Expr::Constant { value, .. } => Ok(Operand::Value(value.clone())),
            Expr::Member { object, property } => match self.eval(object)? {
                Operand::Object(target) => match target.property(property.name) {
                    Some(PropertyValue::Scalar(v)) => Ok(Operand::Value(v)),
                    Some(PropertyValue::Object(Some(nested))) => Ok(Operand::Object(nested)),
                    Some(PropertyValue::Object(None)) => Ok(Operand::Value(Value::Null)),
                    None => Err(QueryError::evaluation(format!(
                        "entity does not expose declared property '{}'",
                        property.name
                    ))),
                },
                Operand::Value(Value::Null) => Ok(Operand::Value(Value::Null)),
                Operand::Value(v) => Err(QueryError::evaluation(format!(
                    "cannot read property '{}' of a {} value",
                    property.name,
                    v.type_name()
                ))),
            },
            Expr::Compare { op, left, right } => {
                let l = self.scalar(left)?;
                let r = self.scalar(right)?;
                compare(*op, &l, &r).map(|b| Operand::Value(Value::Bool(b)))
            }
            Expr::TextCall {
                method,
                target,
                argument,
                comparison,
            } => {
                let t = self.scalar(target)?;
                let a = self.scalar(argument)?;
                let found = text_search(*method, *comparison, &t, &a)?;
                Ok(Operand::Value(Value::Bool(found)))
            }
            Expr::Logical { op, left, right } => {
                let result = match op {
                    LogicalOp::And => {
                        let l = self.boolean(left)?;
                        let r = self.boolean(right)?;
                        l & r
                    }
                    LogicalOp::Or => {
                        let l = self.boolean(left)?;
                        let r = self.boolean(right)?;
                        l | r
                    }
                    LogicalOp::AndAlso => self.boolean(left)? && self.boolean(right)?,
                    LogicalOp::OrElse => self.boolean(left)? || self.boolean(right)?,
                };
                Ok(Operand::Value(Value::Bool(result)))
            }
            Expr::Not(inner) => Ok(Operand::Value(Value::Bool(!self.boolean(inner)?))),
        }
    }

    fn scalar(&self, expr: &Expr) -> Result<Value> {
        match self.eval(expr)? {
            Operand::Value(v) => Ok(v),
            Operand::Object(_) => Err(QueryError::evaluation(format!(
                "expected a value but '{}' is an entity",
                expr
            ))),
        }
    }

    fn boolean(&self, expr: &Expr) -> Result<bool> {
        match self.scalar(expr)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            other => Err(QueryError::evaluation(format!(
                "expected a boolean, found {}",
                other.type_name()
            ))),
        }
    }
}

fn compare(op: CompareOp, l: &Value, r: &Value) -> Result<bool> {
    if l.is_null() || r.is_null() {
        let both = l.is_null() && r.is_null();
        return Ok(match op {
            CompareOp::Eq => both,
            CompareOp::Ne => !both,
            _ => false,
        });
    }

    let ordering = match l.compare(r) {
        Some(ordering) => Some(ordering),
        // Comparable kinds only fail to order on NaN
        None if l.kind() == r.kind() || (is_numeric(l) && is_numeric(r)) => None,
        None => {
            return Err(QueryError::evaluation(format!(
                "cannot compare {} with {}",
                l.type_name(),
                r.type_name()
            )))
        }
    };

    Ok(match op {
        CompareOp::Eq => ordering == Some(Ordering::Equal),
        CompareOp::Ne => ordering != Some(Ordering::Equal),
        CompareOp::Gt => ordering == Some(Ordering::Greater),
        CompareOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        CompareOp::Lt => ordering == Some(Ordering::Less),
        CompareOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
    })
}

fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Int32(_) | Value::Int64(_) | Value::Float64(_))
}

fn text_search(
    method: TextMethod,
    comparison: TextComparison,
    target: &Value,
    argument: &Value,
) -> Result<bool> {
    let (t, a) = match (target, argument) {
        (Value::Null, _) | (_, Value::Null) => return Ok(false),
        (Value::Text(t), Value::Text(a)) => (t, a),
        _ => {
            return Err(QueryError::evaluation(format!(
                "{} requires text operands, found {} and {}",
                method.name(),
                target.type_name(),
                argument.type_name()
            )))
        }
    };

    let (t, a) = match comparison {
        TextComparison::Ordinal => (t.clone(), a.clone()),
        TextComparison::OrdinalIgnoreCase => (t.to_lowercase(), a.to_lowercase()),
    };

    Ok(match method {
        TextMethod::Contains => t.contains(a.as_str()),
        TextMethod::StartsWith => t.starts_with(a.as_str()),
        TextMethod::EndsWith => t.ends_with(a.as_str()),
    })
}
