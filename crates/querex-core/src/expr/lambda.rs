use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use super::ast::{Expr, Parameter};
use super::rewrite::rebind;
use crate::errors::{QueryError, Result};
use crate::model::{FieldType, Reflect, Value};

/// A single-parameter expression: `parameter => body`
///
/// Every parameter referenced in `body` is `parameter` itself; trees that
/// capture a foreign parameter are rejected at construction.
#[derive(Debug, Clone)]
pub struct Lambda {
    parameter: Parameter,
    body: Expr,
}

impl Lambda {
    /// Build a lambda, checking that `body` is closed over `parameter`
    ///
    /// # Errors
    ///
    /// Returns `UnboundParameter` naming the first foreign parameter found.
    pub fn new(parameter: Parameter, body: Expr) -> Result<Self> {
        if let Some(foreign) = body
            .parameters()
            .into_iter()
            .find(|p| p.id() != parameter.id())
        {
            return Err(QueryError::UnboundParameter {
                parameter: foreign.name().to_string(),
            });
        }
        Ok(Self { parameter, body })
    }

    // Callers guarantee closure: bodies built from, or rebound to, `parameter`.
    pub(crate) fn from_parts(parameter: Parameter, body: Expr) -> Self {
        Self { parameter, body }
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    pub fn result_type(&self) -> FieldType {
        self.body.result_type()
    }

    pub fn into_parts(self) -> (Parameter, Expr) {
        (self.parameter, self.body)
    }
}

// Structural equality up to renaming of the bound parameter.
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        self.parameter.type_info() == other.parameter.type_info()
            && self.body == rebind(&other.body, &other.parameter, &self.parameter)
    }
}

impl Eq for Lambda {}

impl Hash for Lambda {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parameter.hash(state);
        self.body.hash(state);
    }
}

/// Typed boolean expression over one `E`
pub struct Predicate<E> {
    lambda: Arc<Lambda>,
    _entity: PhantomData<fn(&E) -> bool>,
}

impl<E: Reflect> Predicate<E> {
    /// Wrap a lambda as a predicate over `E`
    ///
    /// # Errors
    ///
    /// - `KeyTypeMismatch` if the lambda's parameter is not an `E`
    /// - `NotBoolean` if the body does not produce a boolean
    pub fn new(lambda: Lambda) -> Result<Self> {
        check_parameter_type::<E>(&lambda)?;
        let result = lambda.result_type();
        if !result.is_boolean() {
            return Err(QueryError::NotBoolean {
                found: result.to_string(),
            });
        }
        Ok(Self::from_lambda(lambda))
    }

    /// Evaluate against one entity with the reference evaluator
    ///
    /// # Errors
    ///
    /// Returns `Evaluation` for operands the evaluator cannot compare.
    pub fn evaluate(&self, entity: &E) -> Result<bool> {
        self.lambda.evaluate_predicate(entity)
    }
}

impl<E> Predicate<E> {
    pub(crate) fn from_lambda(lambda: Lambda) -> Self {
        Self {
            lambda: Arc::new(lambda),
            _entity: PhantomData,
        }
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    pub fn parameter(&self) -> &Parameter {
        self.lambda.parameter()
    }

    pub fn body(&self) -> &Expr {
        self.lambda.body()
    }
}

/// Typed key projection over one `E`, used for ordering
pub struct KeySelector<E> {
    lambda: Arc<Lambda>,
    _entity: PhantomData<fn(&E)>,
}

impl<E: Reflect> KeySelector<E> {
    /// Wrap a lambda as a sort key over `E`
    ///
    /// # Errors
    ///
    /// - `KeyTypeMismatch` if the lambda's parameter is not an `E`
    /// - `UnsupportedOperatorForType` if the body yields an entity
    pub fn new(lambda: Lambda) -> Result<Self> {
        check_parameter_type::<E>(&lambda)?;
        let key_type = lambda.result_type();
        if !key_type.is_sortable() {
            return Err(QueryError::UnsupportedOperatorForType {
                operator: "OrderBy".to_string(),
                field_type: key_type.to_string(),
                path: lambda.to_string(),
            });
        }
        Ok(Self::from_lambda(lambda))
    }

    /// # Errors
    ///
    /// Returns `Evaluation` if the key cannot be read from `entity`.
    pub fn evaluate(&self, entity: &E) -> Result<Value> {
        self.lambda.evaluate(entity)
    }
}

impl<E> KeySelector<E> {
    pub(crate) fn from_lambda(lambda: Lambda) -> Self {
        Self {
            lambda: Arc::new(lambda),
            _entity: PhantomData,
        }
    }

    pub fn lambda(&self) -> &Lambda {
        &self.lambda
    }

    pub fn key_type(&self) -> FieldType {
        self.lambda.result_type()
    }
}

fn check_parameter_type<E: Reflect>(lambda: &Lambda) -> Result<()> {
    let expected = E::type_info();
    let actual = lambda.parameter().type_info();
    if expected != actual {
        return Err(QueryError::KeyTypeMismatch {
            path: lambda.to_string(),
            expected: expected.name.to_string(),
            actual: actual.name.to_string(),
        });
    }
    Ok(())
}

macro_rules! impl_lambda_wrapper {
    ($name:ident) => {
        impl<E> Clone for $name<E> {
            fn clone(&self) -> Self {
                Self {
                    lambda: Arc::clone(&self.lambda),
                    _entity: PhantomData,
                }
            }
        }

        impl<E> PartialEq for $name<E> {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.lambda, &other.lambda) || self.lambda == other.lambda
            }
        }

        impl<E> Eq for $name<E> {}

        impl<E> Hash for $name<E> {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.lambda.hash(state);
            }
        }

        impl<E> fmt::Display for $name<E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&*self.lambda, f)
            }
        }

        impl<E> fmt::Debug for $name<E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.lambda)
            }
        }
    };
}

impl_lambda_wrapper!(Predicate);
impl_lambda_wrapper!(KeySelector);
