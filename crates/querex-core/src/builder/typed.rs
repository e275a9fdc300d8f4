//! The statically generic expression builder

use std::fmt;
use std::marker::PhantomData;

use super::key_type::KeyType;
use crate::descriptor::OperatorKind;
use crate::errors::{QueryError, Result};
use crate::expr::{
    CompareOp, Expr, KeySelector, Lambda, Parameter, Predicate, TextComparison, TextMethod,
};
use crate::model::{FieldType, Reflect, Value};
use crate::path::PropertyPath;

/// Name given to the bound parameter of built expressions
pub const PARAMETER_NAME: &str = "x";

/// Builds predicates and keys over `E` for a path whose leaf has type `K`
pub struct ExpressionBuilder<E, K> {
    text_comparison: TextComparison,
    _types: PhantomData<fn(&E) -> K>,
}

impl<E: Reflect, K: KeyType> ExpressionBuilder<E, K> {
    pub fn new(text_comparison: TextComparison) -> Self {
        Self {
            text_comparison,
            _types: PhantomData,
        }
    }

    pub fn text_comparison(&self) -> TextComparison {
        self.text_comparison
    }

    /// `x.Seg1.Seg2...` rooted at `parameter`
    ///
    /// # Errors
    ///
    /// `KeyTypeMismatch` if the path is not rooted at `E` or its leaf is not a `K`.
    pub fn member_access(&self, path: &PropertyPath, parameter: &Parameter) -> Result<Expr> {
        check_path::<E, K>(path)?;
        Ok(path
            .segments()
            .iter()
            .fold(Expr::parameter(parameter), |object, property| {
                Expr::member(object, property)
            }))
    }

    /// `x => x.Path <op> value`
    ///
    /// # Errors
    ///
    /// - `KeyTypeMismatch` if the path does not fit `E` and `K`
    /// - `UnsupportedOperatorForType` if `op` is not defined on `K`
    /// - `NullDescriptor` for a string search with a null argument
    pub fn build_predicate(
        &self,
        path: &PropertyPath,
        op: OperatorKind,
        value: K,
    ) -> Result<Predicate<E>> {
        let value = value.into_value();
        check_operator(path, op, &value)?;

        let parameter = Parameter::new(PARAMETER_NAME, E::type_info());
        let member = self.member_access(path, &parameter)?;
        let constant = Expr::constant(value, K::field_type());

        let body = match op {
            OperatorKind::Equal => Expr::compare(CompareOp::Eq, member, constant),
            OperatorKind::NotEqual => Expr::compare(CompareOp::Ne, member, constant),
            OperatorKind::GreaterThan => Expr::compare(CompareOp::Gt, member, constant),
            OperatorKind::GreaterThanOrEqual => Expr::compare(CompareOp::Gte, member, constant),
            OperatorKind::LessThan => Expr::compare(CompareOp::Lt, member, constant),
            OperatorKind::LessThanOrEqual => Expr::compare(CompareOp::Lte, member, constant),
            OperatorKind::Contains => self.text_call(TextMethod::Contains, member, constant),
            OperatorKind::StartsWith => self.text_call(TextMethod::StartsWith, member, constant),
            OperatorKind::EndsWith => self.text_call(TextMethod::EndsWith, member, constant),
        };

        Ok(Predicate::from_lambda(Lambda::from_parts(parameter, body)))
    }

    /// `x => x.Path`
    ///
    /// # Errors
    ///
    /// `KeyTypeMismatch` if the path does not fit `E` and `K`.
    pub fn build_key(&self, path: &PropertyPath) -> Result<TypedKey<E, K>> {
        let parameter = Parameter::new(PARAMETER_NAME, E::type_info());
        let member = self.member_access(path, &parameter)?;
        Ok(TypedKey {
            selector: KeySelector::from_lambda(Lambda::from_parts(parameter, member)),
            _key: PhantomData,
        })
    }

    fn text_call(&self, method: TextMethod, target: Expr, argument: Expr) -> Expr {
        Expr::text_call(method, target, argument, self.text_comparison)
    }
}

impl<E, K> Clone for ExpressionBuilder<E, K> {
    fn clone(&self) -> Self {
        Self {
            text_comparison: self.text_comparison,
            _types: PhantomData,
        }
    }
}

impl<E: Reflect, K: KeyType> Default for ExpressionBuilder<E, K> {
    fn default() -> Self {
        Self::new(TextComparison::default())
    }
}

impl<E, K: KeyType> fmt::Debug for ExpressionBuilder<E, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionBuilder")
            .field("key_type", &K::field_type())
            .field("text_comparison", &self.text_comparison)
            .finish()
    }
}

/// A key selector that still knows its key type
pub struct TypedKey<E, K> {
    selector: KeySelector<E>,
    _key: PhantomData<fn() -> K>,
}

impl<E: Reflect, K: KeyType> TypedKey<E, K> {
    /// Read the key from one entity
    ///
    /// Returns `None` when the path crosses an absent object and `K` cannot
    /// hold null.
    ///
    /// # Errors
    ///
    /// Returns `Evaluation` if the key value is not a `K`.
    pub fn evaluate(&self, entity: &E) -> Result<Option<K>> {
        let value = self.selector.evaluate(entity)?;
        if value.is_null() && !K::NULLABLE {
            return Ok(None);
        }
        let found = value.type_name();
        K::from_value(value).map(Some).ok_or_else(|| {
            QueryError::evaluation(format!(
                "key {} produced {} instead of {}",
                self.selector,
                found,
                K::field_type()
            ))
        })
    }
}

impl<E, K> TypedKey<E, K> {
    pub fn selector(&self) -> &KeySelector<E> {
        &self.selector
    }

    /// Forget the key type
    pub fn erase(self) -> KeySelector<E> {
        self.selector
    }
}

fn check_path<E: Reflect, K: KeyType>(path: &PropertyPath) -> Result<()> {
    let root = E::type_info();
    if path.root() != root {
        return Err(QueryError::KeyTypeMismatch {
            path: path.text(),
            expected: root.name.to_string(),
            actual: path.root().name.to_string(),
        });
    }
    if path.leaf_type() != K::field_type() {
        return Err(QueryError::KeyTypeMismatch {
            path: path.text(),
            expected: path.leaf_type().to_string(),
            actual: K::field_type().to_string(),
        });
    }
    Ok(())
}

/// Reject operators the leaf type cannot support
///
/// Runs before coercion, so `Age Contains "1"` reports the operator rather
/// than a conversion failure.
pub(crate) fn check_operator(path: &PropertyPath, op: OperatorKind, value: &Value) -> Result<()> {
    let leaf = path.leaf_type();
    let supported = if op.is_text_search() {
        leaf.supports_text_search()
    } else if op.is_ordering() {
        leaf.supports_ordering_comparison()
    } else {
        !leaf.is_object()
    };
    if !supported {
        return Err(unsupported(path, op, leaf));
    }
    if op.is_text_search() && value.is_null() {
        return Err(QueryError::null_descriptor(format!(
            "{} on '{}' requires a value",
            op, path
        )));
    }
    Ok(())
}

fn unsupported(path: &PropertyPath, op: OperatorKind, leaf: FieldType) -> QueryError {
    QueryError::UnsupportedOperatorForType {
        operator: op.to_string(),
        field_type: leaf.to_string(),
        path: path.text(),
    }
}
