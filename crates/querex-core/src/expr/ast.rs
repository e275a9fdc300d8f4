//! Expression tree
//!
//! An explicit tagged-variant AST for predicates and key projections over a
//! single bound entity parameter. Trees are immutable once built; rewriting
//! always produces a new tree.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{FieldType, PropertyInfo, TypeInfo, Value};

static NEXT_PARAMETER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a bound parameter
///
/// Two parameters with the same name and type are still different
/// parameters unless they share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(u64);

impl ParameterId {
    fn fresh() -> Self {
        Self(NEXT_PARAMETER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A lambda parameter standing for one entity
#[derive(Debug, Clone)]
pub struct Parameter {
    id: ParameterId,
    name: String,
    type_info: &'static TypeInfo,
}

impl Parameter {
    /// Create a parameter with a fresh identity
    pub fn new(name: impl Into<String>, type_info: &'static TypeInfo) -> Self {
        Self {
            id: ParameterId::fresh(),
            name: name.into(),
            type_info,
        }
    }

    pub fn id(&self) -> ParameterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_info(&self) -> &'static TypeInfo {
        self.type_info
    }

    pub fn field_type(&self) -> FieldType {
        FieldType::object(self.type_info)
    }
}

impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Parameter {}

// Hashes only the entity type so that alpha-equivalent lambdas hash alike.
impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_info.name.hash(state);
    }
}

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// String search methods called on a text member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextMethod {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextMethod {
    pub fn name(&self) -> &'static str {
        match self {
            TextMethod::Contains => "Contains",
            TextMethod::StartsWith => "StartsWith",
            TextMethod::EndsWith => "EndsWith",
        }
    }
}

/// String comparison mode used by text search calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextComparison {
    #[default]
    Ordinal,
    OrdinalIgnoreCase,
}

/// Boolean combinators
///
/// `And`/`Or` evaluate both operands; `AndAlso`/`OrElse` short-circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
    AndAlso,
    OrElse,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&",
            LogicalOp::Or => "|",
            LogicalOp::AndAlso => "&&",
            LogicalOp::OrElse => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Parameter(Parameter),
    Constant {
        value: Value,
        field_type: FieldType,
    },
    Member {
        object: Box<Expr>,
        property: &'static PropertyInfo,
    },
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    TextCall {
        method: TextMethod,
        target: Box<Expr>,
        argument: Box<Expr>,
        comparison: TextComparison,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
}

impl Expr {
    pub fn parameter(parameter: &Parameter) -> Self {
        Expr::Parameter(parameter.clone())
    }

    pub fn constant(value: Value, field_type: FieldType) -> Self {
        Expr::Constant { value, field_type }
    }

    pub fn member(object: Expr, property: &'static PropertyInfo) -> Self {
        Expr::Member {
            object: Box::new(object),
            property,
        }
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn text_call(
        method: TextMethod,
        target: Expr,
        argument: Expr,
        comparison: TextComparison,
    ) -> Self {
        Expr::TextCall {
            method,
            target: Box::new(target),
            argument: Box::new(argument),
            comparison,
        }
    }

    pub fn logical(op: LogicalOp, left: Expr, right: Expr) -> Self {
        Expr::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Static result type of the node
    pub fn result_type(&self) -> FieldType {
        match self {
            Expr::Parameter(p) => p.field_type(),
            Expr::Constant { field_type, .. } => *field_type,
            Expr::Member { property, .. } => property.field_type,
            Expr::Compare { .. } | Expr::TextCall { .. } | Expr::Logical { .. } | Expr::Not(_) => {
                FieldType::BOOL
            }
        }
    }

    /// Direct children, left to right
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Parameter(_) | Expr::Constant { .. } => Vec::new(),
            Expr::Member { object, .. } => vec![object.as_ref()],
            Expr::Compare { left, right, .. } | Expr::Logical { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            Expr::TextCall {
                target, argument, ..
            } => vec![target.as_ref(), argument.as_ref()],
            Expr::Not(inner) => vec![inner.as_ref()],
        }
    }
}
