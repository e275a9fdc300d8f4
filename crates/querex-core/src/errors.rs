use querex_core_types::{RequestContext, RequestId, Sensitive, TraceId};
use thiserror::Error;

use crate::model::Value;

/// Result type alias using QueryError
pub type Result<T> = std::result::Result<T, QueryError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that repository and web layers can
/// match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Descriptor errors (client input)
    UnknownProperty,
    ConversionFailed,
    UnsupportedOperator,
    NullDescriptor,
    PathTooDeep,
    TooManyDescriptors,

    // Expression construction
    TypeMismatch,
    UnboundParameter,
    InvalidExpression,

    // Usage
    EmptyChain,
    Evaluation,
    Config,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnknownProperty => "ERR_UNKNOWN_PROPERTY",
            ExErrorKind::ConversionFailed => "ERR_CONVERSION_FAILED",
            ExErrorKind::UnsupportedOperator => "ERR_UNSUPPORTED_OPERATOR",
            ExErrorKind::NullDescriptor => "ERR_NULL_DESCRIPTOR",
            ExErrorKind::PathTooDeep => "ERR_PATH_TOO_DEEP",
            ExErrorKind::TooManyDescriptors => "ERR_TOO_MANY_DESCRIPTORS",
            ExErrorKind::TypeMismatch => "ERR_TYPE_MISMATCH",
            ExErrorKind::UnboundParameter => "ERR_UNBOUND_PARAMETER",
            ExErrorKind::InvalidExpression => "ERR_INVALID_EXPRESSION",
            ExErrorKind::EmptyChain => "ERR_EMPTY_CHAIN",
            ExErrorKind::Evaluation => "ERR_EVALUATION",
            ExErrorKind::Config => "ERR_CONFIG",
        }
    }

    /// Whether errors of this kind are caused by caller-supplied descriptors
    ///
    /// Web layers map these to "invalid filter" responses; everything else is
    /// a programming or deployment fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::UnknownProperty
                | ExErrorKind::ConversionFailed
                | ExErrorKind::UnsupportedOperator
                | ExErrorKind::NullDescriptor
                | ExErrorKind::PathTooDeep
                | ExErrorKind::TooManyDescriptors
        )
    }
}

/// Canonical structured error type
///
/// Carries a stable classification plus correlation context for the layer
/// that reports the failure to its own caller.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add property path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Attach every identifier carried by a request context
    pub fn with_context(self, ctx: &RequestContext) -> Self {
        let ex = self.with_request_id(ctx.request_id.clone());
        match &ctx.trace_id {
            Some(trace_id) => ex.with_trace_id(trace_id.clone()),
            None => ex,
        }
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_client_error(&self) -> bool {
        self.kind.is_client_error()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for query expression construction and evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    // ===== Descriptor Errors =====
    /// A path segment does not name a property on the type reached so far
    #[error("Unknown property '{segment}' on type {type_name} (path: {path})")]
    UnknownProperty {
        path: String,
        type_name: String,
        segment: String,
    },

    /// A raw value could not be converted to the property's declared type
    #[error("Cannot convert value {value} to {target}: {reason}")]
    ConversionFailed {
        value: Sensitive<Value>,
        target: String,
        reason: String,
    },

    /// The operator needs a capability the property type does not have
    #[error("Operator {operator} is not supported for {field_type} property '{path}'")]
    UnsupportedOperatorForType {
        operator: String,
        field_type: String,
        path: String,
    },

    /// A required descriptor field was absent
    #[error("Missing descriptor input: {reason}")]
    NullDescriptor { reason: String },

    /// Dotted path exceeds the configured depth
    #[error("Property path '{path}' has more than {max_depth} segments")]
    PathTooDeep { path: String, max_depth: usize },

    /// A request carries more filter or sort descriptors than the engine accepts
    #[error("{count} {list} descriptors exceed the limit of {max}")]
    TooManyDescriptors {
        list: &'static str,
        count: usize,
        max: usize,
    },

    // ===== Expression Errors =====
    /// The builder was instantiated for a different entity or key type than the path resolves to
    #[error("Type mismatch for '{path}': expected {expected}, found {actual}")]
    KeyTypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// An expression references a parameter that is not bound by its lambda
    #[error("Parameter '{parameter}' is not bound in this expression")]
    UnboundParameter { parameter: String },

    /// A predicate body does not produce a boolean
    #[error("Predicate body must be boolean, found {found}")]
    NotBoolean { found: String },

    // ===== Usage Errors =====
    /// A sorter chain was applied before any ordering key was added
    #[error("Sorter chain has no ordering keys")]
    EmptyChainInvoked,

    /// The reference evaluator met a tree it cannot evaluate
    #[error("Evaluation failed: {reason}")]
    Evaluation { reason: String },

    /// Engine configuration could not be loaded
    #[error("Invalid engine configuration: {message}")]
    Config { message: String },
}

impl QueryError {
    /// Get the taxonomy kind for this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            QueryError::UnknownProperty { .. } => ExErrorKind::UnknownProperty,
            QueryError::ConversionFailed { .. } => ExErrorKind::ConversionFailed,
            QueryError::UnsupportedOperatorForType { .. } => ExErrorKind::UnsupportedOperator,
            QueryError::NullDescriptor { .. } => ExErrorKind::NullDescriptor,
            QueryError::PathTooDeep { .. } => ExErrorKind::PathTooDeep,
            QueryError::TooManyDescriptors { .. } => ExErrorKind::TooManyDescriptors,
            QueryError::KeyTypeMismatch { .. } => ExErrorKind::TypeMismatch,
            QueryError::UnboundParameter { .. } => ExErrorKind::UnboundParameter,
            QueryError::NotBoolean { .. } => ExErrorKind::InvalidExpression,
            QueryError::EmptyChainInvoked => ExErrorKind::EmptyChain,
            QueryError::Evaluation { .. } => ExErrorKind::Evaluation,
            QueryError::Config { .. } => ExErrorKind::Config,
        }
    }

    /// The property path the error refers to, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            QueryError::UnknownProperty { path, .. }
            | QueryError::UnsupportedOperatorForType { path, .. }
            | QueryError::PathTooDeep { path, .. }
            | QueryError::KeyTypeMismatch { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn evaluation(reason: impl Into<String>) -> Self {
        QueryError::Evaluation {
            reason: reason.into(),
        }
    }

    pub(crate) fn null_descriptor(reason: impl Into<String>) -> Self {
        QueryError::NullDescriptor {
            reason: reason.into(),
        }
    }
}

impl From<QueryError> for ExError {
    fn from(err: QueryError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(path) = err.path() {
            ex = ex.with_path(path);
        }
        ex
    }
}

impl From<toml::de::Error> for QueryError {
    fn from(err: toml::de::Error) -> Self {
        QueryError::Config {
            message: err.message().to_string(),
        }
    }
}
