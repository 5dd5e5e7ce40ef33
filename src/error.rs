//! Error types for the inversion-of-control container.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Shared, clonable error source carried by failure variants.
pub type ErrorSource = Arc<dyn StdError + Send + Sync>;

/// Boxed error returned by user-supplied constructors and methods.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Container errors
///
/// Represents the various error conditions that can occur while listing,
/// constructing, initializing, wrapping or invoking beans.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, DiError, RegistryBuilder};
///
/// let registry = RegistryBuilder::new().build().unwrap();
/// let container = Container::new(registry);
///
/// match container.get_bean("repoBean") {
///     Err(DiError::NotFound(name)) => assert_eq!(name, "repoBean"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_ioc::DiError;
///
/// let duplicate = DiError::DuplicateDefinition("repoBean".to_string());
/// let invalid = DiError::InvalidDefinition {
///     bean: "repoBean".to_string(),
///     reason: "found 2 constructors, expected exactly 1".to_string(),
/// };
///
/// println!("Error: {}", duplicate);
/// println!("Error: {}", invalid);
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// Bean name has no registered definition
    #[error("Bean not found: {0}")]
    NotFound(String),

    /// Registry declares the same bean name more than once
    #[error("Duplicate bean definition: {0}")]
    DuplicateDefinition(String),

    /// Constructible type is unusable (constructor count, missing proxy views, empty name)
    #[error("Invalid definition for bean '{bean}': {reason}")]
    InvalidDefinition { bean: String, reason: String },

    /// The `init` hook failed
    #[error("Initialization of bean '{bean}' failed in '{hook}': {source}")]
    InitializationFailure {
        bean: String,
        hook: &'static str,
        #[source]
        source: ErrorSource,
    },

    /// The constructor itself failed
    #[error("Construction of bean '{bean}' failed: {source}")]
    ConstructionFailure {
        bean: String,
        #[source]
        source: ErrorSource,
    },

    /// Dependency resolution exhausted the recursion budget
    #[error("Resolution of bean '{bean}' exceeded max depth {depth} (path: {})", display_path(.path))]
    UnboundedRecursion {
        bean: String,
        depth: usize,
        path: Vec<String>,
    },

    /// Instance could not be viewed as the requested type or capability
    #[error("Bean '{bean}' cannot be viewed as {requested}")]
    TypeMismatch { bean: String, requested: &'static str },

    /// Reflective call named a method the runtime type does not declare
    #[error("Bean '{bean}' has no method '{method}'")]
    MethodNotFound { bean: String, method: String },

    /// Reflective call supplied the wrong number of arguments
    #[error("Method '{method}' of bean '{bean}' takes {expected} argument(s), got {actual}")]
    ArityMismatch {
        bean: String,
        method: String,
        expected: usize,
        actual: usize,
    },

    /// A reflectively invoked method failed
    #[error("Method '{method}' of bean '{bean}' failed: {source}")]
    InvocationFailure {
        bean: String,
        method: String,
        #[source]
        source: ErrorSource,
    },

    /// Container options could not be read
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl DiError {
    /// Short, stable label for the error kind.
    ///
    /// ```rust
    /// use ferrous_ioc::DiError;
    ///
    /// assert_eq!(DiError::NotFound("x".into()).kind(), "NotFound");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            DiError::NotFound(_) => "NotFound",
            DiError::DuplicateDefinition(_) => "DuplicateDefinition",
            DiError::InvalidDefinition { .. } => "InvalidDefinition",
            DiError::InitializationFailure { .. } => "InitializationFailure",
            DiError::ConstructionFailure { .. } => "ConstructionFailure",
            DiError::UnboundedRecursion { .. } => "UnboundedRecursion",
            DiError::TypeMismatch { .. } => "TypeMismatch",
            DiError::MethodNotFound { .. } => "MethodNotFound",
            DiError::ArityMismatch { .. } => "ArityMismatch",
            DiError::InvocationFailure { .. } => "InvocationFailure",
            DiError::InvalidConfiguration(_) => "InvalidConfiguration",
        }
    }

    /// The bean name this error is about, if any.
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            DiError::NotFound(name) | DiError::DuplicateDefinition(name) => Some(name),
            DiError::InvalidDefinition { bean, .. }
            | DiError::InitializationFailure { bean, .. }
            | DiError::ConstructionFailure { bean, .. }
            | DiError::UnboundedRecursion { bean, .. }
            | DiError::TypeMismatch { bean, .. }
            | DiError::MethodNotFound { bean, .. }
            | DiError::ArityMismatch { bean, .. }
            | DiError::InvocationFailure { bean, .. } => Some(bean),
            DiError::InvalidConfiguration(_) => None,
        }
    }
}

// Long cycles are reported by their tail; the head repeats the same names.
const PATH_DISPLAY_LIMIT: usize = 8;

fn display_path(path: &[String]) -> String {
    if path.len() <= PATH_DISPLAY_LIMIT {
        return path.join(" -> ");
    }
    let tail = &path[path.len() - PATH_DISPLAY_LIMIT..];
    format!("... -> {}", tail.join(" -> "))
}

/// Result type for container operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout ferrous-ioc.
pub type DiResult<T> = Result<T, DiError>;

/// Error built from a panic payload or a plain message.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MessageError(pub String);

impl MessageError {
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        if let Some(msg) = payload.downcast_ref::<&'static str>() {
            MessageError(format!("panicked: {}", msg))
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            MessageError(format!("panicked: {}", msg))
        } else {
            MessageError("panicked with a non-string payload".to_string())
        }
    }
}
