//! Error types for routing.

use thiserror::Error;

use crate::pattern::PatternError;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route pattern failed to parse or compile.
    #[error("invalid pattern for {method} {pattern}: {source}")]
    InvalidPattern {
        method: String,
        pattern: String,
        #[source]
        source: PatternError,
    },

    /// A route or fallback chain does not end in a single terminal stage.
    #[error("chain for {target} must be predicates followed by one terminal stage")]
    IncompleteChain { target: String },

    /// Two routes were registered under the same name.
    #[error("duplicate route name: {0}")]
    DuplicateRouteName(String),

    /// A required path parameter is missing.
    #[error("missing path parameter: {0}")]
    MissingParam(String),

    /// An HTTP method name was not recognized.
    #[error("invalid method: {0}")]
    InvalidMethod(String),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
