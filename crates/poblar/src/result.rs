//! Result and error types for Poblar.

use thiserror::Error;

/// Result type for Poblar operations
pub type PoblarResult<T> = Result<T, PoblarError>;

/// Errors raised while building descriptors or populating page objects.
///
/// Every variant is a non-retryable configuration or data-absence error, not
/// a transient fault. The engine performs no internal recovery: a caller that
/// wants to poll for an element retries the whole
/// [`PageLoader::load`](crate::PageLoader::load) call.
///
/// The enum is `Clone` so a failed descriptor build can be cached once and
/// re-surfaced on every later resolution attempt for that type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoblarError {
    /// Invalid field declaration, caught while the descriptor is built and
    /// before any element lookup occurs
    #[error("invalid binding for field `{field}` on {page}: {message}")]
    Config {
        /// Page type being described
        page: &'static str,
        /// Offending field
        field: &'static str,
        /// What was wrong with the declaration
        message: String,
    },

    /// Page type has no registered zero-argument constructor
    #[error("page {page} has no registered constructor")]
    Construction {
        /// Page type being instantiated
        page: &'static str,
    },

    /// A singleton-cardinality binding resolved to zero elements
    #[error("no element found for field `{field}` on {page}")]
    NotFound {
        /// Page type being populated
        page: &'static str,
        /// Field whose lookup came up empty
        field: &'static str,
    },

    /// A singleton-cardinality binding resolved to more than one element
    #[error("expected exactly one element for field `{field}` on {page}, found {count}")]
    AmbiguousMatch {
        /// Page type being populated
        page: &'static str,
        /// Field whose lookup was ambiguous
        field: &'static str,
        /// Number of elements that survived the filter chain
        count: usize,
    },

    /// Error surfaced by the underlying driver or search context
    #[error("driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },
}

impl PoblarError {
    /// Convenience constructor for failures surfaced by a
    /// [`SearchContext`](crate::SearchContext) collaborator.
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }
}
