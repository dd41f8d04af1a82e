use query_structure::{AggregateFunction, DomainError, ScalarType, SpatialOperator};
use thiserror::Error;

/// Broad classes of compilation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request or metadata asks for something the compiler cannot do.
    Configuration,
    /// A value in the request cannot be used.
    Data,
}

#[derive(Debug, Error)]
pub enum SqlError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Unsupported filter on `{}`: {}", field, reason)]
    UnsupportedFilter { field: String, reason: String },

    #[error("Aggregate {} is not supported on `{}` of type {}", function, field, scalar_type)]
    UnsupportedAggregate {
        function: AggregateFunction,
        field: String,
        scalar_type: ScalarType,
    },

    #[error("Spatial operator {} is not supported by the {} strategy", operator, strategy)]
    UnsupportedSpatialOperator {
        operator: SpatialOperator,
        strategy: &'static str,
    },

    #[error("Invalid request: {}", _0)]
    InvalidRequest(String),

    #[error("Missing required input: {}", _0)]
    MissingInput(&'static str),

    #[error("Malformed geometry `{}`: {}", input, reason)]
    MalformedGeometry { input: String, reason: String },

    #[error("Cannot reproject geometry from SRID {} to SRID {}: no equivalent SRID known", from, to)]
    UnsupportedReprojection { from: i32, to: i32 },

    #[error("Failed to render query: {}", _0)]
    QueryRender(String),
}

impl SqlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlError::MalformedGeometry { .. } | SqlError::UnsupportedReprojection { .. } => ErrorKind::Data,
            _ => ErrorKind::Configuration,
        }
    }

    /// Compilation is deterministic, so repeating it cannot help.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub(crate) fn unsupported_filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SqlError::UnsupportedFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
