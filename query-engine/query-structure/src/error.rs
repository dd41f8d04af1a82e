use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Entity `{}` not found", name)]
    EntityNotFound { name: String },

    #[error("Field `{}` on entity `{}` not found", field, entity)]
    FieldNotFound { entity: String, field: String },

    #[error("Field `{}` on entity `{}` is not a scalar field", field, entity)]
    NotAScalarField { entity: String, field: String },

    #[error("Field `{}` on entity `{}` is not an object field", field, entity)]
    NotAnObjectField { entity: String, field: String },

    #[error("Invalid relation on `{}`: {}", field, reason)]
    InvalidRelation { field: String, reason: String },

    #[error("Invalid relation configuration: {}", _0)]
    InvalidRelationConfig(String),

    #[error("Join criteria key names {:?} do not match the expected {:?}", found, expected)]
    InconsistentJoinKeys { expected: Vec<String>, found: Vec<String> },

    #[error("Join criteria must contain at least one key")]
    EmptyJoinCriteria,

    #[error("Unsupported sort direction `{}`", _0)]
    UnsupportedSortDirection(String),

    #[error("Invalid schema: {}", _0)]
    InvalidSchema(String),
}
