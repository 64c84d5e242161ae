//! Error taxonomy shared across the workspace.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed backup or CSV input (root not an array, missing
    /// required fields, broken timestamp shape).
    #[error("Invalid format: {0}")]
    Format(String),

    /// A submission missing required fields (e.g. no photo attached).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unauthenticated access to a mutating operation.
    #[error("Unauthorized: {0}")]
    Access(String),

    /// Authenticated but not permitted (privileged operations).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Network or write failure from the backing store.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
