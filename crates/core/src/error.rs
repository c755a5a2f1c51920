#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
