use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Malformed command payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
