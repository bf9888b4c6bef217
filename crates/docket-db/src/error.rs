use anyhow::anyhow;
use docket_core::{AppError, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} already exists")]
    DuplicateKey(String),

    #[error("invalid document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateKey(_) => StatusCode::FORBIDDEN,
            Self::InvalidDocument(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        let status = err.status();
        match err {
            RepositoryError::Storage(e) => AppError::new(status, e),
            other => AppError::new(status, anyhow!(other.to_string())),
        }
    }
}
