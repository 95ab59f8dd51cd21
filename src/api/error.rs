// ==========================================
// BOM Navigator - API error types
// ==========================================
// One surface error for UI collaborators; engine and repository
// failures pass through with their structure intact.
// ==========================================

use thiserror::Error;

use crate::engine::EngineError;
use crate::repository::RepositoryError;

/// API layer errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

/// Result type alias.
pub type ApiResult<T> = Result<T, ApiError>;
