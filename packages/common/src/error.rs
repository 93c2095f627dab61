use richdoc_model::ModelError;
use thiserror::Error;

/// Common error type that can hold any richdoc error
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
