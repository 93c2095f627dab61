//! Error types for the editor

use richdoc_common::CommonError;
use richdoc_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Normalization did not settle after {0} passes")]
    NormalizationDiverged(usize),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Common(#[from] CommonError),

    #[error("Editor is in a structure error state; recover first")]
    StructureError,

    #[error("Document is not file-backed")]
    NotFileBacked,
}

pub type EditorResult<T> = Result<T, EditorError>;
