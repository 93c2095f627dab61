use crate::path::Path;
use crate::tree::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("No node at path {0}")]
    PathNotFound(Path),

    #[error("Node {0} is not a text leaf")]
    NotText(NodeId),

    #[error("Node {0} cannot have children")]
    NotAnElement(NodeId),

    #[error("Index {index} out of bounds for {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("The document root cannot be moved or removed")]
    RootNode,

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid point: {0}")]
    InvalidPoint(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
