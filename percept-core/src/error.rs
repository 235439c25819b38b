use thiserror::Error;

use crate::stimulus::{IllusionType, ResponseAxis};

/// Precondition violations reported back to the trial/block handlers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("trial ended with neither a key press nor a pointer response")]
    MissingResponse,

    #[error("no trial records in scope to score")]
    InsufficientData,

    #[error("key `{key}` is not a valid {axis} response")]
    InvalidKey { key: String, axis: ResponseAxis },

    #[error("trial completed while no block is open")]
    NoActiveBlock,

    #[error("{got} trial completed inside a {expected} block")]
    BlockMismatch {
        expected: IllusionType,
        got: IllusionType,
    },

    #[error("{open} block is still open")]
    BlockStillOpen { open: IllusionType },
}
