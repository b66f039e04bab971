//! Errors raised by host-model mutations.

use thiserror::Error;

/// A model mutation or lookup failure.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Referenced file is not part of the model.
    #[error("file '{0}' not found in model")]
    FileNotFound(String),

    /// Referenced class is not part of the file.
    #[error("class '{class}' not found in file '{file}'")]
    ClassNotFound { file: String, class: String },

    /// Referenced method is not part of the class.
    #[error("method '{method}' not found in class '{class}'")]
    MethodNotFound { class: String, method: String },

    /// A method exists but carries no body.
    #[error("method '{0}' has no body")]
    MissingBody(String),

    /// A statement position is out of range for the addressed block.
    #[error("statement position {block}:{index} out of range in '{method}'")]
    StatementOutOfRange {
        method: String,
        block: usize,
        index: usize,
    },
}
