use thiserror::Error;

/// Errors raised by the document model.
///
/// Position arithmetic inside the gap cursor never produces these; they
/// surface only where a caller hands the model an offset, a JSON value or
/// a schema it cannot honour.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Position {pos} out of range (document content size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("Unknown node type: {name}")]
    UnknownNodeType { name: String },

    #[error("Invalid schema: {reason}")]
    InvalidSchema { reason: String },

    #[error("Cannot insert at {pos}: {reason}")]
    InvalidInsert { pos: usize, reason: String },

    #[error("No node after position {pos} to select")]
    NothingToSelect { pos: usize },

    #[error("Invalid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Unknown selection type: {id}")]
    UnknownSelectionType { id: String },

    #[error("Selection type {id} is already registered")]
    DuplicateSelectionId { id: String },
}
