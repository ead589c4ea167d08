use thiserror::Error;
use weft_model::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GapCursorError {
    /// The JSON form is missing `pos` or it is not a non-negative integer.
    #[error("Invalid input for GapCursor::from_json")]
    InvalidJson { reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<GapCursorError> for ModelError {
    fn from(err: GapCursorError) -> Self {
        match err {
            GapCursorError::InvalidJson { reason } => ModelError::InvalidJson {
                reason: format!("Invalid input for GapCursor::from_json: {reason}"),
            },
            GapCursorError::Model(e) => e,
        }
    }
}
