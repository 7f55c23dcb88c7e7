//! Error taxonomy for the grocery core.
//!
//! Every variant is recoverable: the rejected operation leaves state
//! unchanged and the presentation layer reports the condition.

use thiserror::Error;
use uuid::Uuid;

use crate::db::StorageError;
use crate::parser::ParseError;
use crate::voice::VoiceError;

pub type Result<T> = std::result::Result<T, GroceryError>;

#[derive(Debug, Error)]
pub enum GroceryError {
    #[error("name must not be blank")]
    EmptyName,

    #[error("invalid price: {0}")]
    InvalidPrice(f64),

    #[error(transparent)]
    ParseFailure(#[from] ParseError),

    #[error("no grocery list is open")]
    NoActiveList,

    #[error("grocery list {0} not found")]
    ListNotFound(Uuid),

    #[error("user {0} not found")]
    UserNotFound(Uuid),

    #[error("cannot delete the last remaining user")]
    LastUser,

    #[error("microphone permission denied")]
    VoicePermissionDenied,

    #[error("speech recognition is not supported here")]
    VoiceUnsupported,

    #[error("voice capture failed: {0}")]
    VoiceCapture(VoiceError),

    #[error("failed to read saved data: {0}")]
    StorageReadFailure(#[source] StorageError),

    #[error("failed to read saved users: {0}")]
    UserIndexReadFailure(#[source] StorageError),

    #[error("failed to save data: {0}")]
    StorageWriteFailure(#[source] StorageError),
}

impl From<VoiceError> for GroceryError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::PermissionDenied => Self::VoicePermissionDenied,
            VoiceError::NotSupported => Self::VoiceUnsupported,
            other => Self::VoiceCapture(other),
        }
    }
}
