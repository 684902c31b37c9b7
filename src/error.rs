use thiserror::Error;

use crate::document::DocumentError;
use crate::types::{ReadError, WriteError};

/// Unified error type covering documents, reading, writing, and I/O.
///
/// Returned by convenience methods like
/// [`Condition::from_text()`](crate::Condition::from_text) and
/// [`Condition::from_file()`](crate::Condition::from_file).
#[derive(Debug, Error)]
pub enum CondflowError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
