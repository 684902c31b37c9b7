use thiserror::Error;

use crate::document::DocumentError;

use super::leaf::BoxError;

/// Errors produced while reading a condition tree from a tag cursor.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unknown statement <{tag}>")]
    UnknownStatement { tag: String },

    #[error(
        "<{tag}> is not permitted as a direct child of <{parent}>; permitted: {}",
        allowed.iter().map(|t| format!("<{t}>")).collect::<Vec<_>>().join(", ")
    )]
    Structural {
        tag: String,
        parent: String,
        allowed: Vec<String>,
    },

    #[error("invalid <{tag}>: {source}")]
    Leaf {
        tag: String,
        #[source]
        source: BoxError,
    },

    #[error("<{tag}> must contain exactly one condition, found {found}")]
    GateArity { tag: String, found: usize },

    #[error("conditions nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Errors produced while writing a condition tree to a tag writer.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot write <{tag}>: {source}")]
    Leaf {
        tag: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}
