//! Error types for the prism-results crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Malformed {type_name} payload: {source}")]
    Payload {
        type_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed query response: {0}")]
    Response(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
