//! Error kinds surfaced by the master and meta-node clients.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The master does not know the requested partition, node or volume.
    #[error("not found: {0}")]
    NotFound(String),

    /// The target could not be reached (connect failure or RPC timeout).
    #[error("{target} unreachable: {source}")]
    Unreachable {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    /// The target answered with a non-success API code.
    #[error("api error from {target} (code {code}): {msg}")]
    Api {
        target: String,
        code: i32,
        msg: String,
    },

    /// The target answered with a body that does not decode.
    #[error("invalid response from {target}: {source}")]
    InvalidResponse {
        target: String,
        #[source]
        source: serde_json::Error,
    },
}
