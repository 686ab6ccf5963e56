//! Error types for the Bitcoin JSON-RPC transport and source-chain adapter.

use thiserror::Error;

/// Errors raised by an [`RpcTransport`](crate::RpcTransport) for a single request.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    /// A default header value is not valid in an HTTP header.
    #[error("invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The server answered with a non-success status and no JSON-RPC result or error.
    #[error("unexpected HTTP status {status}: {body}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The raw response body, truncated for display.
        body: String,
    },

    /// The response body is not a JSON-RPC envelope.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response id does not echo the request id.
    #[error("response id mismatch: expected {expected}, got {got}")]
    IdMismatch {
        /// The id sent with the request.
        expected: u64,
        /// The id carried by the response.
        got: String,
    },

    /// The upstream embedded an error object in the response.
    #[error("remote error {code}: {message}")]
    Remote {
        /// The JSON-RPC error code.
        code: i64,
        /// The JSON-RPC error message.
        message: String,
    },

    /// The envelope carried neither a result nor an error.
    #[error("response for `{0}` carried no result")]
    MissingResult(String),
}

/// Errors raised by the typed source-chain adapter.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The adapter was constructed without an access credential.
    #[error("missing source-chain API key")]
    MissingApiKey,

    /// The configured endpoint is not a usable URL.
    #[error("invalid source-chain endpoint: {0}")]
    InvalidEndpoint(String),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The underlying RPC call failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The result field was present but did not have the expected shape.
    #[error("bad `{method}` response: {reason}")]
    BadResponse {
        /// The RPC method that produced the response.
        method: &'static str,
        /// Why the response was rejected.
        reason: String,
    },
}

impl SourceError {
    /// Builds a [`SourceError::BadResponse`] for the given method.
    pub fn bad_response(method: &'static str, reason: impl ToString) -> Self {
        Self::BadResponse { method, reason: reason.to_string() }
    }
}

/// Result alias for adapter operations.
pub type SourceResult<T> = Result<T, SourceError>;
