use thiserror::Error;

/// Failures surfaced by a [`TicketSource`](super::TicketSource).
///
/// Every variant aborts the whole request; per-record problems are never
/// reported through this type.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Access token unavailable: {0}")]
    TokenUnavailable(String),
    #[error("Upstream request failed for {endpoint}: {message}")]
    RequestFailed { endpoint: String, message: String },
    #[error("Snapshot could not be read from {path}: {source}")]
    SnapshotIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot at {path} is malformed: {source}")]
    SnapshotFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),
}

impl UpstreamError {
    pub fn request_failed(endpoint: &str, message: impl Into<String>) -> Self {
        UpstreamError::RequestFailed {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }
}
