use std::path::PathBuf;

/// Result alias used throughout the crate; every fallible public entry point
/// returns this instead of the boolean success/failure the wire protocol
/// itself reports.
pub type DaemonResult<T> = Result<T, DaemonClientError>;

/// Every way a send or a lifecycle operation can fail.
///
/// `DeadlineExceeded` and `WriteFailed` both map to the protocol's plain
/// "send failed" boolean; they are kept distinct here so a caller that wants
/// to log or assert on the failure kind can do so without re-deriving it from
/// an `io::Error`.
#[derive(Debug, thiserror::Error)]
pub enum DaemonClientError {
    #[error("failed to open daemon transport at {path:?}: {source}")]
    TransportUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("send did not complete within the {budget_secs}s deadline ({sent}/{total} bytes written)")]
    DeadlineExceeded {
        budget_secs: f64,
        sent: usize,
        total: usize,
    },

    #[error("write to daemon transport failed: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("daemon client session is closed")]
    SessionClosed,

    #[error("varint decode failed: {0}")]
    Varint(&'static str),
}

impl From<std::io::Error> for DaemonClientError {
    fn from(err: std::io::Error) -> Self {
        DaemonClientError::WriteFailed(err)
    }
}
