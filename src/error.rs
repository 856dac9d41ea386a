use crate::domain::session::SessionState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("A vend session is already active (state: {0})")]
    SessionActive(SessionState),
    #[error("No vend session is active")]
    NoActiveSession,
    #[error("Command '{command}' is not accepted in state {state}")]
    UnexpectedCommand {
        command: &'static str,
        state: SessionState,
    },
    #[error("Script error: {0}")]
    ScriptError(String),
    #[error("Session runner has stopped")]
    RunnerStopped,
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures raised while opening or driving a device transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("transport already closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
