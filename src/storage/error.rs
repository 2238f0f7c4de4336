use std::time::Duration;

/// Errors reported by the storage backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
  #[error("authentication failed: {0}")]
  AuthenticationFailed(String),

  #[error("no collection at {0}")]
  NoSuchCollection(String),

  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("backend unavailable: {0}")]
  Unavailable(String),

  #[error("backend call timed out after {0:?}")]
  Timeout(Duration),

  #[error("session already closed")]
  SessionClosed,

  #[error("internal backend error: {0}")]
  Internal(String),
}
