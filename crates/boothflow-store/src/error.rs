use thiserror::Error;

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
  /// The requested definition was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// The workflow id cannot be used as a storage key.
  #[error("invalid workflow id: {0:?}")]
  InvalidId(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}
