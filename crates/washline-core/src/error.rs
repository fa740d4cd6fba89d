//! Error types for `washline-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Missing or malformed caller input (empty id, empty staff id, ...).
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The referenced bag id does not exist in the collection.
  #[error("bag not found: {0}")]
  NotFound(String),

  /// A bag with the same id already exists.
  #[error("bag id already exists: {0}")]
  Conflict(String),

  /// A domain rule was violated (e.g. non-positive declared count).
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// An error raised by the underlying key-value backend. Decode failures
  /// never land here — they degrade to "absent" at the adapter boundary.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Storage`].
  pub fn storage(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
