//! Error types for `agora-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The process configuration is missing something the caller asked for.
  /// Not recoverable per request.
  #[error("improperly configured: {0}")]
  ImproperlyConfigured(String),

  #[error("{0} has not been saved yet")]
  Unsaved(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
