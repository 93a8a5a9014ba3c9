//! Error type for `agora-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] agora_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("user not found: {0}")]
  UserNotFound(i64),

  /// An update targeted a project row that does not exist.
  #[error("project not found: {0}")]
  ProjectNotFound(i64),

  /// An update targeted an item row that does not exist.
  #[error("item not found: {0}")]
  ItemNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
