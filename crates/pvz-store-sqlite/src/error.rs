//! Error type for `pvz-store-sqlite`.

use pvz_core::{Classify, ErrorKind};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] pvz_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside its enumerated domain.
  #[error("corrupt row: {0}")]
  Decode(String),
}

/// Lock contention and constraint violations mean another transaction got
/// there first; the caller may retry the whole operation.
fn sqlite_kind(e: &rusqlite::Error) -> ErrorKind {
  match e.sqlite_error_code() {
    Some(
      ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::ConstraintViolation,
    ) => ErrorKind::Conflict,
    _ => ErrorKind::Internal,
  }
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::Sqlite(e) => sqlite_kind(e),
      Error::Database(tokio_rusqlite::Error::Rusqlite(e)) => sqlite_kind(e),
      Error::Database(_)
      | Error::Uuid(_)
      | Error::DateParse(_)
      | Error::Decode(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
