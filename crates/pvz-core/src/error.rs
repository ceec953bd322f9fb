//! Error types for `pvz-core`.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{access::{Operation, Role}, session::SessionStatus};

/// The coarse category of a failure.
///
/// Transports map each kind to a protocol status; the core only ever raises
/// the kind and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  /// Malformed input. Safe to retry after the caller fixes it.
  Validation,
  /// Uniqueness violation or transaction contention. The whole operation may
  /// be retried.
  Conflict,
  /// The operation is not legal in the session's current state.
  InvalidState,
  /// Removal from a session with no products left.
  EmptyState,
  NotFound,
  Forbidden,
  Unauthenticated,
  Internal,
}

/// Implemented by every error type that crosses a crate boundary, so callers
/// can branch on [`ErrorKind`] without knowing the concrete backend.
pub trait Classify {
  fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("pickup point {0} already has an open intake session")]
  SessionAlreadyOpen(Uuid),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("cannot {operation} on session {session_id}: session is {status}")]
  InvalidState {
    session_id: Uuid,
    status:     SessionStatus,
    operation:  Operation,
  },

  #[error("pickup point {0} has no open intake session")]
  NoOpenSession(Uuid),

  /// Adding to an unknown session is a state error, like adding to a closed
  /// one.
  #[error("session {0} does not exist and cannot accept products")]
  NotAccepting(Uuid),

  #[error("pickup point {0} is deactivated")]
  PickupPointInactive(Uuid),

  #[error("session {0} has no products to remove")]
  EmptySession(Uuid),

  #[error("pickup point not found: {0}")]
  PickupPointNotFound(Uuid),

  #[error("session not found: {0}")]
  SessionNotFound(Uuid),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("role {role} may not {operation}")]
  Forbidden { role: Role, operation: Operation },

  #[error("invalid credentials")]
  Unauthenticated,
}

impl Classify for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Error::Validation(_) | Error::EmailTaken(_) => ErrorKind::Validation,
      Error::SessionAlreadyOpen(_) | Error::Conflict(_) => ErrorKind::Conflict,
      Error::InvalidState { .. }
      | Error::NoOpenSession(_)
      | Error::NotAccepting(_)
      | Error::PickupPointInactive(_) => ErrorKind::InvalidState,
      Error::EmptySession(_) => ErrorKind::EmptyState,
      Error::PickupPointNotFound(_) | Error::SessionNotFound(_) => {
        ErrorKind::NotFound
      }
      Error::Forbidden { .. } => ErrorKind::Forbidden,
      Error::Unauthenticated => ErrorKind::Unauthenticated,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
