//! Transition rules of the intake-session state machine.
//!
//! ```text
//! NoOpenSession ──open──► InProgress ──close──► Closed
//!       ▲                  │    ▲                  │
//!       │                  add / remove_last       │
//!       └──────────────────────────────────────────┘
//! ```
//!
//! These functions are pure: they inspect state loaded by a store and decide
//! whether a transition is legal. A store must load that state and apply the
//! transition inside one transaction, otherwise the checks below are racy.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  access::Operation,
  pickup_point::PickupPoint,
  session::{IntakeSession, SessionStatus},
};

/// A new session may be opened only at an active point with no open session.
pub fn ensure_can_open(
  point: &PickupPoint,
  open_session: Option<&IntakeSession>,
) -> Result<()> {
  if !point.active {
    return Err(Error::PickupPointInactive(point.pickup_point_id));
  }
  match open_session {
    Some(_) => Err(Error::SessionAlreadyOpen(point.pickup_point_id)),
    None => Ok(()),
  }
}

/// Products may be added to, removed from, or sealed into a session only
/// while it is in progress.
pub fn ensure_accepting(session: &IntakeSession, operation: Operation) -> Result<()> {
  match session.status {
    SessionStatus::InProgress => Ok(()),
    status => Err(Error::InvalidState {
      session_id: session.session_id,
      status,
      operation,
    }),
  }
}

/// Removal needs an open session with at least one product. A closed session
/// reports `InvalidState` even when it happens to be empty.
pub fn ensure_removable(session: &IntakeSession, remaining: usize) -> Result<()> {
  ensure_accepting(session, Operation::RemoveLastProduct)?;
  if remaining == 0 {
    return Err(Error::EmptySession(session.session_id));
  }
  Ok(())
}

/// Next sequence number after the session's high-water mark. Sequences start
/// at 1 and a removed number is never handed out again.
pub fn next_sequence(high_water: u32) -> Result<u32> {
  high_water
    .checked_add(1)
    .ok_or_else(|| Error::Conflict("sequence numbers exhausted".into()))
}

impl IntakeSession {
  /// Transition to `Closed`. Sealing twice is an error so callers can detect
  /// double-close bugs.
  pub fn seal(mut self, at: DateTime<Utc>) -> Result<Self> {
    ensure_accepting(&self, Operation::CloseSession)?;
    self.status = SessionStatus::Closed;
    self.closed_at = Some(at);
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::{Classify as _, ErrorKind, pickup_point::City};

  fn point(active: bool) -> PickupPoint {
    PickupPoint {
      pickup_point_id: Uuid::new_v4(),
      city: City::Kazan,
      registered_at: Utc::now(),
      active,
    }
  }

  #[test]
  fn open_requires_no_open_session() {
    let p = point(true);
    assert!(ensure_can_open(&p, None).is_ok());

    let existing = IntakeSession::open(p.pickup_point_id, Utc::now());
    let err = ensure_can_open(&p, Some(&existing)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
  }

  #[test]
  fn open_rejects_inactive_point() {
    let err = ensure_can_open(&point(false), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
  }

  #[test]
  fn seal_stamps_closed_at() {
    let s = IntakeSession::open(Uuid::new_v4(), Utc::now());
    let at = Utc::now();
    let sealed = s.seal(at).unwrap();
    assert_eq!(sealed.status, SessionStatus::Closed);
    assert_eq!(sealed.closed_at, Some(at));
  }

  #[test]
  fn double_seal_is_invalid_state() {
    let sealed = IntakeSession::open(Uuid::new_v4(), Utc::now())
      .seal(Utc::now())
      .unwrap();
    let err = sealed.seal(Utc::now()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
  }

  #[test]
  fn closed_session_rejects_add() {
    let sealed = IntakeSession::open(Uuid::new_v4(), Utc::now())
      .seal(Utc::now())
      .unwrap();
    let err = ensure_accepting(&sealed, Operation::AddProduct).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidState { operation: Operation::AddProduct, status: SessionStatus::Closed, .. }
    ));
  }

  #[test]
  fn remove_on_empty_open_session_is_empty_state() {
    let s = IntakeSession::open(Uuid::new_v4(), Utc::now());
    assert_eq!(ensure_removable(&s, 0).unwrap_err().kind(), ErrorKind::EmptyState);
    assert!(ensure_removable(&s, 1).is_ok());
  }

  #[test]
  fn remove_on_closed_empty_session_is_invalid_state() {
    let sealed = IntakeSession::open(Uuid::new_v4(), Utc::now())
      .seal(Utc::now())
      .unwrap();
    assert_eq!(
      ensure_removable(&sealed, 0).unwrap_err().kind(),
      ErrorKind::InvalidState
    );
  }

  #[test]
  fn sequences_start_at_one_and_never_repeat() {
    assert_eq!(next_sequence(0).unwrap(), 1);
    assert_eq!(next_sequence(41).unwrap(), 42);
    assert!(next_sequence(u32::MAX).is_err());
  }
}
