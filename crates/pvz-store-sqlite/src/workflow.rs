//! The intake-session state machine, executed against SQLite.
//!
//! Each public function is one workflow operation. It opens an `IMMEDIATE`
//! transaction, which takes the database write lock before the first read,
//! then loads the session state, applies the rules from
//! [`pvz_core::intake`] and performs the mutation. Check and act therefore
//! observe the same snapshot, and concurrent operations on one session are
//! serialized. An early return drops the transaction, which rolls it back.

use chrono::{DateTime, Utc};
use pvz_core::{
  access::Operation,
  intake,
  product::{Product, ProductType},
  session::{IntakeSession, SessionStatus, SessionTarget},
};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Error, Result, catalog,
  encode::{SESSION_COLUMNS, RawSession, encode_dt, encode_status, encode_uuid},
  ledger,
};

// ─── Session rows ────────────────────────────────────────────────────────────

pub fn find_session(conn: &Connection, id: Uuid) -> Result<Option<IntakeSession>> {
  conn
    .query_row(
      &format!("SELECT {SESSION_COLUMNS} FROM intake_sessions WHERE session_id = ?1"),
      params![encode_uuid(id)],
      RawSession::from_row,
    )
    .optional()?
    .map(RawSession::into_session)
    .transpose()
}

pub fn find_open_session(
  conn: &Connection,
  pickup_point_id: Uuid,
) -> Result<Option<IntakeSession>> {
  conn
    .query_row(
      &format!(
        "SELECT {SESSION_COLUMNS} FROM intake_sessions
         WHERE pickup_point_id = ?1 AND status = ?2"
      ),
      params![encode_uuid(pickup_point_id), encode_status(SessionStatus::InProgress)],
      RawSession::from_row,
    )
    .optional()?
    .map(RawSession::into_session)
    .transpose()
}

/// Resolve a [`SessionTarget`] to a session row.
fn resolve(conn: &Connection, target: SessionTarget) -> Result<IntakeSession> {
  match target {
    SessionTarget::Id(id) => find_session(conn, id)?
      .ok_or_else(|| pvz_core::Error::SessionNotFound(id).into()),
    SessionTarget::OpenAt(pickup_point_id) => {
      catalog::load(conn, pickup_point_id)?;
      find_open_session(conn, pickup_point_id)?
        .ok_or_else(|| pvz_core::Error::NoOpenSession(pickup_point_id).into())
    }
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

pub fn open_session(
  conn: &mut Connection,
  pickup_point_id: Uuid,
  at: DateTime<Utc>,
) -> Result<IntakeSession> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let point = catalog::load(&tx, pickup_point_id)?;
  let open = find_open_session(&tx, pickup_point_id)?;
  intake::ensure_can_open(&point, open.as_ref())?;

  let session = IntakeSession::open(pickup_point_id, at);
  tx.execute(
    "INSERT INTO intake_sessions (session_id, pickup_point_id, status, opened_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      encode_uuid(session.session_id),
      encode_uuid(pickup_point_id),
      encode_status(session.status),
      encode_dt(at),
    ],
  )
  .map_err(|e| match e.sqlite_error_code() {
    // The partial unique index caught a writer that bypassed the check above.
    Some(ErrorCode::ConstraintViolation) => {
      Error::Core(pvz_core::Error::SessionAlreadyOpen(pickup_point_id))
    }
    _ => Error::Sqlite(e),
  })?;

  tx.commit()?;
  Ok(session)
}

pub fn add_product(
  conn: &mut Connection,
  target: SessionTarget,
  product_type: ProductType,
  at: DateTime<Utc>,
) -> Result<Product> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let session = match resolve(&tx, target) {
    Err(Error::Core(pvz_core::Error::SessionNotFound(id))) => {
      return Err(pvz_core::Error::NotAccepting(id).into());
    }
    other => other?,
  };
  intake::ensure_accepting(&session, Operation::AddProduct)?;
  let product = ledger::append(&tx, session.session_id, product_type, at)?;

  tx.commit()?;
  Ok(product)
}

pub fn remove_last_product(conn: &mut Connection, target: SessionTarget) -> Result<Product> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let session = resolve(&tx, target)?;
  intake::ensure_removable(&session, ledger::count(&tx, session.session_id)?)?;
  let product = ledger::delete_highest_sequence(&tx, session.session_id)?;

  tx.commit()?;
  Ok(product)
}

pub fn close_session(
  conn: &mut Connection,
  target: SessionTarget,
  at: DateTime<Utc>,
) -> Result<IntakeSession> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let sealed = resolve(&tx, target)?.seal(at)?;
  tx.execute(
    "UPDATE intake_sessions SET status = ?2, closed_at = ?3 WHERE session_id = ?1",
    params![
      encode_uuid(sealed.session_id),
      encode_status(sealed.status),
      encode_dt(at),
    ],
  )?;

  tx.commit()?;
  Ok(sealed)
}
