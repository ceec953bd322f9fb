//! Read-side queries. These run outside the workflow transactions and may
//! observe state that a concurrent writer is about to change.

use pvz_core::{product::Product, session::IntakeSession, store::SessionQuery};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::{
  Result, catalog,
  encode::{SESSION_COLUMNS, RawSession, encode_dt, encode_status, encode_uuid},
  ledger, workflow,
};

pub fn list_sessions(
  conn: &Connection,
  pickup_point_id: Uuid,
  query: SessionQuery,
) -> Result<Vec<IntakeSession>> {
  catalog::load(conn, pickup_point_id)?;

  let status = query.status.map(encode_status);
  let start  = query.window.start.map(encode_dt);
  let end    = query.window.end.map(encode_dt);
  // SQLite treats a negative LIMIT as "no limit".
  let (limit, offset) = match query.page {
    Some(p) => (
      i64::from(p.limit()),
      i64::try_from(p.offset()).unwrap_or(i64::MAX),
    ),
    None => (-1, 0),
  };

  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {SESSION_COLUMNS} FROM intake_sessions
     WHERE pickup_point_id = ?1
       AND (?2 IS NULL OR status = ?2)
       AND (?3 IS NULL OR opened_at >= ?3)
       AND (?4 IS NULL OR opened_at <= ?4)
     ORDER BY opened_at, session_id
     LIMIT ?5 OFFSET ?6"
  ))?;
  let raws = stmt
    .query_map(
      params![encode_uuid(pickup_point_id), status, start, end, limit, offset],
      RawSession::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawSession::into_session).collect()
}

/// Products of an existing session; an unknown session is not found rather
/// than empty.
pub fn list_products(conn: &Connection, session_id: Uuid) -> Result<Vec<Product>> {
  if workflow::find_session(conn, session_id)?.is_none() {
    return Err(pvz_core::Error::SessionNotFound(session_id).into());
  }
  ledger::list_by_session(conn, session_id)
}
