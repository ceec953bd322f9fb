//! Product ledger: row-level access to the `products` table.
//!
//! No business rules live here. Mutating functions expect to be called by
//! [`crate::workflow`] on a connection that is already inside a write
//! transaction, after the session's state has been checked.

use chrono::{DateTime, Utc};
use pvz_core::{
  intake,
  product::{Product, ProductType},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{PRODUCT_COLUMNS, RawProduct, decode_sequence, encode_dt, encode_product_type, encode_uuid},
};

/// Append a product to `session_id`, bumping the session's sequence
/// high-water mark.
pub fn append(
  conn: &Connection,
  session_id: Uuid,
  product_type: ProductType,
  at: DateTime<Utc>,
) -> Result<Product> {
  let session_str = encode_uuid(session_id);

  let high_water: i64 = conn.query_row(
    "SELECT last_sequence FROM intake_sessions WHERE session_id = ?1",
    params![session_str],
    |r| r.get(0),
  )?;
  let sequence = intake::next_sequence(decode_sequence(high_water)?)?;

  conn.execute(
    "UPDATE intake_sessions SET last_sequence = ?2 WHERE session_id = ?1",
    params![session_str, sequence],
  )?;

  let product = Product {
    product_id: Uuid::new_v4(),
    session_id,
    product_type,
    sequence,
    added_at: at,
  };

  conn.execute(
    "INSERT INTO products (product_id, session_id, product_type, sequence, added_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      encode_uuid(product.product_id),
      session_str,
      encode_product_type(product_type),
      sequence,
      encode_dt(at),
    ],
  )?;

  Ok(product)
}

/// Number of products still present in the session.
pub fn count(conn: &Connection, session_id: Uuid) -> Result<usize> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM products WHERE session_id = ?1",
    params![encode_uuid(session_id)],
    |r| r.get(0),
  )?;
  Ok(usize::try_from(n).unwrap_or_default())
}

/// Delete and return the product with the highest sequence number.
pub fn delete_highest_sequence(conn: &Connection, session_id: Uuid) -> Result<Product> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {PRODUCT_COLUMNS} FROM products
         WHERE session_id = ?1
         ORDER BY sequence DESC
         LIMIT 1"
      ),
      params![encode_uuid(session_id)],
      RawProduct::from_row,
    )
    .optional()?
    .ok_or(pvz_core::Error::EmptySession(session_id))?;

  conn.execute(
    "DELETE FROM products WHERE product_id = ?1",
    params![raw.product_id],
  )?;

  raw.into_product()
}

/// All products of a session, ordered by sequence.
pub fn list_by_session(conn: &Connection, session_id: Uuid) -> Result<Vec<Product>> {
  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {PRODUCT_COLUMNS} FROM products WHERE session_id = ?1 ORDER BY sequence"
  ))?;
  let raws = stmt
    .query_map(params![encode_uuid(session_id)], RawProduct::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawProduct::into_product).collect()
}
