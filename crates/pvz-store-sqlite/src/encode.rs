//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings with fixed sub-second
//! precision, so lexical order equals chronological order. UUIDs are stored
//! as hyphenated lowercase strings. Enums are stored as their `strum` names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use pvz_core::{
  access::Role,
  account::Account,
  pickup_point::{City, PickupPoint},
  product::{Product, ProductType},
  session::{IntakeSession, SessionStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time, truncated to the precision stored on disk so values
/// handed back to callers compare equal to what a later read returns.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn encode_status(s: SessionStatus) -> &'static str { s.into() }

pub fn encode_product_type(t: ProductType) -> &'static str {
  match t {
    ProductType::Electronics => "electronics",
    ProductType::Clothing => "clothing",
    ProductType::Footwear => "footwear",
  }
}

pub fn encode_role(r: Role) -> &'static str { r.into() }

pub fn encode_city(c: City) -> String { c.to_string() }

fn decode_enum<T: FromStr>(what: &str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn decode_sequence(n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("sequence out of range: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPickupPoint::from_row`].
pub const PICKUP_POINT_COLUMNS: &str = "pickup_point_id, city, registered_at, active";

/// Raw values read directly from a `pickup_points` row.
pub struct RawPickupPoint {
  pub pickup_point_id: String,
  pub city:            String,
  pub registered_at:   String,
  pub active:          bool,
}

impl RawPickupPoint {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pickup_point_id: row.get(0)?,
      city:            row.get(1)?,
      registered_at:   row.get(2)?,
      active:          row.get(3)?,
    })
  }

  pub fn into_pickup_point(self) -> Result<PickupPoint> {
    Ok(PickupPoint {
      pickup_point_id: decode_uuid(&self.pickup_point_id)?,
      city:            decode_enum("city", &self.city)?,
      registered_at:   decode_dt(&self.registered_at)?,
      active:          self.active,
    })
  }
}

/// Column list matching [`RawSession::from_row`].
pub const SESSION_COLUMNS: &str =
  "session_id, pickup_point_id, status, opened_at, closed_at";

/// Raw values read directly from an `intake_sessions` row.
pub struct RawSession {
  pub session_id:      String,
  pub pickup_point_id: String,
  pub status:          String,
  pub opened_at:       String,
  pub closed_at:       Option<String>,
}

impl RawSession {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_id:      row.get(0)?,
      pickup_point_id: row.get(1)?,
      status:          row.get(2)?,
      opened_at:       row.get(3)?,
      closed_at:       row.get(4)?,
    })
  }

  pub fn into_session(self) -> Result<IntakeSession> {
    Ok(IntakeSession {
      session_id:      decode_uuid(&self.session_id)?,
      pickup_point_id: decode_uuid(&self.pickup_point_id)?,
      status:          decode_enum("session status", &self.status)?,
      opened_at:       decode_dt(&self.opened_at)?,
      closed_at:       self.closed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawProduct::from_row`].
pub const PRODUCT_COLUMNS: &str = "product_id, session_id, product_type, sequence, added_at";

/// Raw values read directly from a `products` row.
pub struct RawProduct {
  pub product_id:   String,
  pub session_id:   String,
  pub product_type: String,
  pub sequence:     i64,
  pub added_at:     String,
}

impl RawProduct {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:   row.get(0)?,
      session_id:   row.get(1)?,
      product_type: row.get(2)?,
      sequence:     row.get(3)?,
      added_at:     row.get(4)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      product_id:   decode_uuid(&self.product_id)?,
      session_id:   decode_uuid(&self.session_id)?,
      product_type: decode_enum("product type", &self.product_type)?,
      sequence:     decode_sequence(self.sequence)?,
      added_at:     decode_dt(&self.added_at)?,
    })
  }
}

/// Column list matching [`RawAccount::from_row`].
pub const ACCOUNT_COLUMNS: &str = "account_id, email, password_hash, role, created_at";

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:    String,
  pub email:         String,
  pub password_hash: String,
  pub role:          String,
  pub created_at:    String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:    row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      account_id:    decode_uuid(&self.account_id)?,
      email:         self.email,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub fn decode_role(s: &str) -> Result<Role> { decode_enum("role", s) }
