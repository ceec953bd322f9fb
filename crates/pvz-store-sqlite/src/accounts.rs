//! Row-level access to the `accounts` and `tokens` tables.

use chrono::{DateTime, Utc};
use pvz_core::{
  access::Actor,
  account::{Account, NewAccount},
};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{ACCOUNT_COLUMNS, RawAccount, decode_role, decode_uuid, encode_dt, encode_role, encode_uuid},
};

pub fn insert(conn: &Connection, input: NewAccount, at: DateTime<Utc>) -> Result<Account> {
  let account = Account {
    account_id:    Uuid::new_v4(),
    email:         input.email,
    password_hash: input.password_hash,
    role:          input.role,
    created_at:    at,
  };

  conn
    .execute(
      "INSERT INTO accounts (account_id, email, password_hash, role, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5)",
      params![
        encode_uuid(account.account_id),
        account.email,
        account.password_hash,
        encode_role(account.role),
        encode_dt(at),
      ],
    )
    .map_err(|e| match e.sqlite_error_code() {
      Some(ErrorCode::ConstraintViolation) => {
        Error::Core(pvz_core::Error::EmailTaken(account.email.clone()))
      }
      _ => Error::Sqlite(e),
    })?;

  Ok(account)
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<Account>> {
  conn
    .query_row(
      &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
      params![email],
      RawAccount::from_row,
    )
    .optional()?
    .map(RawAccount::into_account)
    .transpose()
}

pub fn insert_token(
  conn: &Connection,
  digest: &str,
  actor: Actor,
  at: DateTime<Utc>,
) -> Result<()> {
  conn.execute(
    "INSERT INTO tokens (token_digest, actor_id, role, issued_at) VALUES (?1, ?2, ?3, ?4)",
    params![digest, encode_uuid(actor.actor_id), encode_role(actor.role), encode_dt(at)],
  )?;
  Ok(())
}

pub fn find_token(conn: &Connection, digest: &str) -> Result<Option<Actor>> {
  let row: Option<(String, String)> = conn
    .query_row(
      "SELECT actor_id, role FROM tokens WHERE token_digest = ?1",
      params![digest],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;

  row
    .map(|(id, role)| -> Result<Actor> {
      Ok(Actor { actor_id: decode_uuid(&id)?, role: decode_role(&role)? })
    })
    .transpose()
}
