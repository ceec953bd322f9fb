//! Accounts and bearer-token records.
//!
//! Password hashing and token generation belong to the transport; the core
//! only stores their outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::{Actor, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub account_id:    Uuid,
  pub email:         String,
  /// PHC string, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub role:          Role,
  pub created_at:    DateTime<Utc>,
}

impl Account {
  pub fn actor(&self) -> Actor { Actor { actor_id: self.account_id, role: self.role } }
}

/// Input to [`AccountStore::register`](crate::store::AccountStore::register).
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:         String,
  pub password_hash: String,
  pub role:          Role,
}

/// Normalise an email for storage and lookup. Rejects obviously malformed
/// addresses.
pub fn normalize_email(email: &str) -> crate::Result<String> {
  let email = email.trim().to_lowercase();
  match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
    _ => Err(crate::Error::Validation(format!("invalid email: {email:?}"))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalizes_case_and_whitespace() {
    assert_eq!(normalize_email("  Bob@Example.COM ").unwrap(), "bob@example.com");
  }

  #[test]
  fn rejects_malformed() {
    assert!(normalize_email("nobody").is_err());
    assert!(normalize_email("@example.com").is_err());
    assert!(normalize_email("a@localhost").is_err());
  }
}
