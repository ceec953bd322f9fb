//! Role-based access policy.
//!
//! A static capability table maps `(role, operation)` pairs to "allowed".
//! Anything absent from the table is denied. The table is plain data: the
//! server may replace [`DEFAULT_GRANTS`] with one read from configuration.

use std::{
  collections::{HashMap, HashSet},
  str::FromStr,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Roles and operations ────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
  Employee,
  Moderator,
}

/// Every operation the service exposes, mutating or not.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  CreatePickupPoint,
  DeactivatePickupPoint,
  OpenSession,
  AddProduct,
  RemoveLastProduct,
  CloseSession,
  ListPickupPoints,
  ListSessions,
  ListProducts,
}

/// An authenticated caller. Issued outside the core; the core only sees the
/// decoded identity and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub actor_id: Uuid,
  pub role:     Role,
}

// ─── Capability table ────────────────────────────────────────────────────────

/// Built-in grants: employees run intake sessions, moderators curate the
/// catalog, and both may read.
pub const DEFAULT_GRANTS: &[(Role, &[Operation])] = &[
  (Role::Employee, &[
    Operation::OpenSession,
    Operation::AddProduct,
    Operation::RemoveLastProduct,
    Operation::CloseSession,
    Operation::ListPickupPoints,
    Operation::ListSessions,
    Operation::ListProducts,
  ]),
  (Role::Moderator, &[
    Operation::CreatePickupPoint,
    Operation::DeactivatePickupPoint,
    Operation::ListPickupPoints,
    Operation::ListSessions,
    Operation::ListProducts,
  ]),
];

/// A fail-closed capability table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
  grants: HashSet<(Role, Operation)>,
}

impl Default for AccessPolicy {
  fn default() -> Self { Self::from_grants(DEFAULT_GRANTS) }
}

impl AccessPolicy {
  /// An empty policy that denies everything.
  pub fn deny_all() -> Self { Self { grants: HashSet::new() } }

  pub fn from_grants(table: &[(Role, &[Operation])]) -> Self {
    let grants = table
      .iter()
      .flat_map(|(role, ops)| ops.iter().map(move |op| (*role, *op)))
      .collect();
    Self { grants }
  }

  /// Build a policy from a `role name -> [operation name]` table, as found in
  /// the server's `[access]` configuration section.
  pub fn from_table(table: &HashMap<String, Vec<String>>) -> Result<Self> {
    let mut grants = HashSet::new();
    for (role, ops) in table {
      let role = Role::from_str(role)
        .map_err(|_| Error::Validation(format!("unknown role: {role:?}")))?;
      for op in ops {
        let op = Operation::from_str(op).map_err(|_| {
          Error::Validation(format!("unknown operation: {op:?}"))
        })?;
        grants.insert((role, op));
      }
    }
    Ok(Self { grants })
  }

  pub fn authorize(&self, role: Role, operation: Operation) -> bool {
    self.grants.contains(&(role, operation))
  }

  /// Like [`authorize`](Self::authorize), but returns
  /// [`Error::Forbidden`] on denial.
  pub fn require(&self, actor: &Actor, operation: Operation) -> Result<()> {
    if self.authorize(actor.role, operation) {
      Ok(())
    } else {
      Err(Error::Forbidden { role: actor.role, operation })
    }
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;
  use crate::{Classify as _, ErrorKind};

  fn expected(role: Role, op: Operation) -> bool {
    use Operation::*;
    match role {
      Role::Employee => matches!(
        op,
        OpenSession
          | AddProduct
          | RemoveLastProduct
          | CloseSession
          | ListPickupPoints
          | ListSessions
          | ListProducts
      ),
      Role::Moderator => matches!(
        op,
        CreatePickupPoint
          | DeactivatePickupPoint
          | ListPickupPoints
          | ListSessions
          | ListProducts
      ),
    }
  }

  #[test]
  fn default_table_matches_every_pair() {
    let policy = AccessPolicy::default();
    for role in Role::iter() {
      for op in Operation::iter() {
        assert_eq!(
          policy.authorize(role, op),
          expected(role, op),
          "{role} × {op}"
        );
      }
    }
  }

  #[test]
  fn moderator_cannot_mutate_sessions() {
    let policy = AccessPolicy::default();
    for op in [
      Operation::OpenSession,
      Operation::AddProduct,
      Operation::RemoveLastProduct,
      Operation::CloseSession,
    ] {
      assert!(!policy.authorize(Role::Moderator, op), "{op}");
    }
  }

  #[test]
  fn deny_all_denies_everything() {
    let policy = AccessPolicy::deny_all();
    assert!(
      Role::iter()
        .flat_map(|r| Operation::iter().map(move |o| (r, o)))
        .all(|(r, o)| !policy.authorize(r, o))
    );
  }

  #[test]
  fn require_returns_forbidden() {
    let actor = Actor { actor_id: Uuid::new_v4(), role: Role::Moderator };
    let err = AccessPolicy::default()
      .require(&actor, Operation::AddProduct)
      .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(err.to_string().contains("add_product"), "{err}");
  }

  #[test]
  fn from_table_parses_names() {
    let mut table = HashMap::new();
    table.insert("moderator".to_string(), vec!["open_session".to_string()]);
    let policy = AccessPolicy::from_table(&table).unwrap();
    assert!(policy.authorize(Role::Moderator, Operation::OpenSession));
    assert!(!policy.authorize(Role::Employee, Operation::OpenSession));
    assert!(!policy.authorize(Role::Moderator, Operation::ListProducts));
  }

  #[test]
  fn from_table_rejects_unknown_names() {
    let mut table = HashMap::new();
    table.insert("admin".to_string(), vec![]);
    assert!(matches!(
      AccessPolicy::from_table(&table),
      Err(Error::Validation(_))
    ));

    let mut table = HashMap::new();
    table.insert("employee".to_string(), vec!["launch_rockets".to_string()]);
    assert!(matches!(
      AccessPolicy::from_table(&table),
      Err(Error::Validation(_))
    ));
  }
}
