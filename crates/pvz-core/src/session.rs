//! Intake sessions ("receptions" on the wire).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

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
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
  InProgress,
  Closed,
}

/// A bounded period during which a pickup point accepts products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSession {
  pub session_id:      Uuid,
  pub pickup_point_id: Uuid,
  pub status:          SessionStatus,
  pub opened_at:       DateTime<Utc>,
  /// `None` while the session is in progress.
  pub closed_at:       Option<DateTime<Utc>>,
}

impl IntakeSession {
  /// A freshly opened session.
  pub fn open(pickup_point_id: Uuid, at: DateTime<Utc>) -> Self {
    Self {
      session_id: Uuid::new_v4(),
      pickup_point_id,
      status: SessionStatus::InProgress,
      opened_at: at,
      closed_at: None,
    }
  }
}

/// How a workflow operation names the session it acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTarget {
  /// A specific session.
  Id(Uuid),
  /// Whichever session is currently open at this pickup point. Resolved
  /// inside the same transaction as the mutation.
  OpenAt(Uuid),
}
