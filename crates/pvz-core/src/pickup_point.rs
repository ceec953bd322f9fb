//! Pickup point (ПВЗ): the catalog entry that owns intake sessions.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::Error;

/// Cities where a pickup point may be registered.
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
)]
pub enum City {
  #[serde(rename = "Москва")]
  #[strum(serialize = "Москва")]
  Moscow,
  #[serde(rename = "Санкт-Петербург")]
  #[strum(serialize = "Санкт-Петербург")]
  SaintPetersburg,
  #[serde(rename = "Казань")]
  #[strum(serialize = "Казань")]
  Kazan,
}

impl City {
  /// Parse a city name, reporting unsupported cities as validation errors.
  pub fn parse(name: &str) -> Result<Self, Error> {
    City::from_str(name.trim()).map_err(|_| {
      Error::Validation(format!(
        "pickup points can only be registered in Москва, Санкт-Петербург or \
         Казань, not {name:?}"
      ))
    })
  }
}

/// A physical pickup point. Immutable after creation except for `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPoint {
  pub pickup_point_id: Uuid,
  pub city:            City,
  pub registered_at:   DateTime<Utc>,
  /// Cleared by soft deactivation; an inactive point keeps its history but
  /// cannot open new sessions.
  pub active:          bool,
}
