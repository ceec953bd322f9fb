//! Products: the entries of the append-only ledger.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::Error;

/// Product category. Russian names from the established wire format are accepted
/// as input aliases; the canonical form is English.
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
#[serde(rename_all = "lowercase")]
pub enum ProductType {
  #[serde(alias = "электроника")]
  #[strum(to_string = "electronics", serialize = "электроника")]
  Electronics,
  #[serde(alias = "одежда")]
  #[strum(to_string = "clothing", serialize = "одежда")]
  Clothing,
  #[serde(alias = "обувь")]
  #[strum(to_string = "footwear", serialize = "обувь")]
  Footwear,
}

impl ProductType {
  /// Case-insensitive in both scripts.
  pub fn parse(name: &str) -> Result<Self, Error> {
    ProductType::from_str(&name.trim().to_lowercase())
      .map_err(|_| Error::Validation(format!("unknown product type: {name:?}")))
  }
}

/// A single accepted item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub product_id:   Uuid,
  pub session_id:   Uuid,
  pub product_type: ProductType,
  /// Position within the session, starting at 1. Never reused, even after
  /// the product holding it is removed.
  pub sequence:     u32,
  pub added_at:     DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn parses_english_and_russian_names() {
    assert_eq!(ProductType::parse("electronics").unwrap(), ProductType::Electronics);
    assert_eq!(ProductType::parse("Clothing").unwrap(), ProductType::Clothing);
    assert_eq!(ProductType::parse("обувь").unwrap(), ProductType::Footwear);
    assert_eq!(ProductType::parse("электроника").unwrap(), ProductType::Electronics);
  }

  #[test]
  fn russian_names_ignore_case() {
    assert_eq!(ProductType::parse("Электроника").unwrap(), ProductType::Electronics);
    assert_eq!(ProductType::parse("ОБУВЬ").unwrap(), ProductType::Footwear);
    assert_eq!(ProductType::parse(" Одежда ").unwrap(), ProductType::Clothing);
    assert_eq!(ProductType::parse("FOOTWEAR").unwrap(), ProductType::Footwear);
  }

  #[test]
  fn display_round_trips() {
    for t in ProductType::iter() {
      assert_eq!(ProductType::parse(&t.to_string()).unwrap(), t);
    }
  }

  #[test]
  fn unknown_type_is_validation_error() {
    assert!(matches!(ProductType::parse("furniture"), Err(Error::Validation(_))));
    assert!(matches!(ProductType::parse(""), Err(Error::Validation(_))));
  }
}
