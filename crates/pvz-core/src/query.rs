//! Read-side query types.
//!
//! Results are ordered by creation time (ties broken by id), so repeated
//! queries against unchanged data return the same pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  pickup_point::{City, PickupPoint},
  product::Product,
  session::IntakeSession,
};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 30;

/// One-based offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  page:  u32,
  limit: u32,
}

impl Default for Page {
  fn default() -> Self { Self { page: 1, limit: DEFAULT_PAGE_LIMIT } }
}

impl Page {
  /// `page` must be at least 1 and `limit` within `1..=MAX_PAGE_LIMIT`.
  pub fn new(page: u32, limit: u32) -> Result<Self> {
    if page == 0 {
      return Err(Error::Validation("page must be at least 1".into()));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
      return Err(Error::Validation(format!(
        "limit must be between 1 and {MAX_PAGE_LIMIT}"
      )));
    }
    Ok(Self { page, limit })
  }

  pub fn from_params(page: Option<u32>, limit: Option<u32>) -> Result<Self> {
    Self::new(page.unwrap_or(1), limit.unwrap_or(DEFAULT_PAGE_LIMIT))
  }

  pub fn limit(&self) -> u32 { self.limit }

  pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }
}

/// Parameters for listing pickup points.
#[derive(Debug, Clone, Default)]
pub struct PickupPointFilter {
  pub city:             Option<City>,
  /// Include soft-deactivated points. Default `false`.
  pub include_inactive: bool,
}

/// Inclusive bounds on a session's `opened_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
  pub start: Option<DateTime<Utc>>,
  pub end:   Option<DateTime<Utc>>,
}

impl TimeWindow {
  pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<Self> {
    if let (Some(s), Some(e)) = (start, end)
      && s > e
    {
      return Err(Error::Validation("start date is after end date".into()));
    }
    Ok(Self { start, end })
  }
}

// ─── Composed views ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
  pub session:  IntakeSession,
  /// Products currently in the session, ordered by sequence.
  pub products: Vec<Product>,
}

/// A pickup point with its session history, computed on read, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupPointOverview {
  pub pickup_point: PickupPoint,
  pub sessions:     Vec<SessionView>,
}
