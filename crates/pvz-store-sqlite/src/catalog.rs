//! Row-level access to the `pickup_points` table.

use chrono::{DateTime, Utc};
use pvz_core::{
  pickup_point::{City, PickupPoint},
  query::{Page, PickupPointFilter},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{PICKUP_POINT_COLUMNS, RawPickupPoint, encode_city, encode_dt, encode_uuid},
};

pub fn insert(conn: &Connection, city: City, at: DateTime<Utc>) -> Result<PickupPoint> {
  let point = PickupPoint {
    pickup_point_id: Uuid::new_v4(),
    city,
    registered_at: at,
    active: true,
  };
  conn.execute(
    "INSERT INTO pickup_points (pickup_point_id, city, registered_at, active)
     VALUES (?1, ?2, ?3, 1)",
    params![encode_uuid(point.pickup_point_id), encode_city(city), encode_dt(at)],
  )?;
  Ok(point)
}

pub fn find(conn: &Connection, id: Uuid) -> Result<Option<PickupPoint>> {
  conn
    .query_row(
      &format!("SELECT {PICKUP_POINT_COLUMNS} FROM pickup_points WHERE pickup_point_id = ?1"),
      params![encode_uuid(id)],
      RawPickupPoint::from_row,
    )
    .optional()?
    .map(RawPickupPoint::into_pickup_point)
    .transpose()
}

/// Like [`find`], but a missing point is an error.
pub fn load(conn: &Connection, id: Uuid) -> Result<PickupPoint> {
  find(conn, id)?.ok_or_else(|| pvz_core::Error::PickupPointNotFound(id).into())
}

pub fn deactivate(conn: &Connection, id: Uuid) -> Result<PickupPoint> {
  let mut point = load(conn, id)?;
  conn.execute(
    "UPDATE pickup_points SET active = 0 WHERE pickup_point_id = ?1",
    params![encode_uuid(id)],
  )?;
  point.active = false;
  Ok(point)
}

pub fn list(conn: &Connection, filter: &PickupPointFilter, page: Page) -> Result<Vec<PickupPoint>> {
  let city = filter.city.map(encode_city);

  let mut stmt = conn.prepare_cached(&format!(
    "SELECT {PICKUP_POINT_COLUMNS} FROM pickup_points
     WHERE (?1 IS NULL OR city = ?1)
       AND (?2 OR active = 1)
     ORDER BY registered_at, pickup_point_id
     LIMIT ?3 OFFSET ?4"
  ))?;
  let raws = stmt
    .query_map(
      params![
        city,
        filter.include_inactive,
        i64::from(page.limit()),
        i64::try_from(page.offset()).unwrap_or(i64::MAX),
      ],
      RawPickupPoint::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawPickupPoint::into_pickup_point).collect()
}
