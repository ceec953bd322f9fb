//! Wire types.
//!
//! Field names follow the established camelCase wire format (`pvzId`,
//! `receptionId`, `dateTime`, `registrationDate`). Core types are converted
//! here and nowhere else.

use chrono::{DateTime, NaiveDateTime, Utc};
use pvz_core::{
  access::Role,
  account::Account,
  pickup_point::{City, PickupPoint},
  product::{Product, ProductType},
  query::{PickupPointOverview, SessionView},
  session::{IntakeSession, SessionStatus},
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DummyLoginBody {
  pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub email:    String,
  pub password: String,
  pub role:     String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePvzBody {
  pub city: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceptionBody {
  pub pvz_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
  #[serde(rename = "type")]
  pub product_type: String,
  pub pvz_id:       Uuid,
}

/// `GET /pvz` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewParams {
  #[serde(default, deserialize_with = "timestamp")]
  pub start_date:       Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "timestamp")]
  pub end_date:         Option<DateTime<Utc>>,
  pub page:             Option<u32>,
  pub limit:            Option<u32>,
  pub city:             Option<String>,
  #[serde(default)]
  pub include_inactive: bool,
}

/// `GET /pvz/{id}/receptions` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionParams {
  pub status:     Option<SessionStatus>,
  #[serde(default, deserialize_with = "timestamp")]
  pub start_date: Option<DateTime<Utc>>,
  #[serde(default, deserialize_with = "timestamp")]
  pub end_date:   Option<DateTime<Utc>>,
  pub page:       Option<u32>,
  pub limit:      Option<u32>,
}

/// RFC 3339, or an ISO timestamp without an offset, read as UTC.
fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
  let Some(raw) = Option::<String>::deserialize(d)? else {
    return Ok(None);
  };
  if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
    return Ok(Some(at.with_timezone(&Utc)));
  }
  raw
    .parse::<NaiveDateTime>()
    .map(|naive| Some(naive.and_utc()))
    .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TokenDto {
  pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AccountDto {
  pub id:    Uuid,
  pub email: String,
  pub role:  Role,
}

impl From<Account> for AccountDto {
  fn from(a: Account) -> Self {
    Self { id: a.account_id, email: a.email, role: a.role }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PvzDto {
  pub id:                Uuid,
  pub registration_date: DateTime<Utc>,
  pub city:              City,
  pub active:            bool,
}

impl From<PickupPoint> for PvzDto {
  fn from(p: PickupPoint) -> Self {
    Self {
      id:                p.pickup_point_id,
      registration_date: p.registered_at,
      city:              p.city,
      active:            p.active,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionDto {
  pub id:        Uuid,
  pub date_time: DateTime<Utc>,
  pub pvz_id:    Uuid,
  pub status:    SessionStatus,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub closed_at: Option<DateTime<Utc>>,
}

impl From<IntakeSession> for ReceptionDto {
  fn from(s: IntakeSession) -> Self {
    Self {
      id:        s.session_id,
      date_time: s.opened_at,
      pvz_id:    s.pickup_point_id,
      status:    s.status,
      closed_at: s.closed_at,
    }
  }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
  pub id:           Uuid,
  pub date_time:    DateTime<Utc>,
  #[serde(rename = "type")]
  pub product_type: &'static str,
  pub reception_id: Uuid,
  pub sequence:     u32,
}

/// Product types go out under their Russian wire names.
fn wire_name(t: ProductType) -> &'static str {
  match t {
    ProductType::Electronics => "электроника",
    ProductType::Clothing => "одежда",
    ProductType::Footwear => "обувь",
  }
}

impl From<Product> for ProductDto {
  fn from(p: Product) -> Self {
    Self {
      id:           p.product_id,
      date_time:    p.added_at,
      product_type: wire_name(p.product_type),
      reception_id: p.session_id,
      sequence:     p.sequence,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ReceptionWithProducts {
  pub reception: ReceptionDto,
  pub products:  Vec<ProductDto>,
}

impl From<SessionView> for ReceptionWithProducts {
  fn from(v: SessionView) -> Self {
    Self {
      reception: v.session.into(),
      products:  v.products.into_iter().map(Into::into).collect(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PvzOverviewDto {
  pub pvz:        PvzDto,
  pub receptions: Vec<ReceptionWithProducts>,
}

impl From<PickupPointOverview> for PvzOverviewDto {
  fn from(o: PickupPointOverview) -> Self {
    Self {
      pvz:        o.pickup_point.into(),
      receptions: o.sessions.into_iter().map(Into::into).collect(),
    }
  }
}
