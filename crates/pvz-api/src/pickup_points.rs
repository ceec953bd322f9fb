//! Handlers for `/pvz` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/pvz` | Body: `{"city":"Москва"}`; moderators only |
//! | `GET`  | `/pvz` | `?startDate&endDate&page&limit&city&includeInactive` |
//! | `GET`  | `/pvz/{id}` | 404 if not found |
//! | `POST` | `/pvz/{id}/deactivate` | Soft delete |
//! | `GET`  | `/pvz/{id}/receptions` | `?status&startDate&endDate&page&limit` |
//! | `POST` | `/pvz/{id}/close_last_reception` | Closes the open reception |
//! | `POST` | `/pvz/{id}/delete_last_product` | From the open reception |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pvz_core::{
  pickup_point::City,
  query::{Page, PickupPointFilter, TimeWindow},
  session::SessionTarget,
  store::{AccountStore, PickupStore, SessionQuery},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::CurrentActor,
  dto::{CreatePvzBody, OverviewParams, ProductDto, PvzDto, PvzOverviewDto, ReceptionDto, ReceptionParams},
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /pvz`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  ApiJson(body): ApiJson<CreatePvzBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let point = state
    .service
    .create_pickup_point(&actor, &body.city)
    .await
    .map_err(ApiError::service)?;
  Ok((StatusCode::CREATED, Json(PvzDto::from(point))))
}

// ─── Overview ────────────────────────────────────────────────────────────────

/// `GET /pvz`: each pickup point with its receptions in the time window and
/// their products.
pub async fn overview<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  ApiQuery(params): ApiQuery<OverviewParams>,
) -> Result<Json<Vec<PvzOverviewDto>>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let page = Page::from_params(params.page, params.limit).map_err(ApiError::service)?;
  let window = TimeWindow::new(params.start_date, params.end_date).map_err(ApiError::service)?;
  let city = params
    .city
    .as_deref()
    .map(City::parse)
    .transpose()
    .map_err(ApiError::service)?;
  let filter = PickupPointFilter { city, include_inactive: params.include_inactive };

  let overview = state
    .service
    .overview(&actor, &filter, window, page)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(overview.into_iter().map(Into::into).collect()))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /pvz/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<PvzDto>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let point = state
    .service
    .get_pickup_point(&actor, id)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(point.into()))
}

// ─── Deactivate ──────────────────────────────────────────────────────────────

/// `POST /pvz/{id}/deactivate`
pub async fn deactivate<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<PvzDto>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let point = state
    .service
    .deactivate_pickup_point(&actor, id)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(point.into()))
}

// ─── Receptions of a point ───────────────────────────────────────────────────

/// `GET /pvz/{id}/receptions`
pub async fn receptions<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
  ApiQuery(params): ApiQuery<ReceptionParams>,
) -> Result<Json<Vec<ReceptionDto>>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let query = SessionQuery {
    status: params.status,
    window: TimeWindow::new(params.start_date, params.end_date).map_err(ApiError::service)?,
    page:   Some(Page::from_params(params.page, params.limit).map_err(ApiError::service)?),
  };

  let sessions = state
    .service
    .list_sessions(&actor, id, query)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

// ─── Open-session shortcuts ──────────────────────────────────────────────────

/// `POST /pvz/{id}/close_last_reception`
pub async fn close_last_reception<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<ReceptionDto>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let session = state
    .service
    .close_session(&actor, SessionTarget::OpenAt(id))
    .await
    .map_err(ApiError::service)?;
  Ok(Json(session.into()))
}

/// `POST /pvz/{id}/delete_last_product`
pub async fn delete_last_product<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<ProductDto>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let product = state
    .service
    .remove_last_product(&actor, SessionTarget::OpenAt(id))
    .await
    .map_err(ApiError::service)?;
  Ok(Json(product.into()))
}
