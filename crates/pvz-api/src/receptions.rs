//! Handlers for `/receptions` endpoints (intake sessions on the wire).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/receptions` | Body: `{"pvzId":"…"}`; 201, 409 if one is open |
//! | `POST` | `/receptions/{id}/close` | 409 if already closed |
//! | `POST` | `/receptions/{id}/delete_last_product` | 409 if closed or empty |
//! | `GET`  | `/receptions/{id}/products` | In sequence order |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pvz_core::{
  session::SessionTarget,
  store::{AccountStore, PickupStore},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::CurrentActor,
  dto::{CreateReceptionBody, ProductDto, ReceptionDto},
  error::ApiError,
  extract::ApiJson,
};

/// `POST /receptions`
pub async fn open<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  ApiJson(body): ApiJson<CreateReceptionBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let session = state
    .service
    .open_session(&actor, body.pvz_id)
    .await
    .map_err(ApiError::service)?;
  Ok((StatusCode::CREATED, Json(ReceptionDto::from(session))))
}

/// `POST /receptions/{id}/close`
pub async fn close<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<ReceptionDto>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let session = state
    .service
    .close_session(&actor, SessionTarget::Id(id))
    .await
    .map_err(ApiError::service)?;
  Ok(Json(session.into()))
}

/// `POST /receptions/{id}/delete_last_product`
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
    .remove_last_product(&actor, SessionTarget::Id(id))
    .await
    .map_err(ApiError::service)?;
  Ok(Json(product.into()))
}

/// `GET /receptions/{id}/products`
pub async fn products<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProductDto>>, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let products = state
    .service
    .list_products(&actor, id)
    .await
    .map_err(ApiError::service)?;
  Ok(Json(products.into_iter().map(Into::into).collect()))
}
