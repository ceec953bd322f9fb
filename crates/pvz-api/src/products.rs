//! Handler for `POST /products`.
//!
//! Body: `{"type":"электроника","pvzId":"…"}`. The product lands in whichever
//! reception is open at that pickup point; 409 if none is.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use pvz_core::{
  session::SessionTarget,
  store::{AccountStore, PickupStore},
};

use crate::{
  AppState,
  auth::CurrentActor,
  dto::{CreateProductBody, ProductDto},
  error::ApiError,
  extract::ApiJson,
};

/// `POST /products`
pub async fn add<S>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  ApiJson(body): ApiJson<CreateProductBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PickupStore + AccountStore + 'static,
{
  let product = state
    .service
    .add_product(&actor, SessionTarget::OpenAt(body.pvz_id), &body.product_type)
    .await
    .map_err(ApiError::service)?;
  Ok((StatusCode::CREATED, Json(ProductDto::from(product))))
}
