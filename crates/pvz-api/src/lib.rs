//! JSON REST API for the PVZ intake service.
//!
//! Exposes an axum [`Router`] backed by a [`pvz_core::Service`] over any store
//! implementing both [`PickupStore`] and [`AccountStore`]. Every route except
//! the token-issuing ones requires `Authorization: Bearer <token>`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = pvz_api::api_router(Service::new(store, policy));
//! ```

pub mod accounts;
pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod pickup_points;
pub mod products;
pub mod receptions;

use axum::{
  Router,
  routing::{get, post},
};
use pvz_core::{
  Service,
  store::{AccountStore, PickupStore},
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub service: Service<S>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { service: self.service.clone() } }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Service<S>) -> Router<()>
where
  S: PickupStore + AccountStore + 'static,
{
  Router::new()
    // Tokens and accounts
    .route("/dummyLogin", post(accounts::dummy_login::<S>))
    .route("/register", post(accounts::register::<S>))
    .route("/login", post(accounts::login::<S>))
    // Pickup points
    .route("/pvz", get(pickup_points::overview::<S>).post(pickup_points::create::<S>))
    .route("/pvz/{id}", get(pickup_points::get_one::<S>))
    .route("/pvz/{id}/deactivate", post(pickup_points::deactivate::<S>))
    .route("/pvz/{id}/receptions", get(pickup_points::receptions::<S>))
    .route(
      "/pvz/{id}/close_last_reception",
      post(pickup_points::close_last_reception::<S>),
    )
    .route(
      "/pvz/{id}/delete_last_product",
      post(pickup_points::delete_last_product::<S>),
    )
    // Receptions
    .route("/receptions", post(receptions::open::<S>))
    .route("/receptions/{id}/close", post(receptions::close::<S>))
    .route(
      "/receptions/{id}/delete_last_product",
      post(receptions::delete_last_product::<S>),
    )
    .route("/receptions/{id}/products", get(receptions::products::<S>))
    // Products
    .route("/products", post(products::add::<S>))
    .with_state(AppState { service })
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use pvz_core::access::AccessPolicy;
  use pvz_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Service::new(Arc::new(store), AccessPolicy::default()))
  }

  async fn call(
    app:    &Router,
    method: &str,
    uri:    &str,
    token:  Option<&str>,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn token(app: &Router, role: &str) -> String {
    let (status, body) =
      call(app, "POST", "/dummyLogin", None, Some(json!({ "role": role }))).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
  }

  async fn create_pvz(app: &Router, moderator: &str) -> String {
    let (status, body) =
      call(app, "POST", "/pvz", Some(moderator), Some(json!({ "city": "Москва" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_token_is_401_with_bearer_challenge() {
    let app = app().await;
    let resp = app
      .clone()
      .oneshot(Request::builder().uri("/pvz").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");
  }

  #[tokio::test]
  async fn unknown_token_is_401() {
    let app = app().await;
    let (status, body) = call(&app, "GET", "/pvz", Some("made-up"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthenticated");
  }

  #[tokio::test]
  async fn dummy_login_rejects_unknown_role() {
    let app = app().await;
    let (status, body) =
      call(&app, "POST", "/dummyLogin", None, Some(json!({ "role": "admin" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
  }

  #[tokio::test]
  async fn register_then_login() {
    let app = app().await;
    let creds = json!({ "email": "Clerk@Example.com", "password": "s3cret", "role": "employee" });

    let (status, body) = call(&app, "POST", "/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "clerk@example.com");
    assert_eq!(body["role"], "employee");
    assert!(body.get("password").is_none());

    let (status, _) = call(&app, "POST", "/register", None, Some(creds)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let wrong = json!({ "email": "clerk@example.com", "password": "nope" });
    let (status, _) = call(&app, "POST", "/login", None, Some(wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let right = json!({ "email": "clerk@example.com", "password": "s3cret" });
    let (status, body) = call(&app, "POST", "/login", None, Some(right)).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, _) = call(&app, "GET", "/pvz", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  // ── Access policy ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn roles_are_enforced() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let moderator = token(&app, "moderator").await;

    let (status, body) =
      call(&app, "POST", "/pvz", Some(&employee), Some(json!({ "city": "Казань" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "forbidden");

    let pvz = create_pvz(&app, &moderator).await;
    let (status, _) =
      call(&app, "POST", "/receptions", Some(&moderator), Some(json!({ "pvzId": pvz }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
  }

  // ── Workflow ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn full_intake_over_http() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let moderator = token(&app, "moderator").await;
    let pvz = create_pvz(&app, &moderator).await;

    let (status, reception) =
      call(&app, "POST", "/receptions", Some(&employee), Some(json!({ "pvzId": pvz }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reception["status"], "in_progress");
    assert_eq!(reception["pvzId"], pvz.as_str());

    for (ty, seq) in [("электроника", 1), ("clothing", 2)] {
      let (status, product) = call(
        &app,
        "POST",
        "/products",
        Some(&employee),
        Some(json!({ "type": ty, "pvzId": pvz })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
      assert_eq!(product["sequence"], seq);
      assert_eq!(product["receptionId"], reception["id"]);
    }

    let uri = format!("/pvz/{pvz}/delete_last_product");
    let (status, removed) = call(&app, "POST", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["sequence"], 2);
    assert_eq!(removed["type"], "одежда");

    let uri = format!("/pvz/{pvz}/close_last_reception");
    let (status, closed) = call(&app, "POST", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "closed");
    assert!(closed["closedAt"].is_string());

    let (status, body) = call(
      &app,
      "POST",
      "/products",
      Some(&employee),
      Some(json!({ "type": "обувь", "pvzId": pvz })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");

    let (status, overview) = call(&app, "GET", "/pvz", Some(&moderator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview.as_array().unwrap().len(), 1);
    assert_eq!(overview[0]["pvz"]["city"], "Москва");
    let receptions = overview[0]["receptions"].as_array().unwrap();
    assert_eq!(receptions.len(), 1);
    assert_eq!(receptions[0]["products"].as_array().unwrap().len(), 1);

    let uri = format!("/receptions/{}/products", reception["id"].as_str().unwrap());
    let (status, products) = call(&app, "GET", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products[0]["type"], "электроника");
  }

  #[tokio::test]
  async fn second_reception_conflicts() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let pvz = create_pvz(&app, &token(&app, "moderator").await).await;

    let body = Some(json!({ "pvzId": pvz }));
    let (status, _) = call(&app, "POST", "/receptions", Some(&employee), body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = call(&app, "POST", "/receptions", Some(&employee), body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "conflict");
  }

  #[tokio::test]
  async fn empty_reception_delete_and_double_close() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let pvz = create_pvz(&app, &token(&app, "moderator").await).await;

    let (_, reception) =
      call(&app, "POST", "/receptions", Some(&employee), Some(json!({ "pvzId": pvz }))).await;
    let id = reception["id"].as_str().unwrap();

    let uri = format!("/receptions/{id}/delete_last_product");
    let (status, err) = call(&app, "POST", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "empty_state");

    let uri = format!("/receptions/{id}/close");
    let (status, _) = call(&app, "POST", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, err) = call(&app, "POST", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["kind"], "invalid_state");
  }

  // ── Validation and lookup ─────────────────────────────────────────────────

  #[tokio::test]
  async fn unsupported_city_is_400() {
    let app = app().await;
    let moderator = token(&app, "moderator").await;
    let (status, body) =
      call(&app, "POST", "/pvz", Some(&moderator), Some(json!({ "city": "Омск" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
  }

  #[tokio::test]
  async fn malformed_body_is_400() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let (status, body) =
      call(&app, "POST", "/receptions", Some(&employee), Some(json!({ "pvzId": "nope" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
  }

  #[tokio::test]
  async fn page_limit_out_of_range_is_400() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let (status, _) = call(&app, "GET", "/pvz?limit=31", Some(&employee), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, "GET", "/pvz?page=0", Some(&employee), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn inverted_window_is_400() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let uri = "/pvz?startDate=2025-01-02T00:00:00Z&endDate=2025-01-01T00:00:00Z";
    let (status, body) = call(&app, "GET", uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");
  }

  #[tokio::test]
  async fn naive_window_is_read_as_utc() {
    let app = app().await;
    let moderator = token(&app, "moderator").await;
    let employee = token(&app, "employee").await;
    let pvz = create_pvz(&app, &moderator).await;
    let (status, _) =
      call(&app, "POST", "/receptions", Some(&employee), Some(json!({ "pvzId": pvz }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = "/pvz?startDate=2000-01-01T00:00:00.123456&endDate=2100-01-01T00:00:00.123456";
    let (status, body) = call(&app, "GET", uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body[0]["pvz"]["id"], pvz);
    assert_eq!(body[0]["receptions"].as_array().unwrap().len(), 1);

    let uri = format!("/pvz/{pvz}/receptions?startDate=2000-01-01T00:00:00&endDate=2000-01-02T00:00:00");
    let (status, body) = call(&app, "GET", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = call(&app, "GET", "/pvz?startDate=tomorrow", Some(&employee), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn unknown_pvz_is_404() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = call(&app, "GET", &format!("/pvz/{missing}"), Some(&employee), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/pvz/{missing}/receptions");
    let (status, _) = call(&app, "GET", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) =
      call(&app, "POST", "/receptions", Some(&employee), Some(json!({ "pvzId": missing }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
  }

  #[tokio::test]
  async fn deactivated_pvz_is_hidden_and_closed_for_intake() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let moderator = token(&app, "moderator").await;
    let pvz = create_pvz(&app, &moderator).await;

    let uri = format!("/pvz/{pvz}/deactivate");
    let (status, _) = call(&app, "POST", &uri, Some(&employee), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call(&app, "POST", &uri, Some(&moderator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    let (_, overview) = call(&app, "GET", "/pvz", Some(&employee), None).await;
    assert!(overview.as_array().unwrap().is_empty());
    let (_, overview) = call(&app, "GET", "/pvz?includeInactive=true", Some(&employee), None).await;
    assert_eq!(overview.as_array().unwrap().len(), 1);

    let (status, body) =
      call(&app, "POST", "/receptions", Some(&employee), Some(json!({ "pvzId": pvz }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "invalid_state");
  }

  #[tokio::test]
  async fn receptions_filter_by_status() {
    let app = app().await;
    let employee = token(&app, "employee").await;
    let pvz = create_pvz(&app, &token(&app, "moderator").await).await;

    let body = Some(json!({ "pvzId": pvz }));
    call(&app, "POST", "/receptions", Some(&employee), body.clone()).await;
    call(&app, "POST", &format!("/pvz/{pvz}/close_last_reception"), Some(&employee), None).await;
    call(&app, "POST", "/receptions", Some(&employee), body).await;

    let uri = format!("/pvz/{pvz}/receptions");
    let (_, all) = call(&app, "GET", &uri, Some(&employee), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, open) = call(&app, "GET", &format!("{uri}?status=in_progress"), Some(&employee), None).await;
    let open = open.as_array().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["status"], "in_progress");
  }
}
