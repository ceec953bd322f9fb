//! Handlers for token issuance and accounts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/dummyLogin` | Body: `{"role":"employee"}`; token for a throwaway actor |
//! | `POST` | `/register` | Body: `{"email","password","role"}`; 201 |
//! | `POST` | `/login` | Body: `{"email","password"}`; 401 on bad credentials |

use std::str::FromStr as _;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use pvz_core::{
  access::{Actor, Role},
  account::{NewAccount, normalize_email},
  store::AccountStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{grant_token, hash_password, verify_password},
  dto::{AccountDto, DummyLoginBody, LoginBody, RegisterBody, TokenDto},
  error::ApiError,
  extract::ApiJson,
};

fn parse_role(role: &str) -> Result<Role, ApiError> {
  Role::from_str(role.trim())
    .map_err(|_| ApiError::BadRequest(format!("unknown role: {role:?}")))
}

// ─── Dummy login ─────────────────────────────────────────────────────────────

/// `POST /dummyLogin`
pub async fn dummy_login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<DummyLoginBody>,
) -> Result<Json<TokenDto>, ApiError>
where
  S: AccountStore + 'static,
{
  let role = parse_role(&body.role)?;
  let actor = Actor { actor_id: Uuid::new_v4(), role };
  let token = grant_token(state.service.store(), actor).await?;
  tracing::info!(actor = %actor.actor_id, %role, "dummy token issued");
  Ok(Json(TokenDto { token }))
}

// ─── Register ────────────────────────────────────────────────────────────────

/// `POST /register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AccountStore + 'static,
{
  let role = parse_role(&body.role)?;
  let email = normalize_email(&body.email).map_err(ApiError::service)?;
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".into()));
  }

  let account = state
    .service
    .store()
    .register(NewAccount { email, password_hash: hash_password(&body.password)?, role })
    .await
    .map_err(ApiError::service)?;

  tracing::info!(account = %account.account_id, %role, "account registered");
  Ok((StatusCode::CREATED, Json(AccountDto::from(account))))
}

// ─── Login ───────────────────────────────────────────────────────────────────

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<Json<TokenDto>, ApiError>
where
  S: AccountStore + 'static,
{
  let invalid = ApiError::Unauthorized("invalid credentials");
  let Ok(email) = normalize_email(&body.email) else {
    return Err(invalid);
  };

  let store = state.service.store();
  let account = store
    .find_account(&email)
    .await
    .map_err(ApiError::service)?
    .filter(|a| verify_password(&body.password, &a.password_hash))
    .ok_or(invalid)?;

  let token = grant_token(store, account.actor()).await?;
  tracing::debug!(account = %account.account_id, "login succeeded");
  Ok(Json(TokenDto { token }))
}
