//! Bearer-token extractor, token issuance and password hashing.
//!
//! Tokens are 32 random bytes, URL-safe base64 encoded. Only their SHA-256
//! digest is persisted, so a leaked database does not leak live tokens.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use pvz_core::{access::Actor, store::AccountStore};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};

use crate::{AppState, error::ApiError};

const TOKEN_BYTES: usize = 32;

/// The authenticated caller of the current request.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<AppState<S>> for CurrentActor
where
  S: AccountStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(parts).ok_or(ApiError::Unauthorized("missing bearer token"))?;

    let actor = state
      .service
      .store()
      .resolve_token(&token_digest(token))
      .await
      .map_err(ApiError::service)?
      .ok_or(ApiError::Unauthorized("unknown or revoked token"))?;

    Ok(CurrentActor(actor))
  }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
  let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let token = value.strip_prefix("Bearer ")?.trim();
  (!token.is_empty()).then_some(token)
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A fresh random bearer token.
pub fn issue_token() -> String {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex SHA-256 of a token; the form tokens are stored and looked up in.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issue a token for `actor` and remember its digest.
pub async fn grant_token<S: AccountStore>(store: &S, actor: Actor) -> Result<String, ApiError> {
  let token = issue_token();
  store
    .store_token(token_digest(&token), actor)
    .await
    .map_err(ApiError::service)?;
  Ok(token)
}

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Service {
      kind:   pvz_core::ErrorKind::Internal,
      source: format!("argon2 error: {e}").into(),
    })
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
    .is_ok()
}
