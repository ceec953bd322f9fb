//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use pvz_core::{Classify, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Malformed request: bad JSON, bad query string, unknown enum value.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  /// Anything raised by the service or the store, already classified.
  #[error("{source}")]
  Service {
    kind:   ErrorKind,
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Wrap a classifiable service/store error.
  pub fn service<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    ApiError::Service { kind: e.kind(), source: Box::new(e) }
  }
}

impl Classify for ApiError {
  fn kind(&self) -> ErrorKind {
    match self {
      ApiError::BadRequest(_) => ErrorKind::Validation,
      ApiError::Unauthorized(_) => ErrorKind::Unauthenticated,
      ApiError::Service { kind, .. } => *kind,
    }
  }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::Validation => StatusCode::BAD_REQUEST,
    ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
    ErrorKind::Forbidden => StatusCode::FORBIDDEN,
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::Conflict | ErrorKind::InvalidState | ErrorKind::EmptyState => {
      StatusCode::CONFLICT
    }
    ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let kind = self.kind();
    let status = status_for(kind);
    if kind == ErrorKind::Internal {
      tracing::error!(error = %self, "request failed");
    }

    let body = Json(json!({ "error": self.to_string(), "kind": kind }));
    let mut res = (status, body).into_response();
    if kind == ErrorKind::Unauthenticated {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}
