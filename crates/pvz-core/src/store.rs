//! Storage traits and supporting query types.
//!
//! Traits are implemented by storage backends (e.g. `pvz-store-sqlite`).
//! Higher layers (`pvz-api`, `pvz-server`) depend on these abstractions, not
//! on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Classify, Error,
  access::Actor,
  account::{Account, NewAccount},
  pickup_point::{City, PickupPoint},
  product::{Product, ProductType},
  query::{Page, PickupPointFilter, TimeWindow},
  session::{IntakeSession, SessionStatus, SessionTarget},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`PickupStore::list_sessions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionQuery {
  pub status: Option<SessionStatus>,
  pub window: TimeWindow,
  /// `None` returns every matching session.
  pub page:   Option<Page>,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Shared by every store trait so a backend has exactly one error type.
///
/// The error must be classifiable and must be able to carry core errors, so
/// the service can raise denials and validation failures through it.
pub trait Backend: Send + Sync {
  type Error: std::error::Error + Classify + From<Error> + Send + Sync + 'static;
}

/// Catalog, intake workflow and read queries for pickup points.
///
/// Every workflow method must run its state checks and its mutation inside
/// one transaction scoped to the pickup point, using the rules in
/// [`crate::intake`]. Reads need no such boundary.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PickupStore: Backend {
  // ── Catalog ───────────────────────────────────────────────────────────

  /// Register a new, active pickup point.
  fn create_pickup_point(
    &self,
    city: City,
  ) -> impl Future<Output = Result<PickupPoint, Self::Error>> + Send + '_;

  /// Retrieve a pickup point by UUID. Returns `None` if not found.
  fn get_pickup_point(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PickupPoint>, Self::Error>> + Send + '_;

  /// Soft-deactivate a pickup point. Deactivating an inactive point is a
  /// no-op; an open session is left open so it can still be sealed.
  fn deactivate_pickup_point(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<PickupPoint, Self::Error>> + Send + '_;

  // ── Intake workflow ───────────────────────────────────────────────────

  /// Open a new session. Fails with a conflict if one is already open.
  fn open_session(
    &self,
    pickup_point_id: Uuid,
  ) -> impl Future<Output = Result<IntakeSession, Self::Error>> + Send + '_;

  /// Append a product, assigning the next sequence number.
  fn add_product(
    &self,
    target: SessionTarget,
    product_type: ProductType,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Delete and return the highest-sequence product of an open session.
  fn remove_last_product(
    &self,
    target: SessionTarget,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  /// Seal an open session and return it.
  fn close_session(
    &self,
    target: SessionTarget,
  ) -> impl Future<Output = Result<IntakeSession, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_session(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<IntakeSession>, Self::Error>> + Send + '_;

  fn list_pickup_points<'a>(
    &'a self,
    filter: &'a PickupPointFilter,
    page: Page,
  ) -> impl Future<Output = Result<Vec<PickupPoint>, Self::Error>> + Send + 'a;

  /// Sessions of one pickup point in opening order. Unknown pickup points
  /// are reported as not found rather than as an empty list.
  fn list_sessions(
    &self,
    pickup_point_id: Uuid,
    query: SessionQuery,
  ) -> impl Future<Output = Result<Vec<IntakeSession>, Self::Error>> + Send + '_;

  /// Products still present in a session, ordered by sequence.
  fn list_products(
    &self,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;
}

/// Accounts and issued bearer tokens.
pub trait AccountStore: Backend {
  /// Persist a new account. Fails if the email is already registered.
  fn register(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account, Self::Error>> + Send + '_;

  fn find_account<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Remember that the token with this digest authenticates `actor`.
  fn store_token(
    &self,
    digest: String,
    actor: Actor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn resolve_token<'a>(
    &'a self,
    digest: &'a str,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + 'a;
}
