//! [`Service`]: authorizes each request, then dispatches it to the store.
//!
//! Authorization always happens before any input parsing or store access, so
//! a denied request has no side effects.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error,
  access::{AccessPolicy, Actor, Operation},
  pickup_point::{City, PickupPoint},
  product::{Product, ProductType},
  query::{Page, PickupPointFilter, PickupPointOverview, SessionView, TimeWindow},
  session::{IntakeSession, SessionTarget},
  store::{PickupStore, SessionQuery},
};

/// Entry point for every transport. Cloning is cheap.
pub struct Service<S> {
  store:  Arc<S>,
  policy: Arc<AccessPolicy>,
}

impl<S> Clone for Service<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: Arc::clone(&self.policy) }
  }
}

impl<S> Service<S> {
  pub fn new(store: Arc<S>, policy: AccessPolicy) -> Self {
    Self { store, policy: Arc::new(policy) }
  }

  pub fn store(&self) -> &S { &self.store }
}

impl<S: PickupStore> Service<S> {
  fn require(&self, actor: &Actor, operation: Operation) -> Result<(), S::Error> {
    self.policy.require(actor, operation).inspect_err(|_| {
      tracing::warn!(actor = %actor.actor_id, role = %actor.role, %operation, "access denied");
    })?;
    Ok(())
  }

  // ── Catalog ───────────────────────────────────────────────────────────────

  pub async fn create_pickup_point(
    &self,
    actor: &Actor,
    city: &str,
  ) -> Result<PickupPoint, S::Error> {
    self.require(actor, Operation::CreatePickupPoint)?;
    let city = City::parse(city)?;
    let point = self.store.create_pickup_point(city).await?;
    tracing::info!(pickup_point = %point.pickup_point_id, %city, "pickup point registered");
    Ok(point)
  }

  pub async fn deactivate_pickup_point(
    &self,
    actor: &Actor,
    id: Uuid,
  ) -> Result<PickupPoint, S::Error> {
    self.require(actor, Operation::DeactivatePickupPoint)?;
    let point = self.store.deactivate_pickup_point(id).await?;
    tracing::info!(pickup_point = %id, "pickup point deactivated");
    Ok(point)
  }

  pub async fn get_pickup_point(
    &self,
    actor: &Actor,
    id: Uuid,
  ) -> Result<PickupPoint, S::Error> {
    self.require(actor, Operation::ListPickupPoints)?;
    self
      .store
      .get_pickup_point(id)
      .await?
      .ok_or_else(|| Error::PickupPointNotFound(id).into())
  }

  // ── Intake workflow ───────────────────────────────────────────────────────

  pub async fn open_session(
    &self,
    actor: &Actor,
    pickup_point_id: Uuid,
  ) -> Result<IntakeSession, S::Error> {
    self.require(actor, Operation::OpenSession)?;
    let session = self.store.open_session(pickup_point_id).await?;
    tracing::info!(
      pickup_point = %pickup_point_id,
      session = %session.session_id,
      "intake session opened"
    );
    Ok(session)
  }

  pub async fn add_product(
    &self,
    actor: &Actor,
    target: SessionTarget,
    product_type: &str,
  ) -> Result<Product, S::Error> {
    self.require(actor, Operation::AddProduct)?;
    let product_type = ProductType::parse(product_type)?;
    let product = self.store.add_product(target, product_type).await?;
    tracing::debug!(
      session = %product.session_id,
      sequence = product.sequence,
      %product_type,
      "product added"
    );
    Ok(product)
  }

  pub async fn remove_last_product(
    &self,
    actor: &Actor,
    target: SessionTarget,
  ) -> Result<Product, S::Error> {
    self.require(actor, Operation::RemoveLastProduct)?;
    let product = self.store.remove_last_product(target).await?;
    tracing::debug!(
      session = %product.session_id,
      sequence = product.sequence,
      "product removed"
    );
    Ok(product)
  }

  pub async fn close_session(
    &self,
    actor: &Actor,
    target: SessionTarget,
  ) -> Result<IntakeSession, S::Error> {
    self.require(actor, Operation::CloseSession)?;
    let session = self.store.close_session(target).await?;
    tracing::info!(
      pickup_point = %session.pickup_point_id,
      session = %session.session_id,
      "intake session closed"
    );
    Ok(session)
  }

  // ── Query facade ──────────────────────────────────────────────────────────

  pub async fn list_pickup_points(
    &self,
    actor: &Actor,
    filter: &PickupPointFilter,
    page: Page,
  ) -> Result<Vec<PickupPoint>, S::Error> {
    self.require(actor, Operation::ListPickupPoints)?;
    self.store.list_pickup_points(filter, page).await
  }

  pub async fn list_sessions(
    &self,
    actor: &Actor,
    pickup_point_id: Uuid,
    query: SessionQuery,
  ) -> Result<Vec<IntakeSession>, S::Error> {
    self.require(actor, Operation::ListSessions)?;
    self.store.list_sessions(pickup_point_id, query).await
  }

  pub async fn list_products(
    &self,
    actor: &Actor,
    session_id: Uuid,
  ) -> Result<Vec<Product>, S::Error> {
    self.require(actor, Operation::ListProducts)?;
    self.store.list_products(session_id).await
  }

  /// Pickup points with their sessions (restricted to `window`) and each
  /// session's products.
  ///
  /// Composed from independent reads, so a concurrent writer may be observed
  /// half-way.
  pub async fn overview(
    &self,
    actor: &Actor,
    filter: &PickupPointFilter,
    window: TimeWindow,
    page: Page,
  ) -> Result<Vec<PickupPointOverview>, S::Error> {
    self.require(actor, Operation::ListPickupPoints)?;
    self.require(actor, Operation::ListSessions)?;
    self.require(actor, Operation::ListProducts)?;

    let points = self.store.list_pickup_points(filter, page).await?;
    let mut out = Vec::with_capacity(points.len());
    for pickup_point in points {
      let query = SessionQuery { window, ..SessionQuery::default() };
      let sessions = self
        .store
        .list_sessions(pickup_point.pickup_point_id, query)
        .await?;

      let mut views = Vec::with_capacity(sessions.len());
      for session in sessions {
        let products = self.store.list_products(session.session_id).await?;
        views.push(SessionView { session, products });
      }
      out.push(PickupPointOverview { pickup_point, sessions: views });
    }
    Ok(out)
  }
}
