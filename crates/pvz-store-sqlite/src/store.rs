//! [`SqliteStore`]: the SQLite implementation of the `pvz-core` store traits.

use std::{path::Path, time::Duration};

use pvz_core::{
  access::Actor,
  account::{Account, NewAccount},
  pickup_point::{City, PickupPoint},
  product::{Product, ProductType},
  query::{Page, PickupPointFilter},
  session::{IntakeSession, SessionTarget},
  store::{AccountStore, Backend, PickupStore, SessionQuery},
};
use uuid::Uuid;

use crate::{
  Error, Result, accounts, catalog, encode::now, queries, schema::SCHEMA, workflow,
};

/// How long a transaction waits for the write lock before giving up with
/// a conflict.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PVZ store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema(busy_timeout).await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(DEFAULT_BUSY_TIMEOUT).await?;
    Ok(store)
  }

  async fn init_schema(&self, busy_timeout: Duration) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PickupStore impl ────────────────────────────────────────────────────────

impl Backend for SqliteStore {
  type Error = Error;
}

impl PickupStore for SqliteStore {
  // ── Catalog ───────────────────────────────────────────────────────────────

  async fn create_pickup_point(&self, city: City) -> Result<PickupPoint> {
    self
      .conn
      .call(move |conn| Ok(catalog::insert(conn, city, now())))
      .await?
  }

  async fn get_pickup_point(&self, id: Uuid) -> Result<Option<PickupPoint>> {
    self.conn.call(move |conn| Ok(catalog::find(conn, id))).await?
  }

  async fn deactivate_pickup_point(&self, id: Uuid) -> Result<PickupPoint> {
    self
      .conn
      .call(move |conn| Ok(catalog::deactivate(conn, id)))
      .await?
  }

  // ── Intake workflow ───────────────────────────────────────────────────────

  async fn open_session(&self, pickup_point_id: Uuid) -> Result<IntakeSession> {
    self
      .conn
      .call(move |conn| Ok(workflow::open_session(conn, pickup_point_id, now())))
      .await?
  }

  async fn add_product(
    &self,
    target:       SessionTarget,
    product_type: ProductType,
  ) -> Result<Product> {
    self
      .conn
      .call(move |conn| Ok(workflow::add_product(conn, target, product_type, now())))
      .await?
  }

  async fn remove_last_product(&self, target: SessionTarget) -> Result<Product> {
    self
      .conn
      .call(move |conn| Ok(workflow::remove_last_product(conn, target)))
      .await?
  }

  async fn close_session(&self, target: SessionTarget) -> Result<IntakeSession> {
    self
      .conn
      .call(move |conn| Ok(workflow::close_session(conn, target, now())))
      .await?
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_session(&self, id: Uuid) -> Result<Option<IntakeSession>> {
    self
      .conn
      .call(move |conn| Ok(workflow::find_session(conn, id)))
      .await?
  }

  async fn list_pickup_points(
    &self,
    filter: &PickupPointFilter,
    page:   Page,
  ) -> Result<Vec<PickupPoint>> {
    let filter = filter.clone();
    self
      .conn
      .call(move |conn| Ok(catalog::list(conn, &filter, page)))
      .await?
  }

  async fn list_sessions(
    &self,
    pickup_point_id: Uuid,
    query:           SessionQuery,
  ) -> Result<Vec<IntakeSession>> {
    self
      .conn
      .call(move |conn| Ok(queries::list_sessions(conn, pickup_point_id, query)))
      .await?
  }

  async fn list_products(&self, session_id: Uuid) -> Result<Vec<Product>> {
    self
      .conn
      .call(move |conn| Ok(queries::list_products(conn, session_id)))
      .await?
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  async fn register(&self, input: NewAccount) -> Result<Account> {
    self
      .conn
      .call(move |conn| Ok(accounts::insert(conn, input, now())))
      .await?
  }

  async fn find_account(&self, email: &str) -> Result<Option<Account>> {
    let email = email.to_owned();
    self
      .conn
      .call(move |conn| Ok(accounts::find_by_email(conn, &email)))
      .await?
  }

  async fn store_token(&self, digest: String, actor: Actor) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(accounts::insert_token(conn, &digest, actor, now())))
      .await?
  }

  async fn resolve_token(&self, digest: &str) -> Result<Option<Actor>> {
    let digest = digest.to_owned();
    self
      .conn
      .call(move |conn| Ok(accounts::find_token(conn, &digest)))
      .await?
  }
}
