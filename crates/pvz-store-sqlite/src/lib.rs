//! SQLite backend for the PVZ intake service.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Workflow operations run in `IMMEDIATE`
//! transactions; the `workflow` module documents the locking contract.

mod accounts;
mod catalog;
mod encode;
mod ledger;
mod queries;
mod schema;
mod store;
mod workflow;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_BUSY_TIMEOUT, SqliteStore};
