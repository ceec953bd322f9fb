//! Core types, workflow rules and trait definitions for the PVZ intake service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod account;
pub mod error;
pub mod intake;
pub mod pickup_point;
pub mod product;
pub mod query;
pub mod service;
pub mod session;
pub mod store;

pub use error::{Classify, Error, ErrorKind, Result};
pub use service::Service;
