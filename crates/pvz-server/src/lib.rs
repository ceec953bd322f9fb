//! Configuration and application assembly for the PVZ server binary.

use std::{collections::HashMap, path::Path, path::PathBuf, time::Duration};

use axum::Router;
use config::{Config, ConfigError, Environment, File, builder::DefaultState};
use pvz_core::{
  Service,
  access::AccessPolicy,
  store::{AccountStore, PickupStore},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `PVZ_*`
/// environment variables. Every key is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// How long a write waits for the database lock before reporting a
  /// conflict.
  pub busy_timeout_ms: u64,
  /// Role name to granted operation names. Replaces the built-in grants
  /// entirely when present.
  pub access:          Option<HashMap<String, Vec<String>>>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "0.0.0.0".to_string(),
      port:            8080,
      store_path:      PathBuf::from("pvz.sqlite3"),
      busy_timeout_ms: 5_000,
      access:          None,
    }
  }
}

impl ServerConfig {
  /// Layer the file at `path` (if it exists) under `PVZ_*` environment
  /// variables.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("PVZ").try_parsing(true)),
    )
  }

  fn from_builder(builder: config::ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder.build()?.try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn busy_timeout(&self) -> Duration { Duration::from_millis(self.busy_timeout_ms) }

  /// The access policy: the `[access]` table if configured, the built-in
  /// grants otherwise.
  pub fn policy(&self) -> pvz_core::Result<AccessPolicy> {
    match &self.access {
      Some(table) => AccessPolicy::from_table(table),
      None => Ok(AccessPolicy::default()),
    }
  }
}

// ─── Application ─────────────────────────────────────────────────────────────

/// The API router with request tracing.
pub fn app<S>(service: Service<S>) -> Router
where
  S: PickupStore + AccountStore + 'static,
{
  pvz_api::api_router(service).layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;
  use config::FileFormat;
  use pvz_core::access::{Operation, Role};

  fn from_toml(toml: &str) -> Result<ServerConfig, ConfigError> {
    ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = from_toml("").unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:8080");
    assert_eq!(cfg.store_path, PathBuf::from("pvz.sqlite3"));
    assert_eq!(cfg.busy_timeout(), Duration::from_secs(5));
    assert_eq!(cfg.policy().unwrap(), AccessPolicy::default());
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/pvz-config.toml")).unwrap();
    assert_eq!(cfg.busy_timeout_ms, ServerConfig::default().busy_timeout_ms);
  }

  #[test]
  fn overrides_win_over_file() {
    let cfg = ServerConfig::from_builder(
      Config::builder()
        .add_source(File::from_str("port = 9000\nhost = \"127.0.0.1\"", FileFormat::Toml))
        .set_override("port", 9100)
        .unwrap(),
    )
    .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:9100");
  }

  #[test]
  fn pvz_environment_wins_over_file() {
    let env: config::Map<String, String> = [
      ("PVZ_PORT", "9200"),
      ("PVZ_STORE_PATH", "/var/lib/pvz/pvz.sqlite3"),
      ("PVZ_BUSY_TIMEOUT_MS", "250"),
      ("OTHER_PORT", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    let cfg = ServerConfig::from_builder(
      Config::builder()
        .add_source(File::from_str("port = 9000\nstore_path = \"file.sqlite3\"", FileFormat::Toml))
        .add_source(Environment::with_prefix("PVZ").try_parsing(true).source(Some(env))),
    )
    .unwrap();
    assert_eq!(cfg.port, 9200);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/pvz/pvz.sqlite3"));
    assert_eq!(cfg.busy_timeout(), Duration::from_millis(250));
    assert_eq!(cfg.host, "0.0.0.0");
  }

  #[test]
  fn access_table_replaces_default_grants() {
    let cfg = from_toml(
      r#"
      [access]
      moderator = ["create_pickup_point", "open_session"]
      "#,
    )
    .unwrap();
    let policy = cfg.policy().unwrap();
    assert!(policy.authorize(Role::Moderator, Operation::OpenSession));
    assert!(!policy.authorize(Role::Employee, Operation::OpenSession));
  }

  #[test]
  fn unknown_operation_in_access_table_is_rejected() {
    let cfg = from_toml("[access]\nemployee = [\"teleport\"]").unwrap();
    assert!(cfg.policy().is_err());
  }

  #[test]
  fn tilde_expands_to_home() {
    let expanded = expand_tilde(Path::new("~/pvz.sqlite3"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expanded, PathBuf::from(home).join("pvz.sqlite3"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/pvz.sqlite3")), PathBuf::from("/abs/pvz.sqlite3"));
  }
}
