//! Console configuration: optional TOML file, then `IDLOOKUP_*` environment
//! variables. Command-line flags are applied on top by `main`.

use std::{path::{Path, PathBuf}, time::Duration};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime console configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
  /// Base URL of the record service.
  #[serde(default = "default_api_url")]
  pub api_url:              String,
  /// Fixed header the tunnelling proxy in front of the backend requires.
  #[serde(default = "default_bypass_name")]
  pub bypass_header_name:   String,
  #[serde(default = "default_bypass_value")]
  pub bypass_header_value:  String,
  /// Messaging webhook for audit lines. Audit is log-only when unset.
  #[serde(default)]
  pub webhook_url:          Option<String>,
  /// Public IP echo service, answering `{"ip": "..."}`.
  #[serde(default = "default_ip_lookup_url")]
  pub ip_lookup_url:        String,
  #[serde(default = "default_timeout_secs")]
  pub request_timeout_secs: u64,
  /// Where tracing output goes; discarded when unset.
  #[serde(default)]
  pub log_file:             Option<PathBuf>,
}

fn default_api_url() -> String { "http://localhost:5000".into() }

fn default_bypass_name() -> String { "ngrok-skip-browser-warning".into() }

fn default_bypass_value() -> String { "true".into() }

fn default_ip_lookup_url() -> String { "https://api.ipify.org?format=json".into() }

fn default_timeout_secs() -> u64 { 30 }

impl Default for ConsoleConfig {
  fn default() -> Self {
    Self {
      api_url:              default_api_url(),
      bypass_header_name:   default_bypass_name(),
      bypass_header_value:  default_bypass_value(),
      webhook_url:          None,
      ip_lookup_url:        default_ip_lookup_url(),
      request_timeout_secs: default_timeout_secs(),
      log_file:             None,
    }
  }
}

impl ConsoleConfig {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

/// Read `path` (if it exists) and the environment into a [`ConsoleConfig`].
pub fn load(path: &Path) -> anyhow::Result<ConsoleConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("IDLOOKUP"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ConsoleConfig")
}
