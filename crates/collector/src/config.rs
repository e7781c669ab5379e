//! Configuration loading and validation for the collection service.
//!
//! All values are read from environment variables at startup. The process
//! exits with a clear error message if any required variable is missing or
//! invalid.

use anyhow::{Context, Result};
use envelope::{AcceptedRange, Key, ScalarReading};
use serde::Deserialize;

/// Validated collection service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Filesystem path of the SQLite record store.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Shared AES-128 key, 32 hex characters. **Required.**
    pub shared_key_hex: String,

    /// Lower bound of the accepted reading range, inclusive.
    #[serde(default = "default_value_min")]
    pub value_min: f64,

    /// Upper bound of the accepted reading range, inclusive.
    #[serde(default = "default_value_max")]
    pub value_max: f64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    5000
}
fn default_database_path() -> String {
    "sensor_attestation.db".into()
}
fn default_value_min() -> f64 {
    15.0
}
fn default_value_max() -> f64 {
    35.0
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be
    /// parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.database_path, "DATABASE_PATH")?;
        ensure_non_empty(&self.shared_key_hex, "SHARED_KEY_HEX")?;
        self.shared_key()?;
        self.accepted_range()?;
        Ok(())
    }

    /// Parse the shared key from its hex form.
    ///
    /// # Errors
    ///
    /// Returns an error naming `SHARED_KEY_HEX` when the value is not
    /// exactly 16 bytes of hex.
    pub fn shared_key(&self) -> Result<Key> {
        Key::from_hex(self.shared_key_hex.trim())
            .map_err(|e| anyhow::anyhow!("SHARED_KEY_HEX: {e}"))
    }

    /// Build the accepted reading range from the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not a representable reading or
    /// the minimum exceeds the maximum.
    pub fn accepted_range(&self) -> Result<AcceptedRange> {
        let min = ScalarReading::from_f64(self.value_min)
            .ok_or_else(|| anyhow::anyhow!("VALUE_MIN is not a representable reading"))?;
        let max = ScalarReading::from_f64(self.value_max)
            .ok_or_else(|| anyhow::anyhow!("VALUE_MAX is not a representable reading"))?;
        AcceptedRange::new(min, max).map_err(|e| anyhow::anyhow!("{e}"))
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
