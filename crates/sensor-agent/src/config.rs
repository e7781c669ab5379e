//! Configuration loading and validation for the sensor agent.

use anyhow::{Context, Result};
use envelope::{AcceptedRange, DeviceId, Iv, Key, ScalarReading};
use serde::Deserialize;

/// Validated sensor agent configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Identity this agent reports under.
    #[serde(default = "default_device_id")]
    pub device_id: String,

    /// Seconds between readings.
    #[serde(default = "default_collection_interval_secs")]
    pub collection_interval_secs: u64,

    /// Lower bound of the simulated reading range, inclusive.
    #[serde(default = "default_value_min")]
    pub value_min: f64,

    /// Upper bound of the simulated reading range, inclusive.
    #[serde(default = "default_value_max")]
    pub value_max: f64,

    /// Shared AES-128 key, 32 hex characters. **Required.**
    pub shared_key_hex: String,

    /// Fixed IV, 32 hex characters. When set, every envelope reuses this IV
    /// instead of drawing a fresh one; only for reproducing known vectors.
    pub fixed_iv_hex: Option<String>,

    /// Collection service submission URL.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_device_id() -> String {
    "ESP-01".into()
}
fn default_collection_interval_secs() -> u64 {
    2
}
fn default_value_min() -> f64 {
    15.0
}
fn default_value_max() -> f64 {
    35.0
}
fn default_endpoint_url() -> String {
    "http://127.0.0.1:5000/api/sensor-data".into()
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
            .context("failed to build sensor-agent configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise sensor-agent configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        self.identity()?;
        if self.collection_interval_secs == 0 {
            anyhow::bail!("COLLECTION_INTERVAL_SECS must be greater than zero");
        }
        if self.shared_key_hex.trim().is_empty() {
            anyhow::bail!("SHARED_KEY_HEX is required and must not be empty");
        }
        self.shared_key()?;
        self.fixed_iv()?;
        self.sample_range()?;
        if !self.endpoint_url.starts_with("http://") && !self.endpoint_url.starts_with("https://") {
            anyhow::bail!("ENDPOINT_URL must start with http:// or https://");
        }
        Ok(())
    }

    /// Parse the configured device identity.
    ///
    /// # Errors
    ///
    /// Returns an error naming `DEVICE_ID` when the identity is not
    /// packet-safe.
    pub fn identity(&self) -> Result<DeviceId> {
        DeviceId::new(self.device_id.as_str()).map_err(|e| anyhow::anyhow!("DEVICE_ID: {e}"))
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

    /// Parse the fixed IV, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error naming `FIXED_IV_HEX` when the value is present but
    /// not exactly 16 bytes of hex.
    pub fn fixed_iv(&self) -> Result<Option<Iv>> {
        match &self.fixed_iv_hex {
            None => Ok(None),
            Some(s) => Iv::from_hex(s.trim())
                .map(Some)
                .map_err(|e| anyhow::anyhow!("FIXED_IV_HEX: {e}")),
        }
    }

    /// Build the simulated reading range from the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if either bound is not a representable reading or
    /// the minimum exceeds the maximum.
    pub fn sample_range(&self) -> Result<AcceptedRange> {
        let min = ScalarReading::from_f64(self.value_min)
            .ok_or_else(|| anyhow::anyhow!("VALUE_MIN is not a representable reading"))?;
        let max = ScalarReading::from_f64(self.value_max)
            .ok_or_else(|| anyhow::anyhow!("VALUE_MAX is not a representable reading"))?;
        AcceptedRange::new(min, max).map_err(|e| anyhow::anyhow!("{e}"))
    }
}
