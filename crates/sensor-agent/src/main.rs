//! `sensor-agent` — device agent binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Run the sample/seal/report loop until Ctrl-C.

mod agent;
mod config;
mod reader;
mod telemetry;
mod transmit;

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: sensor-agent configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 3. Agent loop
    // -----------------------------------------------------------------------
    tokio::select! {
        res = agent::run(&cfg) => res,
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("shutdown signal received; stopping");
            Ok(())
        }
    }
}
