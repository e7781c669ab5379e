//! Periodic sample, seal, and report loop.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use common::protocol::SubmissionRequest;
use envelope::{seal, DeviceId, Iv, Key, ScalarReading, SealError, BLOCK_SIZE};
use rand::{rngs::OsRng, RngCore};
use tokio::time;
use tracing::{info, warn};

use crate::config::Config;
use crate::reader::{RandomSource, ReadingSource};
use crate::transmit::Transmitter;

/// Run the agent loop until the surrounding task is cancelled.
///
/// Every interval: draw a reading, seal it under a fresh IV (or the
/// configured fixed one), and deliver it. Delivery failures are logged and
/// the loop keeps going; the next reading gets a fresh attempt.
///
/// # Errors
///
/// Returns an error only if startup fails: bad key material, an unusable
/// range, or an endpoint the HTTP client refuses.
pub async fn run(cfg: &Config) -> Result<()> {
    let device = cfg.identity()?;
    let key = cfg.shared_key()?;
    let fixed_iv = cfg.fixed_iv()?;
    let mut source = RandomSource::new(cfg.sample_range()?);
    let transmitter = Transmitter::new(&cfg.endpoint_url)?;

    if fixed_iv.is_some() {
        warn!("FIXED_IV_HEX is set; every envelope will reuse the same IV");
    }
    info!(
        device_id = %device,
        endpoint = %cfg.endpoint_url,
        interval_secs = cfg.collection_interval_secs,
        "sensor agent started"
    );

    let mut ticker = time::interval(Duration::from_secs(cfg.collection_interval_secs));
    let mut cycle: u64 = 0;
    loop {
        ticker.tick().await;
        cycle += 1;
        let value = source.next_reading();
        let iv = fixed_iv.unwrap_or_else(fresh_iv);
        match report(&device, value, &iv, &key, &transmitter).await {
            Ok(sequence_id) => {
                info!(device_id = %device, cycle, value = %value, sequence_id, "reading delivered");
            }
            Err(e) => {
                warn!(
                    device_id = %device,
                    cycle,
                    value = %value,
                    error = %e,
                    "reading not delivered; will retry next interval"
                );
            }
        }
    }
}

/// Seal and deliver one reading, returning its stored sequence id.
async fn report(
    device: &DeviceId,
    value: ScalarReading,
    iv: &Iv,
    key: &Key,
    transmitter: &Transmitter,
) -> Result<i64> {
    let request = build_submission(device, value, iv, key, Utc::now().timestamp())?;
    let record = transmitter.submit(&request).await?;
    Ok(record.sequence_id)
}

/// Build the wire submission for one sealed reading.
fn build_submission(
    device: &DeviceId,
    value: ScalarReading,
    iv: &Iv,
    key: &Key,
    sent_at: i64,
) -> Result<SubmissionRequest, SealError> {
    let envelope = seal(device.as_str(), value, key, iv)?;
    Ok(SubmissionRequest {
        device_id: device.as_str().to_owned(),
        iv: iv.to_hex(),
        envelope: envelope.to_hex(),
        timestamp: sent_at,
    })
}

/// Draw a fresh random IV from the operating system.
fn fresh_iv() -> Iv {
    let mut bytes = [0u8; BLOCK_SIZE];
    OsRng.fill_bytes(&mut bytes);
    Iv::from_bytes(bytes)
}
