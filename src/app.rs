//! Core scan loop for the bridge.
//!
//! The loop is an explicit two-state machine: a bounded *Scanning* session,
//! and a *Restarting* transition that immediately re-enters Scanning when the
//! session deadline elapses. Cancellation terminates the loop instead of
//! restarting; any other session fault is fatal and propagates to the caller.
//! Collaborators are injected through traits so the loop can be tested
//! without Bluetooth hardware or a broker.

use crate::config::{ConfigError, TopicsConfig};
use crate::frame;
use crate::pipeline;
use crate::publish::{PublishError, Publisher};
use crate::registry::SensorRegistry;
use crate::scanner::{Advertisement, ScanError, Transceiver};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tokio::sync::watch;

/// Length of one scan session before it restarts.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors surfaced to the process entry point.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Publish(#[from] PublishError),
    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// How one scan session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The session deadline elapsed; the loop restarts a new session.
    Deadline,
    /// The process-wide cancellation signal fired; the loop terminates.
    Cancelled,
}

/// Run the scan loop until cancelled or a fatal session fault occurs.
///
/// Every advertisement observed within a session is dispatched synchronously
/// through registry lookup, frame decode, and the publish pipeline before the
/// next one is taken. A slow publish extends the effective inter-advertisement
/// gap; sensors rebroadcast every few seconds, so missed broadcasts are an
/// accepted trade-off.
pub async fn run(
    transceiver: &dyn Transceiver,
    publisher: &dyn Publisher,
    registry: &SensorRegistry,
    topics: &TopicsConfig,
    session_timeout: Duration,
    mut cancel: watch::Receiver<bool>,
) -> Result<(), ScanError> {
    loop {
        match run_session(
            transceiver,
            publisher,
            registry,
            topics,
            session_timeout,
            &mut cancel,
        )
        .await?
        {
            SessionEnd::Deadline => {
                log::debug!("scan session deadline reached, restarting");
            }
            SessionEnd::Cancelled => {
                log::info!("scan loop cancelled, terminating");
                return Ok(());
            }
        }
    }
}

/// Drive one bounded scan session to completion.
async fn run_session(
    transceiver: &dyn Transceiver,
    publisher: &dyn Publisher,
    registry: &SensorRegistry,
    topics: &TopicsConfig,
    session_timeout: Duration,
    cancel: &mut watch::Receiver<bool>,
) -> Result<SessionEnd, ScanError> {
    let mut advertisements = transceiver.start_session().await?;
    let deadline = tokio::time::sleep(session_timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => return Ok(SessionEnd::Deadline),
            _ = cancel.changed() => return Ok(SessionEnd::Cancelled),
            advertisement = advertisements.recv() => match advertisement {
                Some(advertisement) => {
                    handle_advertisement(publisher, registry, topics, &advertisement, epoch_now())
                        .await;
                }
                None => return Err(ScanError::SessionLost),
            },
        }
    }
}

/// Dispatch one advertisement through the pipeline.
///
/// Unknown addresses and undecodable blocks are skipped silently; they are
/// normal traffic from other devices and services, not errors.
async fn handle_advertisement(
    publisher: &dyn Publisher,
    registry: &SensorRegistry,
    topics: &TopicsConfig,
    advertisement: &Advertisement,
    epoch_secs: u64,
) {
    let Some(sensor) = registry.resolve(advertisement.source) else {
        return;
    };

    for block in &advertisement.service_data {
        let Some(reading) = frame::decode(block, epoch_secs) else {
            continue;
        };

        log::debug!(
            "advertisement from {} ({}): temperature={:.2} humidity={:.2} battery={} rssi={}",
            sensor.name,
            sensor.address,
            reading.temperature_celsius,
            reading.humidity_percent,
            reading.battery_level_percent,
            advertisement.signal
        );

        let records =
            match pipeline::build_records(topics, sensor, &reading, advertisement.signal) {
                Ok(records) => records,
                Err(e) => {
                    log::error!(
                        "failed to encode payloads for {} ({}): {e}",
                        sensor.name,
                        sensor.address
                    );
                    continue;
                }
            };

        pipeline::publish_all(publisher, sensor, &records).await;
    }
}

fn epoch_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs()
}
