//! Broker publish abstraction and the rumqttc-backed implementation.
//!
//! The trait seam enables deterministic unit tests of the pipeline without a
//! broker, mirroring the scanner abstraction on the other side of the core.

use crate::config::MqttConfig;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// MQTT client identifier presented to the broker.
pub const CLIENT_ID: &str = "ble2mqtt";

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Errors raised while encoding or publishing a record.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("MQTT client error: {0}")]
    Client(String),
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<rumqttc::ClientError> for PublishError {
    fn from(err: rumqttc::ClientError) -> Self {
        PublishError::Client(err.to_string())
    }
}

/// Publisher abstraction to enable deterministic unit tests without a broker.
///
/// One call publishes one topic/payload pair with at-least-once semantics.
/// Connection and session lifecycle are entirely the implementation's
/// responsibility.
pub trait Publisher: Send + Sync {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: &'a [u8],
        retain: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>>;
}

/// Real publisher backed by a rumqttc async client.
///
/// The MQTT session (keep-alive, acknowledgments, reconnect attempts) is
/// driven by a background task owning the event loop; this type only holds
/// the request handle.
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Connect to the broker and start the session task.
    ///
    /// Waits for the initial CONNACK so a misconfigured broker address fails
    /// at startup rather than on the first publish.
    pub async fn connect(config: &MqttConfig) -> Result<Self, PublishError> {
        let mut options = MqttOptions::new(CLIENT_ID, &config.host, config.port);
        options.set_keep_alive(KEEP_ALIVE);
        if let Some(username) = &config.username {
            options.set_credentials(username, config.password.as_deref().unwrap_or(""));
        }

        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => break,
                Ok(_) => {}
                Err(e) => return Err(PublishError::Client(e.to_string())),
            }
        }
        log::debug!("connected to MQTT broker at {}:{}", config.host, config.port);

        tokio::spawn(async move {
            loop {
                if let Err(e) = event_loop.poll().await {
                    log::error!("MQTT session error: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });

        Ok(MqttPublisher { client })
    }
}

impl Publisher for MqttPublisher {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: &'a [u8],
        retain: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(async move {
            self.client
                .publish(topic, QoS::AtLeastOnce, retain, payload.to_vec())
                .await?;
            Ok(())
        })
    }
}
