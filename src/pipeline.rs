//! Publish pipeline: from a decoded reading to a fixed set of retained
//! broker records.
//!
//! One advertisement from a known sensor yields exactly five records, in this
//! order: temperature state, humidity state, temperature discovery, humidity
//! discovery, battery discovery. Every record is attempted independently; a
//! failed publish is logged with the sensor and record identity and the
//! remaining records are still attempted. No retry is scheduled within one
//! advertisement, since sensors rebroadcast every few seconds.

use crate::config::TopicsConfig;
use crate::payload;
use crate::publish::{PublishError, Publisher};
use crate::reading::Reading;
use crate::registry::Sensor;
use crate::topic::{self, Kind};
use std::fmt;

/// Identity of one record, used in failure logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    TemperatureState,
    HumidityState,
    TemperatureDiscovery,
    HumidityDiscovery,
    BatteryDiscovery,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::TemperatureState => "temperature state",
            RecordKind::HumidityState => "humidity state",
            RecordKind::TemperatureDiscovery => "temperature discovery config",
            RecordKind::HumidityDiscovery => "humidity discovery config",
            RecordKind::BatteryDiscovery => "battery discovery config",
        };
        f.write_str(s)
    }
}

/// One fully rendered topic/payload pair destined for the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishRecord {
    pub kind: RecordKind,
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

impl PublishRecord {
    fn retained(kind: RecordKind, topic: String, payload: Vec<u8>) -> Self {
        PublishRecord {
            kind,
            topic,
            payload,
            retain: true,
        }
    }
}

/// Build the five records for one reading, all with retention enabled.
///
/// The battery discovery entry points at the temperature state topic; the
/// battery level is a field of that payload rather than a state topic of its
/// own.
pub fn build_records(
    topics: &TopicsConfig,
    sensor: &Sensor,
    reading: &Reading,
    signal: i16,
) -> Result<Vec<PublishRecord>, PublishError> {
    let temperature_topic =
        topic::render_state_topic(&topics.sensor_format, &sensor.name, Kind::Temperature);
    let humidity_topic =
        topic::render_state_topic(&topics.sensor_format, &sensor.name, Kind::Humidity);
    let root = &topics.home_assistant;

    Ok(vec![
        PublishRecord::retained(
            RecordKind::TemperatureState,
            temperature_topic.clone(),
            serde_json::to_vec(&payload::state(
                sensor,
                reading,
                reading.temperature_celsius,
                signal,
            ))?,
        ),
        PublishRecord::retained(
            RecordKind::HumidityState,
            humidity_topic.clone(),
            serde_json::to_vec(&payload::state(
                sensor,
                reading,
                reading.humidity_percent,
                signal,
            ))?,
        ),
        PublishRecord::retained(
            RecordKind::TemperatureDiscovery,
            topic::discovery_topic(root, sensor.address, &sensor.name, Kind::Temperature),
            serde_json::to_vec(&payload::discovery(
                sensor,
                Kind::Temperature,
                &temperature_topic,
            ))?,
        ),
        PublishRecord::retained(
            RecordKind::HumidityDiscovery,
            topic::discovery_topic(root, sensor.address, &sensor.name, Kind::Humidity),
            serde_json::to_vec(&payload::discovery(sensor, Kind::Humidity, &humidity_topic))?,
        ),
        PublishRecord::retained(
            RecordKind::BatteryDiscovery,
            topic::discovery_topic(root, sensor.address, &sensor.name, Kind::Battery),
            serde_json::to_vec(&payload::discovery(
                sensor,
                Kind::Battery,
                &temperature_topic,
            ))?,
        ),
    ])
}

/// Publish all records, isolating failures per record.
///
/// Returns the number of successful publishes. A failure never prevents the
/// remaining records from being attempted: discovery and state topics are
/// read independently by consumers, and a stale discovery entry is less
/// harmful than skipping a valid state update.
pub async fn publish_all(
    publisher: &dyn Publisher,
    sensor: &Sensor,
    records: &[PublishRecord],
) -> usize {
    let mut published = 0;
    for record in records {
        match publisher
            .publish(&record.topic, &record.payload, record.retain)
            .await
        {
            Ok(()) => published += 1,
            Err(e) => log::error!(
                "failed to publish {} for {} ({}): {e}",
                record.kind,
                sensor.name,
                sensor.address
            ),
        }
    }
    published
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakePublisher, test_sensor, test_topics};

    fn reading() -> Reading {
        Reading {
            temperature_celsius: 21.50,
            humidity_percent: 45.30,
            battery_level_percent: 87,
            timestamp: 1_700_000_040,
        }
    }

    #[test]
    fn test_build_records_order_and_topics() {
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();

        let summary: Vec<(RecordKind, &str)> = records
            .iter()
            .map(|r| (r.kind, r.topic.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RecordKind::TemperatureState, "home/livingroom/temperature"),
                (RecordKind::HumidityState, "home/livingroom/humidity"),
                (
                    RecordKind::TemperatureDiscovery,
                    "homeassistant/sensor/AABBCCDDEEFF/livingroom_temperature/config"
                ),
                (
                    RecordKind::HumidityDiscovery,
                    "homeassistant/sensor/AABBCCDDEEFF/livingroom_humidity/config"
                ),
                (
                    RecordKind::BatteryDiscovery,
                    "homeassistant/sensor/AABBCCDDEEFF/livingroom_battery/config"
                ),
            ]
        );
    }

    #[test]
    fn test_build_records_all_retained() {
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();
        assert!(records.iter().all(|r| r.retain));
    }

    #[test]
    fn test_build_records_state_values() {
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();

        let temperature: serde_json::Value = serde_json::from_slice(&records[0].payload).unwrap();
        assert_eq!(temperature["value"], serde_json::json!(21.50));
        assert_eq!(temperature["battery"], serde_json::json!(87));
        assert_eq!(temperature["signal"], serde_json::json!(-67));
        assert_eq!(temperature["timestamp"], serde_json::json!(1_700_000_040u64));

        let humidity: serde_json::Value = serde_json::from_slice(&records[1].payload).unwrap();
        assert_eq!(humidity["value"], serde_json::json!(45.30));
    }

    #[test]
    fn test_battery_discovery_points_at_temperature_topic() {
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();
        let battery: serde_json::Value = serde_json::from_slice(&records[4].payload).unwrap();
        assert_eq!(
            battery["state_topic"],
            serde_json::json!("home/livingroom/temperature")
        );
    }

    #[tokio::test]
    async fn test_publish_all_succeeds() {
        let publisher = FakePublisher::new();
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();

        let published = publish_all(&publisher, &test_sensor(), &records).await;

        assert_eq!(published, 5);
        let calls = publisher.calls();
        assert_eq!(calls.len(), 5);
        assert!(calls.iter().all(|c| c.retain));
    }

    #[tokio::test]
    async fn test_publish_all_isolates_failures() {
        // The temperature state publish fails; the remaining four records
        // must still be attempted.
        let publisher = FakePublisher::failing_on(&["home/livingroom/temperature"]);
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();

        let published = publish_all(&publisher, &test_sensor(), &records).await;

        assert_eq!(published, 4);
        assert_eq!(publisher.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_publish_all_attempts_every_record_when_all_fail() {
        let publisher = FakePublisher::failing_on(&[
            "home/livingroom/temperature",
            "home/livingroom/humidity",
            "homeassistant/sensor/AABBCCDDEEFF/livingroom_temperature/config",
            "homeassistant/sensor/AABBCCDDEEFF/livingroom_humidity/config",
            "homeassistant/sensor/AABBCCDDEEFF/livingroom_battery/config",
        ]);
        let records = build_records(&test_topics(), &test_sensor(), &reading(), -67).unwrap();

        let published = publish_all(&publisher, &test_sensor(), &records).await;

        assert_eq!(published, 0);
        assert_eq!(publisher.calls().len(), 5);
    }
}
