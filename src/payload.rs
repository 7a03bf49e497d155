//! Typed wire payloads for state and discovery publishes.
//!
//! Payload shape is a data-model contract: each payload kind has a struct
//! with exact field names and a constructor, and rendering to JSON happens in
//! a single step when records are built.

use crate::reading::Reading;
use crate::registry::Sensor;
use crate::topic::Kind;
use serde::Serialize;

/// Device manufacturer reported in discovery payloads.
pub const MANUFACTURER: &str = "Xiaomi";
/// Device model reported in discovery payloads.
pub const MODEL: &str = "LYWSD03MMC";

/// State topic payload for one measurement.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatePayload {
    pub timestamp: u64,
    pub label: String,
    pub value: f64,
    pub battery: u8,
    pub signal: i16,
}

/// Device metadata shared by all discovery entries of one sensor.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeviceInfo {
    pub name: String,
    pub identifiers: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
}

/// Home Assistant discovery config payload for one entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiscoveryPayload {
    pub device: DeviceInfo,
    pub name: String,
    pub unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<&'static str>,
    pub state_topic: String,
    pub value_template: &'static str,
    pub unit_of_measurement: &'static str,
}

/// Build a state payload for one measurement value.
///
/// The label is the title-cased sensor slug; battery and signal ride along
/// with every state payload.
pub fn state(sensor: &Sensor, reading: &Reading, value: f64, signal: i16) -> StatePayload {
    StatePayload {
        timestamp: reading.timestamp,
        label: title_case(&sensor.name),
        value,
        battery: reading.battery_level_percent,
        signal,
    }
}

/// Device metadata block for discovery payloads.
pub fn device_info(sensor: &Sensor) -> DeviceInfo {
    DeviceInfo {
        name: format!("{} {}", MODEL, sensor.name),
        identifiers: sensor.address.to_string(),
        manufacturer: MANUFACTURER,
        model: MODEL,
    }
}

/// Build the discovery payload for one entity kind.
///
/// `state_topic` is the topic the entity reads its value from. The battery
/// entity has no state topic of its own: it reads the `battery` field of the
/// temperature state payload, and is the only entry carrying a
/// `device_class`.
pub fn discovery(sensor: &Sensor, kind: Kind, state_topic: &str) -> DiscoveryPayload {
    let (value_template, unit_of_measurement, device_class) = match kind {
        Kind::Temperature => ("{{ value_json.value }}", "°C", None),
        Kind::Humidity => ("{{ value_json.value }}", "%", None),
        Kind::Battery => ("{{ value_json.battery }}", "%", Some("battery")),
    };

    DiscoveryPayload {
        device: device_info(sensor),
        name: format!("{} - {}", sensor.name, kind),
        unique_id: format!("{}_{}", sensor.name, kind),
        device_class,
        state_topic: state_topic.to_string(),
        value_template,
        unit_of_measurement,
    }
}

/// Uppercase the first letter of every whitespace-separated word.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c.is_whitespace();
    }
    out
}
