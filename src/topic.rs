//! Topic rendering for state and discovery publishes.
//!
//! State topics come from the configured `sensor_format` template with the
//! `${name}` and `${sensor}` placeholders substituted literally. Discovery
//! topics follow the Home Assistant MQTT discovery convention:
//! `<root>/sensor/<address-no-separators>/<slug>_<kind>/config`, grouping all
//! entries for one physical device under one path prefix.

use crate::mac_address::MacAddress;
use std::fmt;

/// Measurement kind literal used in topics and entity identifiers.
///
/// Only `Temperature` and `Humidity` have state topics of their own; the
/// battery level rides inside the temperature state payload and appears only
/// as a discovery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Temperature,
    Humidity,
    Battery,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Temperature => "temperature",
            Kind::Humidity => "humidity",
            Kind::Battery => "battery",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a state topic from the configured template.
///
/// Substitution is literal string replacement. The two placeholders never
/// overlap, so replacement order does not matter. A template without
/// placeholders renders to itself.
pub fn render_state_topic(template: &str, name: &str, kind: Kind) -> String {
    template
        .replace("${name}", name)
        .replace("${sensor}", kind.as_str())
}

/// Discovery path prefix shared by all entries of one physical device.
pub fn discovery_base(root: &str, address: MacAddress) -> String {
    format!("{}/sensor/{}", root, address.flat())
}

/// Full discovery config topic for one entity of a device.
pub fn discovery_topic(root: &str, address: MacAddress, name: &str, kind: Kind) -> String {
    format!("{}/{}_{}/config", discovery_base(root, address), name, kind)
}
