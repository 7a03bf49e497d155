//! `ble2mqtt` library.
//!
//! The binary (`src/main.rs`) is responsible for CLI parsing, logging setup,
//! and process exit codes. The core "business logic" lives in [`crate::app`]
//! where it can be tested deterministically with an injected transceiver and
//! an injected publisher.

pub mod app;
pub mod config;
pub mod frame;
pub mod mac_address;
pub mod payload;
pub mod pipeline;
pub mod publish;
pub mod reading;
pub mod registry;
pub mod scanner;
pub mod topic;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use app::{RunError, SESSION_TIMEOUT};
pub use config::{Config, ConfigError, MqttConfig, SensorEntry, TopicsConfig};
pub use mac_address::MacAddress;
pub use pipeline::{PublishRecord, RecordKind, build_records, publish_all};
pub use publish::{MqttPublisher, PublishError, Publisher};
pub use reading::Reading;
pub use registry::{Sensor, SensorRegistry};
pub use scanner::{Advertisement, ScanError, Transceiver};
pub use topic::Kind;
