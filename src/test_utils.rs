use crate::config::TopicsConfig;
use crate::frame::MIN_FRAME_LEN;
use crate::mac_address::MacAddress;
use crate::publish::{PublishError, Publisher};
use crate::registry::Sensor;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

/// A stable MAC address for unit tests.
pub const TEST_MAC: MacAddress = MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

/// The standard sensor used across tests.
pub fn test_sensor() -> Sensor {
    Sensor {
        address: TEST_MAC,
        name: "livingroom".to_string(),
    }
}

/// Topic templates used across tests.
pub fn test_topics() -> TopicsConfig {
    TopicsConfig {
        sensor_format: "home/${name}/${sensor}".to_string(),
        home_assistant: "homeassistant".to_string(),
    }
}

/// Build a minimum-length service data block with the given raw values at
/// their layout offsets. Uninterpreted bytes stay zero.
pub fn service_data_block(raw_temperature: u16, raw_humidity: u16, battery: u8) -> Vec<u8> {
    let mut block = vec![0u8; MIN_FRAME_LEN];
    block[6..8].copy_from_slice(&raw_temperature.to_le_bytes());
    block[8..10].copy_from_slice(&raw_humidity.to_le_bytes());
    block[12] = battery;
    block
}

/// One recorded publish call.
#[derive(Debug, Clone)]
pub struct RecordedPublish {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

/// Publisher that records every call and can be told to fail on specific
/// topics, for exercising partial-failure isolation.
#[derive(Debug, Default)]
pub struct FakePublisher {
    calls: Mutex<Vec<RecordedPublish>>,
    failing: Vec<String>,
}

impl FakePublisher {
    pub fn new() -> Self {
        FakePublisher::default()
    }

    pub fn failing_on(topics: &[&str]) -> Self {
        FakePublisher {
            calls: Mutex::new(Vec::new()),
            failing: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedPublish> {
        self.calls.lock().unwrap().clone()
    }
}

impl Publisher for FakePublisher {
    fn publish<'a>(
        &'a self,
        topic: &'a str,
        payload: &'a [u8],
        retain: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(RecordedPublish {
                topic: topic.to_string(),
                payload: payload.to_vec(),
                retain,
            });
            if self.failing.iter().any(|t| t == topic) {
                Err(PublishError::Client("broker unavailable".to_string()))
            } else {
                Ok(())
            }
        })
    }
}
