//! Static registry of known sensors.
//!
//! Advertisements from addresses that are not configured are ignored, so the
//! registry doubles as the relevance filter for the scan loop.

use crate::config::SensorEntry;
use crate::mac_address::MacAddress;
use std::collections::HashMap;

/// A known sensor resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    pub address: MacAddress,
    pub name: String,
}

/// Lookup table from hardware address to sensor identity.
///
/// Built once at startup and read-only afterwards. Lookup is case-insensitive
/// by construction: addresses normalize to bytes at parse time, before they
/// ever reach the map.
#[derive(Debug, Default)]
pub struct SensorRegistry {
    sensors: HashMap<MacAddress, Sensor>,
}

impl SensorRegistry {
    /// Build the registry from the configured sensor list.
    ///
    /// Later entries with a duplicate address replace earlier ones.
    pub fn new(entries: &[SensorEntry]) -> Self {
        let sensors = entries
            .iter()
            .map(|entry| {
                (
                    entry.mac_address,
                    Sensor {
                        address: entry.mac_address,
                        name: entry.name.clone(),
                    },
                )
            })
            .collect();
        SensorRegistry { sensors }
    }

    /// Resolve a broadcast source address to a configured sensor.
    ///
    /// Returns `None` for unknown addresses; the caller skips those silently.
    pub fn resolve(&self, address: MacAddress) -> Option<&Sensor> {
        self.sensors.get(&address)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<SensorEntry> {
        vec![
            SensorEntry {
                mac_address: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
                name: "livingroom".to_string(),
            },
            SensorEntry {
                mac_address: "11:22:33:44:55:66".parse().unwrap(),
                name: "bedroom".to_string(),
            },
        ]
    }

    #[test]
    fn test_resolve_known_address() {
        let registry = SensorRegistry::new(&entries());
        let sensor = registry.resolve("AA:BB:CC:DD:EE:FF".parse().unwrap()).unwrap();
        assert_eq!(sensor.name, "livingroom");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = SensorRegistry::new(&entries());
        let upper = registry.resolve("AA:BB:CC:DD:EE:FF".parse().unwrap());
        let lower = registry.resolve("aa:bb:cc:dd:ee:ff".parse().unwrap());
        assert_eq!(upper, lower);
        assert!(upper.is_some());
    }

    #[test]
    fn test_resolve_unknown_address() {
        let registry = SensorRegistry::new(&entries());
        assert_eq!(registry.resolve("00:00:00:00:00:00".parse().unwrap()), None);
    }

    #[test]
    fn test_duplicate_addresses_keep_last_entry() {
        let mut list = entries();
        list.push(SensorEntry {
            mac_address: "AA:BB:CC:DD:EE:FF".parse().unwrap(),
            name: "renamed".to_string(),
        });

        let registry = SensorRegistry::new(&list);
        assert_eq!(registry.len(), 2);
        let sensor = registry.resolve("AA:BB:CC:DD:EE:FF".parse().unwrap()).unwrap();
        assert_eq!(sensor.name, "renamed");
    }
}
