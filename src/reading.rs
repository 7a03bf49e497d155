//! Decoded LYWSD03MMC measurement.

/// One measurement decoded from a service data block.
///
/// Values are in their natural units:
/// - Temperature in Celsius
/// - Humidity in percent (0-100)
/// - Battery level in percent (0-100)
/// - Timestamp in epoch seconds, truncated to the minute boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Temperature in Celsius
    pub temperature_celsius: f64,
    /// Relative humidity in percent
    pub humidity_percent: f64,
    /// Battery charge level in percent
    pub battery_level_percent: u8,
    /// Epoch seconds, quantized down to the nearest 60-second boundary
    pub timestamp: u64,
}
