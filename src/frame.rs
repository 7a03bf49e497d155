//! Service data frame decoder for the LYWSD03MMC broadcast layout.
//!
//! The custom firmware advertisement carries a fixed positional binary layout:
//!
//! - Bytes 0-5: MAC echo (not interpreted, the address comes from the radio)
//! - Bytes 6-7: Temperature, little-endian u16, hundredths of a degree Celsius
//! - Bytes 8-9: Humidity, little-endian u16, hundredths of a percent
//! - Bytes 10-11: Battery voltage (not interpreted)
//! - Byte 12: Battery level in percent
//! - Byte 13: Broadcast counter (not interpreted)
//! - Byte 14: Flag byte (not interpreted)
//!
//! The layout is not self-describing. Any layout change requires a new
//! decoder, not configuration.

use crate::reading::Reading;

/// Minimum service data block length for a decodable frame.
pub const MIN_FRAME_LEN: usize = 15;

const TEMPERATURE_OFFSET: usize = 6;
const HUMIDITY_OFFSET: usize = 8;
const BATTERY_OFFSET: usize = 12;

/// Decode one service data block into a [`Reading`].
///
/// Returns `None` for blocks shorter than [`MIN_FRAME_LEN`]. A short block is
/// a normal "not applicable" outcome (other services advertise too), never an
/// error. `epoch_secs` is the observation time; it is stored quantized down
/// to the minute so bursts of rebroadcasts within the same minute collapse to
/// the same timestamp.
pub fn decode(data: &[u8], epoch_secs: u64) -> Option<Reading> {
    if data.len() < MIN_FRAME_LEN {
        return None;
    }

    let temperature = u16::from_le_bytes([data[TEMPERATURE_OFFSET], data[TEMPERATURE_OFFSET + 1]]);
    let humidity = u16::from_le_bytes([data[HUMIDITY_OFFSET], data[HUMIDITY_OFFSET + 1]]);

    Some(Reading {
        temperature_celsius: f64::from(temperature) / 100.0,
        humidity_percent: f64::from(humidity) / 100.0,
        battery_level_percent: data[BATTERY_OFFSET],
        timestamp: quantize(epoch_secs),
    })
}

/// Truncate epoch seconds down to the nearest 60-second boundary.
pub fn quantize(epoch_secs: u64) -> u64 {
    epoch_secs - epoch_secs % 60
}
