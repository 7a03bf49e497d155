//! BLE scan session abstraction.
//!
//! The transceiver is a collaborator: it owns adapter acquisition and
//! low-level scan parameters and delivers raw advertisements through a
//! channel. The trait seam allows the scan loop to be tested without
//! Bluetooth hardware.

#[cfg(feature = "bluer")]
pub mod bluer;

use crate::mac_address::MacAddress;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel buffer size for advertisements within one session.
pub const ADVERTISEMENT_CHANNEL_BUFFER_SIZE: usize = 64;

/// One observed broadcast event.
///
/// Service data blocks carry only the raw bytes; the service identifier is
/// not consulted, the frame decoder decides applicability by length and
/// layout alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Advertisement {
    /// Hardware address of the broadcaster
    pub source: MacAddress,
    /// Received signal strength indicator in dBm
    pub signal: i16,
    /// Raw service data blocks carried in the advertisement
    pub service_data: Vec<Vec<u8>>,
}

/// Error type for scanner operations.
///
/// Neither variant covers the session deadline: reaching the deadline is a
/// normal outcome handled by the scan loop, not an error.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Bluetooth/adapter related fault
    #[error("Bluetooth error: {0}")]
    Bluetooth(String),
    /// The advertisement stream ended before the session deadline
    #[error("scan session ended unexpectedly")]
    SessionLost,
}

/// Transceiver abstraction: begins one scan session.
///
/// A session delivers zero or more advertisements through the returned
/// channel until the receiver is dropped, which ends the session. Starting a
/// session can fail with a Bluetooth fault, which the caller treats as fatal.
pub trait Transceiver: Send + Sync {
    fn start_session(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>;
}
