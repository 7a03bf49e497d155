//! BlueZ D-Bus transceiver backend.
//!
//! This backend uses the `bluer` crate to communicate with the BlueZ daemon
//! via D-Bus. It requires the `bluetoothd` daemon to be running.

use super::{ADVERTISEMENT_CHANNEL_BUFFER_SIZE, Advertisement, ScanError, Transceiver};
use bluer::{Adapter, AdapterEvent, Address, DiscoveryFilter, DiscoveryTransport, Session};
use futures::StreamExt;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

impl From<bluer::Error> for ScanError {
    fn from(err: bluer::Error) -> Self {
        ScanError::Bluetooth(err.to_string())
    }
}

/// Transceiver backed by the default BlueZ adapter.
#[derive(Debug, Default, Clone, Copy)]
pub struct BluerTransceiver;

impl BluerTransceiver {
    pub fn new() -> Self {
        BluerTransceiver
    }
}

impl Transceiver for BluerTransceiver {
    fn start_session(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<mpsc::Receiver<Advertisement>, ScanError>> + Send + '_>>
    {
        Box::pin(start_session())
    }
}

/// Begin one discovery session on the default adapter.
///
/// Advertisements are forwarded through the returned channel until the
/// receiver is dropped, which stops discovery and releases the adapter.
async fn start_session() -> Result<mpsc::Receiver<Advertisement>, ScanError> {
    let session = Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    // LE only; duplicates wanted since every rebroadcast carries fresh data.
    let filter = DiscoveryFilter {
        transport: DiscoveryTransport::Le,
        duplicate_data: true,
        ..Default::default()
    };
    if let Err(e) = adapter.set_discovery_filter(filter).await {
        log::warn!("failed to set discovery filter: {e}");
    }

    let mut discovery = adapter.discover_devices().await?;
    let (tx, rx) = mpsc::channel(ADVERTISEMENT_CHANNEL_BUFFER_SIZE);

    // The task owns all Bluetooth state; dropping the receiver ends it.
    tokio::spawn(async move {
        let _session = session;
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                event = discovery.next() => match event {
                    Some(AdapterEvent::DeviceAdded(address)) => {
                        if let Err(e) = forward_device(&adapter, address, &tx).await {
                            log::debug!("skipping device {address}: {e}");
                        }
                    }
                    Some(_) => {}
                    None => break,
                },
            }
        }
    });

    Ok(rx)
}

/// Read service data and signal strength from a discovered device and
/// forward it as an advertisement.
async fn forward_device(
    adapter: &Adapter,
    address: Address,
    tx: &mpsc::Sender<Advertisement>,
) -> Result<(), ScanError> {
    let device = adapter.device(address)?;

    let Some(service_data) = device.service_data().await? else {
        return Ok(());
    };
    let blocks: Vec<Vec<u8>> = service_data.into_values().collect();
    if blocks.is_empty() {
        return Ok(());
    }

    let signal = device.rssi().await?.unwrap_or(0);

    let _ = tx
        .send(Advertisement {
            source: address.into(),
            signal,
            service_data: blocks,
        })
        .await;

    Ok(())
}
