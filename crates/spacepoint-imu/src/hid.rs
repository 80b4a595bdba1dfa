//! HID transport for the SpacePoint Fusion.
//!
//! The device exposes two HID interfaces under one vendor/product id,
//! told apart by their product string: one streams raw magnetometer,
//! accelerometer and gyroscope readings plus the buttons, the other
//! streams the on-board quaternion and gravity estimate.

use hidapi::{DeviceInfo, HidApi, HidDevice};
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::protocol::DecodeError;

/// Largest report either interface sends; reads are sized to fit it.
const REPORT_BUF_LEN: usize = 64;

/// Reports between heartbeat log lines.
const HEARTBEAT_REPORTS: u64 = 1000;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
    #[error("No device found (VID {vendor_id:04x} PID {product_id:04x})")]
    NotFound { vendor_id: u16, product_id: u16 },
    #[error("Device found but interface {0:?} is missing")]
    ChannelMissing(String),
}

/// Which device and interfaces to open.
#[derive(Debug, Clone)]
pub struct DeviceFilter {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Product string of the raw sensor interface.
    pub raw_interface: String,
    /// Product string of the quaternion interface.
    pub quaternion_interface: String,
    /// Blocking read timeout; bounds how long shutdown waits on a reader.
    pub read_timeout_ms: i32,
}

/// The two opened report channels.
pub struct ReportChannels {
    pub raw: HidDevice,
    pub quaternion: HidDevice,
}

/// Find the device and open both of its report interfaces.
pub fn open_channels(filter: &DeviceFilter) -> Result<ReportChannels, DeviceError> {
    let api = HidApi::new()?;

    let candidates: Vec<&DeviceInfo> = api
        .device_list()
        .filter(|d| d.vendor_id() == filter.vendor_id && d.product_id() == filter.product_id)
        .collect();

    if candidates.is_empty() {
        return Err(DeviceError::NotFound {
            vendor_id: filter.vendor_id,
            product_id: filter.product_id,
        });
    }

    for info in &candidates {
        tracing::info!(
            vendor = format!("{:04x}", info.vendor_id()),
            product = format!("{:04x}", info.product_id()),
            interface = info.interface_number(),
            product_string = ?info.product_string(),
            "Found device interface"
        );
    }

    let find = |name: &str| -> Result<HidDevice, DeviceError> {
        let info = candidates
            .iter()
            .find(|d| d.product_string() == Some(name))
            .ok_or_else(|| DeviceError::ChannelMissing(name.to_string()))?;
        Ok(info.open_device(&api)?)
    };

    let raw = find(&filter.raw_interface)?;
    let quaternion = find(&filter.quaternion_interface)?;

    Ok(ReportChannels { raw, quaternion })
}

/// Blocking reader for one report channel.
///
/// Each decoded report replaces the slot's value in a single `send`, so
/// readers never see a frame assembled from two reports. Malformed
/// reports are dropped and the previous frame stays. Returns when
/// `running` is cleared or the device read fails; the sender is dropped
/// on return, which is how the consumer learns the channel is gone.
pub(crate) fn read_reports<T: Debug>(
    device: HidDevice,
    channel: &'static str,
    decode: fn(&[u8]) -> Result<T, DecodeError>,
    tx: watch::Sender<Option<T>>,
    running: Arc<AtomicBool>,
    timeout_ms: i32,
) {
    let mut buf = [0u8; REPORT_BUF_LEN];
    let mut report_count: u64 = 0;

    while running.load(Ordering::Relaxed) {
        match device.read_timeout(&mut buf, timeout_ms) {
            // Timed out with nothing to read.
            Ok(0) => continue,
            Ok(n) => match publish(decode, &buf[..n], &tx, channel) {
                Publish::Stored => {
                    report_count += 1;
                    if report_count % HEARTBEAT_REPORTS == 0 {
                        tracing::debug!(channel, report_count, "Reports processed");
                    }
                }
                Publish::Discarded => {}
                Publish::Closed => {
                    tracing::debug!(channel, "No frame readers left");
                    break;
                }
            },
            Err(e) => {
                tracing::warn!(channel, ?e, "Report channel disconnected");
                break;
            }
        }
    }

    // Dropping the device closes the HID handle.
    drop(device);
    tracing::debug!(channel, report_count, "Report channel closed");
}

/// What happened to one report handed to [`publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publish {
    Stored,
    Discarded,
    Closed,
}

/// Decode one report into the slot. A malformed report leaves the
/// previous frame in place and does not mark the slot changed.
fn publish<T: Debug>(
    decode: fn(&[u8]) -> Result<T, DecodeError>,
    data: &[u8],
    tx: &watch::Sender<Option<T>>,
    channel: &'static str,
) -> Publish {
    match decode(data) {
        Ok(frame) => {
            tracing::trace!(channel, ?frame, "Report decoded");
            match tx.send(Some(frame)) {
                Ok(()) => Publish::Stored,
                Err(_) => Publish::Closed,
            }
        }
        Err(e) => {
            tracing::trace!(channel, ?e, "Discarding malformed report");
            Publish::Discarded
        }
    }
}
