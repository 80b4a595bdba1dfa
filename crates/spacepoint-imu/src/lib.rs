pub mod hid;
pub mod orientation;
pub mod protocol;
pub mod types;

use hid::{DeviceError, DeviceFilter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use types::{QuatFrame, SensorFrame};

/// Latest-frame slot for one report channel. `None` until the first report.
pub type FrameSlot<T> = watch::Receiver<Option<T>>;

/// Client for the SpacePoint Fusion.
///
/// Opens both HID interfaces and runs one blocking reader per channel.
/// Each reader is the only writer of its slot; consumers take snapshots
/// through [`SpacePointClient::sensor_frames`] and
/// [`SpacePointClient::quat_frames`].
pub struct SpacePointClient {
    sensor_rx: FrameSlot<SensorFrame>,
    quat_rx: FrameSlot<QuatFrame>,
    running: Arc<AtomicBool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SpacePointClient {
    /// Find the device, open both channels and start reading.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(filter: &DeviceFilter) -> Result<Self, DeviceError> {
        tracing::info!(
            vendor = format!("{:04x}", filter.vendor_id),
            product = format!("{:04x}", filter.product_id),
            "Looking for SpacePoint Fusion"
        );

        let channels = hid::open_channels(filter)?;
        tracing::info!("Opened raw and quaternion channels");

        let (sensor_tx, sensor_rx) = watch::channel(None);
        let (quat_tx, quat_rx) = watch::channel(None);
        let running = Arc::new(AtomicBool::new(true));
        let timeout_ms = filter.read_timeout_ms;

        let raw_running = Arc::clone(&running);
        let raw_task = tokio::task::spawn_blocking(move || {
            hid::read_reports(
                channels.raw,
                "raw",
                protocol::decode_raw,
                sensor_tx,
                raw_running,
                timeout_ms,
            )
        });

        let quat_running = Arc::clone(&running);
        let quat_task = tokio::task::spawn_blocking(move || {
            hid::read_reports(
                channels.quaternion,
                "quaternion",
                protocol::decode_quat,
                quat_tx,
                quat_running,
                timeout_ms,
            )
        });

        Ok(Self {
            sensor_rx,
            quat_rx,
            running,
            tasks: vec![raw_task, quat_task],
        })
    }

    /// Snapshot handle for the raw channel.
    pub fn sensor_frames(&self) -> FrameSlot<SensorFrame> {
        self.sensor_rx.clone()
    }

    /// Snapshot handle for the quaternion channel.
    pub fn quat_frames(&self) -> FrameSlot<QuatFrame> {
        self.quat_rx.clone()
    }

    /// Stop both readers and wait for them to close their channels.
    pub async fn shutdown(self) {
        self.running.store(false, Ordering::Relaxed);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(?e, "Report reader panicked");
            }
        }
        tracing::info!("Device channels closed");
    }
}
