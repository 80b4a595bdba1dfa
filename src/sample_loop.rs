use anyhow::Result;
use spacepoint_imu::orientation::to_euler;
use spacepoint_imu::types::{Orientation, QuatFrame, SensorFrame};
use spacepoint_imu::FrameSlot;
use spacepoint_input::calibration::CalibrationController;
use spacepoint_input::pointer::PointerMapper;
use spacepoint_input::PointerSink;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Ticks between heartbeat log lines.
const HEARTBEAT_TICKS: u64 = 1000;

/// Commands delivered to the sample loop from outside the tick cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopCommand {
    /// Take the current orientation as the zero reference.
    SetZero,
}

/// Why the loop stopped. Both are clean stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A report channel went away.
    Disconnected,
    /// The shutdown future resolved.
    Cancelled,
}

/// Fixed-rate loop: snapshot the latest frames, map them to a pointer
/// intent and forward it to the sink.
pub struct SampleLoop<S> {
    sensor_rx: FrameSlot<SensorFrame>,
    quat_rx: FrameSlot<QuatFrame>,
    command_rx: mpsc::UnboundedReceiver<LoopCommand>,
    sink: S,
    mapper: PointerMapper,
    calibration: CalibrationController,
    /// Orientation from the newest quaternion frame seen so far.
    orientation: Option<Orientation>,
    period: Duration,
    tick_count: u64,
}

impl<S: PointerSink> SampleLoop<S> {
    pub fn new(
        sensor_rx: FrameSlot<SensorFrame>,
        quat_rx: FrameSlot<QuatFrame>,
        command_rx: mpsc::UnboundedReceiver<LoopCommand>,
        sink: S,
        mapper: PointerMapper,
        period: Duration,
    ) -> Self {
        Self {
            sensor_rx,
            quat_rx,
            command_rx,
            sink,
            mapper,
            calibration: CalibrationController::new(),
            orientation: None,
            period,
            tick_count: 0,
        }
    }

    /// Run until a channel disconnects or `shutdown` resolves.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<StopReason> {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            period_us = self.period.as_micros() as u64,
            mode = ?self.mapper.mode(),
            "Sample loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested");
                    return Ok(StopReason::Cancelled);
                }
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                _ = interval.tick() => {
                    if !self.tick()? {
                        tracing::warn!("Report channel closed, stopping");
                        return Ok(StopReason::Disconnected);
                    }
                }
            }
        }
    }

    /// One sample. Returns `false` once either channel has disconnected.
    fn tick(&mut self) -> Result<bool> {
        let (Ok(quat_changed), Ok(_)) = (self.quat_rx.has_changed(), self.sensor_rx.has_changed())
        else {
            return Ok(false);
        };

        if quat_changed {
            if let Some(frame) = *self.quat_rx.borrow_and_update() {
                self.orientation = Some(to_euler(frame.quaternion));
            }
        }

        let sensor = *self.sensor_rx.borrow();
        let buttons = sensor.map(|frame| frame.buttons);

        let intent = self
            .mapper
            .tick(self.orientation, buttons, self.calibration.offset());
        if !intent.is_idle() {
            tracing::trace!(?intent, "Pointer intent");
            self.sink.apply(&intent)?;
        }

        self.tick_count += 1;
        if self.tick_count % HEARTBEAT_TICKS == 0 {
            tracing::debug!(
                tick_count = self.tick_count,
                orientation = ?self.orientation,
                "Sample loop heartbeat"
            );
        }
        Ok(true)
    }

    fn handle_command(&mut self, cmd: LoopCommand) {
        match cmd {
            LoopCommand::SetZero => match self.orientation {
                Some(current) => {
                    self.calibration.calibrate(current);
                    self.mapper.reseed(current);
                }
                None => tracing::warn!("No orientation yet, ignoring zero command"),
            },
        }
    }
}
