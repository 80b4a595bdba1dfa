use spacepoint_imu::types::Orientation;

/// Reference orientation subtracted from readings in absolute mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationOffset {
    pub yaw0: f64,
    pub pitch0: f64,
}

/// Owns the calibration offset. Starts at `(0, 0)` and only changes on
/// an explicit zero command.
#[derive(Debug, Default)]
pub struct CalibrationController {
    offset: CalibrationOffset,
}

impl CalibrationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> CalibrationOffset {
        self.offset
    }

    /// Set the current orientation as the zero reference.
    pub fn calibrate(&mut self, current: Orientation) -> CalibrationOffset {
        self.offset = CalibrationOffset {
            yaw0: current.yaw,
            pitch0: current.pitch,
        };
        tracing::info!(
            yaw0 = self.offset.yaw0,
            pitch0 = self.offset.pitch0,
            "Zero reference set"
        );
        self.offset
    }
}
