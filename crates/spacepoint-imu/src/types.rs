use glam::{DQuat, DVec3, IVec3};

/// State of the two buttons on the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub left: bool,
    pub right: bool,
}

impl Buttons {
    /// Both buttons held at once (the reset chord).
    pub fn chord(&self) -> bool {
        self.left && self.right
    }
}

/// Decoded report from the "Raw Interface" channel.
///
/// Axis values are the unsigned 16-bit readings as sent by the device,
/// so every component lies in `0..=65535`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFrame {
    pub magnetometer: IVec3,
    pub accelerometer: IVec3,
    pub gyroscope: IVec3,
    pub buttons: Buttons,
}

/// Decoded report from the "Quaternions" channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatFrame {
    /// Device orientation. `x..w` hold `q0..q3` in wire order, so the
    /// identity rotation is `(0, 0, 0, 1)`. Not renormalized.
    pub quaternion: DQuat,
    /// Gravity vector, each component in `[-6, 6)`.
    pub gravity: DVec3,
}

/// Euler angles in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    /// Range (-180, 180].
    pub yaw: f64,
    /// Range [-90, 90].
    pub pitch: f64,
    /// Range (-180, 180].
    pub roll: f64,
}
