use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest and longest tick period a timer can be built from.
const MIN_PERIOD: Duration = Duration::from_micros(1);
const MAX_PERIOD: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which HID device and interfaces to open.
    pub device: DeviceConfig,
    /// Sample loop timing.
    pub sampling: SamplingConfig,
    /// Orientation to pointer mapping.
    pub pointer: PointerConfig,
    /// Host screen, used for centering and absolute targets.
    pub screen: ScreenConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub vendor_id: u16,
    pub product_id: u16,
    /// HID product string of the raw sensor interface.
    pub raw_interface: String,
    /// HID product string of the quaternion interface.
    pub quaternion_interface: String,
    /// Blocking read timeout. Shutdown can take up to this long.
    pub read_timeout_ms: i32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0x20ff,
            product_id: 0x0100,
            raw_interface: "Raw Interface".to_string(),
            quaternion_interface: "Quaternions".to_string(),
            read_timeout_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Pointer update rate. The device itself reports at 125 Hz.
    pub frequency_hz: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 125.0,
        }
    }
}

impl SamplingConfig {
    /// Tick period for `frequency_hz`, or `None` if it falls outside
    /// 1 µs to 1 hour.
    pub fn period(&self) -> Option<Duration> {
        let period = Duration::try_from_secs_f64(self.frequency_hz.recip()).ok()?;
        (MIN_PERIOD..=MAX_PERIOD).contains(&period).then_some(period)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    /// Move by the change in orientation since the previous tick.
    #[default]
    Delta,
    /// Place the pointer at screen center plus orientation minus the calibration offset.
    Absolute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub mode: MappingMode,
    /// Pixels per degree of yaw.
    pub gain_x: f64,
    /// Pixels per degree of pitch.
    pub gain_y: f64,
    /// Yaw changes at or below this many degrees are ignored (delta mode).
    pub dead_zone_deg: f64,
    /// Yaw changes at or above this many degrees are treated as a wrap
    /// across +-180 and produce no horizontal motion (delta mode).
    pub wrap_threshold_deg: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            mode: MappingMode::Delta,
            gain_x: 25.0,
            gain_y: 20.0,
            dead_zone_deg: 0.4,
            wrap_threshold_deg: 270.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenConfig {
    /// Screen center in pixels.
    pub fn center(&self) -> (i32, i32) {
        ((self.width / 2) as i32, (self.height / 2) as i32)
    }
}
