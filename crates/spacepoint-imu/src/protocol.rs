use crate::types::{Buttons, QuatFrame, SensorFrame};
use glam::{DQuat, DVec3, IVec3};
use thiserror::Error;

/// Minimum length of a "Raw Interface" report (report id + 19 data bytes).
pub const RAW_REPORT_LEN: usize = 20;
/// Minimum length of a "Quaternions" report (report id + 14 data bytes).
pub const QUAT_REPORT_LEN: usize = 15;

/// Raw channel field offsets. Byte 0 is the report id.
const MAGNETOMETER_OFFSET: usize = 1;
const ACCELEROMETER_OFFSET: usize = 7;
const GYROSCOPE_OFFSET: usize = 13;
const BUTTONS_OFFSET: usize = 19;

/// Quaternion channel field offsets.
const GRAVITY_OFFSET: usize = 1;
const QUATERNION_OFFSET: usize = 7;

/// Bias applied to the signed quaternion channel fields.
const FIELD_BIAS: f64 = 32768.0;
/// Full-scale magnitude of the quaternion components.
const QUATERNION_RANGE: f64 = 1.0;
/// Full-scale magnitude of the gravity components.
const GRAVITY_RANGE: f64 = 6.0;

const BUTTON_LEFT: u8 = 0b01;
const BUTTON_RIGHT: u8 = 0b10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Report truncated: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Decode a "Raw Interface" report.
pub fn decode_raw(data: &[u8]) -> Result<SensorFrame, DecodeError> {
    check_len(data, RAW_REPORT_LEN)?;

    let status = data[BUTTONS_OFFSET];
    Ok(SensorFrame {
        magnetometer: axes(data, MAGNETOMETER_OFFSET),
        accelerometer: axes(data, ACCELEROMETER_OFFSET),
        gyroscope: axes(data, GYROSCOPE_OFFSET),
        buttons: Buttons {
            left: status & BUTTON_LEFT != 0,
            right: status & BUTTON_RIGHT != 0,
        },
    })
}

/// Decode a "Quaternions" report.
pub fn decode_quat(data: &[u8]) -> Result<QuatFrame, DecodeError> {
    check_len(data, QUAT_REPORT_LEN)?;

    let gravity = DVec3::new(
        biased(data, GRAVITY_OFFSET, GRAVITY_RANGE),
        biased(data, GRAVITY_OFFSET + 2, GRAVITY_RANGE),
        biased(data, GRAVITY_OFFSET + 4, GRAVITY_RANGE),
    );

    let quaternion = DQuat::from_xyzw(
        biased(data, QUATERNION_OFFSET, QUATERNION_RANGE),
        biased(data, QUATERNION_OFFSET + 2, QUATERNION_RANGE),
        biased(data, QUATERNION_OFFSET + 4, QUATERNION_RANGE),
        biased(data, QUATERNION_OFFSET + 6, QUATERNION_RANGE),
    );

    Ok(QuatFrame {
        quaternion,
        gravity,
    })
}

fn check_len(data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() < expected {
        return Err(DecodeError::Truncated {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Little-endian u16 at `offset`.
fn word(data: &[u8], offset: usize) -> u16 {
    u16::from(data[offset]) | (u16::from(data[offset + 1]) << 8)
}

/// Three consecutive unsigned words starting at `offset`.
fn axes(data: &[u8], offset: usize) -> IVec3 {
    IVec3::new(
        i32::from(word(data, offset)),
        i32::from(word(data, offset + 2)),
        i32::from(word(data, offset + 4)),
    )
}

/// Offset-binary word mapped to `[-range, range)`.
fn biased(data: &[u8], offset: usize, range: f64) -> f64 {
    (f64::from(word(data, offset)) - FIELD_BIAS) * range / FIELD_BIAS
}
