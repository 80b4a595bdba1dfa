use crate::types::Orientation;
use glam::DQuat;

/// Convert a device quaternion (`x..w` = `q0..q3`) to Euler angles in degrees.
///
/// Stateless; the same input always yields bit-identical output.
pub fn to_euler(q: DQuat) -> Orientation {
    let (q0, q1, q2, q3) = (q.x, q.y, q.z, q.w);
    let (s0, s1, s2, s3) = (q0 * q0, q1 * q1, q2 * q2, q3 * q3);

    let yaw = f64::atan2(2.0 * (q0 * q1 + q2 * q3), s0 - s1 - s2 + s3);
    // Slightly non-unit quaternions can push this past +-1.
    let pitch = (-2.0 * (q0 * q2 - q1 * q3)).clamp(-1.0, 1.0).asin();
    let roll = f64::atan2(2.0 * (q1 * q2 + q0 * q3), -s0 - s1 + s2 + s3);

    Orientation {
        yaw: yaw.to_degrees(),
        pitch: pitch.to_degrees(),
        roll: roll.to_degrees(),
    }
}
