//! Math type re-exports and placement math.
//!
//! OBJ8 and ACF data are all double precision, so only the `f64` glam
//! types are re-exported here.

pub use glam::{DMat3, DVec2, DVec3};

/// Conversion factor from ACF feet to OBJ8 metres.
pub const FEET_TO_METERS: f64 = 0.3048;

/// Roll about Z, clockwise when looking down the axis.
///
/// `x' = x·cosφ + y·sinφ`, `y' = −x·sinφ + y·cosφ`.
#[inline]
pub fn roll_matrix(phi_deg: f64) -> DMat3 {
    DMat3::from_rotation_z(-phi_deg.to_radians())
}

/// Pitch about X.
///
/// `y' = y·cosθ − z·sinθ`, `z' = y·sinθ + z·cosθ`.
#[inline]
pub fn pitch_matrix(theta_deg: f64) -> DMat3 {
    DMat3::from_rotation_x(theta_deg.to_radians())
}

/// Yaw about Y, clockwise when looking down the axis.
///
/// `x' = x·cosψ − z·sinψ`, `z' = x·sinψ + z·cosψ`.
#[inline]
pub fn yaw_matrix(psi_deg: f64) -> DMat3 {
    DMat3::from_rotation_y(-psi_deg.to_radians())
}

/// Rotate a position by roll, then pitch, then yaw (angles in degrees).
pub fn rotate_roll_pitch_yaw(p: DVec3, psi: f64, theta: f64, phi: f64) -> DVec3 {
    let p = roll_matrix(phi) * p;
    let p = pitch_matrix(theta) * p;
    yaw_matrix(psi) * p
}
