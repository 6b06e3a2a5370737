//! Pool Sim - cushion geometry and ball motion-state physics for pool tables
//!
//! Core modules:
//! - `constants`: Physical constants registry (SI units)
//! - `sim`: Deterministic simulation (segments, table, state machine, stepper, history)
//! - `settings`: Run configuration loaded from JSON
//! - `error`: Error kinds raised by the kernel

pub mod constants;
pub mod error;
pub mod settings;
pub mod sim;

pub use constants::PhysicalConstants;
pub use error::{SettingsError, SimError, SimResult};
pub use settings::{SimSettings, StepPreset};

use glam::DVec3;

/// 3D vector used for positions, velocities and angular velocities (meters, m/s, rad/s)
pub type Vec3 = DVec3;

/// Vertical unit vector (table normal)
pub const Z_AXIS: Vec3 = DVec3::Z;

/// Drop the z-component of a vector
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

/// Rotate a vector about the z-axis by `angle` radians
#[inline]
pub fn rotate_z(v: Vec3, angle: f64) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// Velocity of the ball's surface point touching the cloth
///
/// `u = v + R (z × w)`; zero exactly when the ball rolls without slipping.
#[inline]
pub fn contact_velocity(velocity: Vec3, angular_velocity: Vec3, radius: f64) -> Vec3 {
    velocity + radius * Z_AXIS.cross(angular_velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_z_quarter_turn() {
        let v = rotate_z(Vec3::X, FRAC_PI_2);
        assert!((v - Vec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_contact_velocity_zero_when_rolling() {
        let r = 0.028575;
        let v = Vec3::new(1.0, 0.0, 0.0);
        // Forward roll along +x spins about +y
        let w = Vec3::new(0.0, 1.0 / r, 0.0);
        assert!(contact_velocity(v, w, r).length() < 1e-12);
    }

    #[test]
    fn test_horizontal_drops_z() {
        assert_eq!(horizontal(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 0.0));
    }
}
