//! Cue strike impulse
//!
//! A cue of mass `M` moving at `V0` hits the ball at a point offset by `a`
//! (side english) and `b` (follow/draw) ball radii from center, with the cue
//! elevated by `theta` and aimed along `phi`. The impact is instantaneous and
//! the cue tip does not slip on the ball.

use serde::{Deserialize, Serialize};

use crate::constants::PhysicalConstants;
use crate::error::{SimError, SimResult};
use crate::{Vec3, rotate_z};

/// Cue stroke parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueStrike {
    /// Cue speed at impact (m/s)
    pub speed: f64,
    /// Aim direction in the table plane, counterclockwise from +x (degrees)
    pub phi: f64,
    /// Cue elevation above horizontal (degrees)
    pub theta: f64,
    /// Horizontal contact offset, in ball radii (positive = right english)
    pub a: f64,
    /// Vertical contact offset, in ball radii (positive = follow)
    pub b: f64,
}

impl Default for CueStrike {
    fn default() -> Self {
        Self {
            speed: 2.0,
            phi: 90.0,
            theta: 0.0,
            a: 0.0,
            b: 0.0,
        }
    }
}

impl CueStrike {
    pub fn new(speed: f64, phi: f64) -> Self {
        Self {
            speed,
            phi,
            ..Self::default()
        }
    }

    pub fn with_english(mut self, a: f64, b: f64) -> Self {
        self.a = a;
        self.b = b;
        self
    }

    pub fn with_elevation(mut self, theta: f64) -> Self {
        self.theta = theta;
        self
    }

    fn validate(&self) -> SimResult<()> {
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return Err(SimError::InvalidArgument(format!("cue speed {}", self.speed)));
        }
        if !self.phi.is_finite() {
            return Err(SimError::InvalidArgument(format!("cue aim {}", self.phi)));
        }
        if !(0.0..90.0).contains(&self.theta) {
            return Err(SimError::InvalidArgument(format!("cue elevation {}", self.theta)));
        }
        if !(self.a * self.a + self.b * self.b < 1.0) {
            return Err(SimError::InvalidArgument(format!(
                "cue contact ({}, {}) misses the ball",
                self.a, self.b
            )));
        }
        Ok(())
    }
}

/// Ball velocity and angular velocity right after the strike
///
/// The vertical velocity component is discarded: the ball stays on the cloth.
pub fn strike(constants: &PhysicalConstants, cue: &CueStrike) -> SimResult<(Vec3, Vec3)> {
    cue.validate()?;

    let m = constants.ball_mass;
    let big_m = constants.cue_mass;
    let r = constants.ball_radius;
    let inertia = constants.ball_inertia();

    let a = cue.a * r;
    let b = cue.b * r;
    let c = (r * r - a * a - b * b).sqrt();
    let (sin_t, cos_t) = cue.theta.to_radians().sin_cos();

    let offset = a * a + (b * cos_t).powi(2) + (c * sin_t).powi(2) - 2.0 * b * c * cos_t * sin_t;
    let force = 2.0 * m * cue.speed / (1.0 + m / big_m + 5.0 / (2.0 * r * r) * offset);

    // Ball frame: the cue pushes along -y
    let v_ball = -force / m * Vec3::new(0.0, cos_t, sin_t);
    let w_ball = force / inertia * Vec3::new(-c * sin_t + b * cos_t, a * sin_t, -a * cos_t);

    let rot = cue.phi.to_radians() + std::f64::consts::FRAC_PI_2;
    let mut v = rotate_z(v_ball, rot);
    let w = rotate_z(w_ball, rot);
    v.z = 0.0;

    Ok((v, w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BallMotionState;
    use proptest::prelude::*;

    const C: PhysicalConstants = PhysicalConstants::STANDARD;

    fn cue_energy(speed: f64) -> f64 {
        0.5 * C.cue_mass * speed * speed
    }

    fn ball_energy(v: Vec3, w: Vec3) -> f64 {
        0.5 * C.ball_mass * v.length_squared() + 0.5 * C.ball_inertia() * w.length_squared()
    }

    #[test]
    fn test_center_ball_hit() {
        let v0 = 2.0;
        let (v, w) = strike(&C, &CueStrike::new(v0, 0.0)).unwrap();
        // Elastic head-on impact of the cue with a free ball
        let expected = 2.0 * v0 / (1.0 + C.ball_mass / C.cue_mass);
        assert!((v - Vec3::new(expected, 0.0, 0.0)).length() < 1e-9);
        assert!(v.length() <= 2.0 * v0);
        assert!(ball_energy(v, w) <= cue_energy(v0));
        assert!(w.length() < 1e-9);
        assert_eq!(
            BallMotionState::classify(v, w, C.ball_radius, 1e-9),
            BallMotionState::Sliding
        );
    }

    #[test]
    fn test_aim_direction() {
        let (v, _) = strike(&C, &CueStrike::new(1.0, 90.0)).unwrap();
        assert!(v.x.abs() < 1e-9 && v.y > 0.0);
        let (v, _) = strike(&C, &CueStrike::new(1.0, 225.0)).unwrap();
        assert!((v.normalize() - Vec3::new(-1.0, -1.0, 0.0).normalize()).length() < 1e-9);
    }

    #[test]
    fn test_follow_adds_topspin() {
        let (v, w) = strike(&C, &CueStrike::new(2.0, 0.0).with_english(0.0, 0.4)).unwrap();
        // Forward roll along +x is spin about +y
        assert!(w.y > 0.0);
        assert!(w.y * C.ball_radius < v.x * 1.5);
        assert!(w.z.abs() < 1e-9);
    }

    #[test]
    fn test_side_english_adds_vertical_spin() {
        let (_, w) = strike(&C, &CueStrike::new(2.0, 0.0).with_english(0.5, 0.0)).unwrap();
        // Right english spins clockwise seen from above
        assert!(w.z < 0.0);
    }

    #[test]
    fn test_velocity_stays_on_cloth() {
        let (v, _) = strike(&C, &CueStrike::new(3.0, 30.0).with_elevation(20.0)).unwrap();
        assert_eq!(v.z, 0.0);
    }

    proptest! {
        #[test]
        fn strike_never_outputs_more_energy_than_cue(
            speed in 0.0f64..8.0,
            phi in 0.0f64..360.0,
            theta in 0.0f64..80.0,
            r in 0.0f64..0.95,
            angle in 0.0f64..std::f64::consts::TAU,
        ) {
            let cue = CueStrike::new(speed, phi)
                .with_english(r * angle.cos(), r * angle.sin())
                .with_elevation(theta);
            let (v, w) = strike(&C, &cue).unwrap();
            prop_assert!(v.length() <= 2.0 * speed + 1e-12);
            prop_assert!(ball_energy(v, w) <= cue_energy(speed) * (1.0 + 1e-12) + 1e-15);
        }
    }

    #[test]
    fn test_invalid_strikes_rejected() {
        let bad = [
            CueStrike::new(-1.0, 0.0),
            CueStrike::new(1.0, 0.0).with_english(0.8, 0.8),
            CueStrike::new(1.0, 0.0).with_elevation(90.0),
            CueStrike::new(f64::NAN, 0.0),
        ];
        for cue in bad {
            assert!(matches!(strike(&C, &cue), Err(SimError::InvalidArgument(_))), "{cue:?}");
        }
    }
}
