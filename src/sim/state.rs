//! Ball motion regimes and the balls that carry them
//!
//! The regime decides which friction law applies and which condition ends it:
//!
//! | regime     | friction   | ends when                 | next                  |
//! |------------|------------|---------------------------|-----------------------|
//! | Sliding    | `mu_slide` | contact velocity hits 0   | Rolling               |
//! | Rolling    | `mu_roll`  | speed hits 0              | Spinning / Stationary |
//! | Spinning   | `mu_spin`  | vertical spin hits 0      | Stationary            |
//! | Stationary | none       | external impulse only     |                       |

use serde::{Deserialize, Serialize};

use crate::constants::PhysicalConstants;
use crate::{Vec3, contact_velocity};

/// Motion regime of a ball
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallMotionState {
    Stationary = 0,
    Spinning = 1,
    Sliding = 2,
    Rolling = 3,
}

impl BallMotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BallMotionState::Stationary => "stationary",
            BallMotionState::Spinning => "spinning",
            BallMotionState::Sliding => "sliding",
            BallMotionState::Rolling => "rolling",
        }
    }

    /// Classify kinematic state, treating magnitudes below `tol` as zero
    ///
    /// Every comparison is a strict `< tol` against the same tolerance, so an
    /// input on a boundary classifies the same way on every call.
    pub fn classify(velocity: Vec3, angular_velocity: Vec3, radius: f64, tol: f64) -> Self {
        let u = contact_velocity(velocity, angular_velocity, radius);
        let no_slip = u.length() < tol;

        if velocity.length() < tol && no_slip {
            if angular_velocity.z.abs() < tol {
                BallMotionState::Stationary
            } else {
                BallMotionState::Spinning
            }
        } else if no_slip {
            BallMotionState::Rolling
        } else {
            BallMotionState::Sliding
        }
    }

    /// Friction coefficient governing this regime
    pub fn friction_coefficient(&self, constants: &PhysicalConstants) -> f64 {
        match self {
            BallMotionState::Stationary => 0.0,
            BallMotionState::Spinning => constants.mu_spin,
            BallMotionState::Sliding => constants.mu_slide,
            BallMotionState::Rolling => constants.mu_roll,
        }
    }

    /// Whether the ball is translating
    pub fn is_moving(&self) -> bool {
        matches!(self, BallMotionState::Sliding | BallMotionState::Rolling)
    }
}

/// Time for a sliding ball's contact velocity to decay to zero
pub fn slide_time(velocity: Vec3, angular_velocity: Vec3, constants: &PhysicalConstants) -> f64 {
    let u = contact_velocity(velocity, angular_velocity, constants.ball_radius);
    2.0 * u.length() / (7.0 * constants.mu_slide * constants.g)
}

/// Time for a rolling ball to come to rest
pub fn roll_time(velocity: Vec3, constants: &PhysicalConstants) -> f64 {
    velocity.length() / (constants.mu_roll * constants.g)
}

/// Time for the vertical spin component to decay to zero
pub fn spin_time(angular_velocity: Vec3, constants: &PhysicalConstants) -> f64 {
    angular_velocity.z.abs() / constants.spin_deceleration()
}

/// A ball on the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: String,
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub radius: f64,
    pub state: BallMotionState,
}

impl Ball {
    /// Ball at rest at `position`
    pub fn new(id: impl Into<String>, position: Vec3, constants: &PhysicalConstants) -> Self {
        Self {
            id: id.into(),
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            radius: constants.ball_radius,
            state: BallMotionState::Stationary,
        }
    }

    /// Contact-point velocity
    pub fn contact_velocity(&self) -> Vec3 {
        contact_velocity(self.velocity, self.angular_velocity, self.radius)
    }

    /// Re-evaluate the motion regime from current kinematics
    ///
    /// Returns the previous state when it changed. Call after every kinematic
    /// update; a stale state selects the wrong friction law.
    pub fn reclassify(&mut self, tol: f64) -> Option<BallMotionState> {
        let next =
            BallMotionState::classify(self.velocity, self.angular_velocity, self.radius, tol);
        if next != self.state {
            let prev = self.state;
            self.state = next;
            Some(prev)
        } else {
            None
        }
    }

    /// Time until the current regime ends on its own (infinite when stationary)
    pub fn time_to_transition(&self, constants: &PhysicalConstants) -> f64 {
        match self.state {
            BallMotionState::Stationary => f64::INFINITY,
            BallMotionState::Spinning => spin_time(self.angular_velocity, constants),
            BallMotionState::Sliding => slide_time(self.velocity, self.angular_velocity, constants),
            BallMotionState::Rolling => roll_time(self.velocity, constants),
        }
    }

    /// Set new kinematics (cue strike or other impulse) and reclassify
    pub fn apply_impulse(
        &mut self,
        velocity: Vec3,
        angular_velocity: Vec3,
        tol: f64,
    ) -> Option<BallMotionState> {
        self.velocity = velocity;
        self.angular_velocity = angular_velocity;
        self.reclassify(tol)
    }

    /// Translational + rotational kinetic energy
    pub fn kinetic_energy(&self, constants: &PhysicalConstants) -> f64 {
        0.5 * constants.ball_mass * self.velocity.length_squared()
            + 0.5 * constants.ball_inertia() * self.angular_velocity.length_squared()
    }
}
