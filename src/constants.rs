//! Physical constants registry
//!
//! All units are SI. Values follow the Dr. Dave billiards physical-properties
//! tables for a 9-foot table.

use serde::{Deserialize, Serialize};

/// Immutable set of physical constants shared by every component of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Gravitational acceleration (m/s²)
    pub g: f64,
    /// Cue stick mass (kg)
    pub cue_mass: f64,
    /// Ball mass (kg)
    pub ball_mass: f64,
    /// Ball radius (m)
    pub ball_radius: f64,
    /// Sliding friction coefficient
    pub mu_slide: f64,
    /// Rolling friction coefficient
    pub mu_roll: f64,
    /// Spinning friction coefficient
    pub mu_spin: f64,
    /// Playing surface length (m)
    pub table_length: f64,
    /// Playing surface width (m)
    pub table_width: f64,
    /// Rail edge width, for display (m)
    pub edge_width: f64,
    /// Cushion width, for display (m)
    pub cushion_width: f64,
    /// Height of the cushion contact plane above the cloth (m)
    pub cushion_height: f64,
    /// Cloth height above the floor, for display (m)
    pub table_height: f64,
    /// Light fixture height, for display (m)
    pub lights_height: f64,
}

const BALL_RADIUS: f64 = 0.028575;
const TABLE_LENGTH: f64 = 2.7432;

impl PhysicalConstants {
    pub const STANDARD: PhysicalConstants = PhysicalConstants {
        g: 9.8,
        cue_mass: 0.567,
        ball_mass: 0.170097,
        ball_radius: BALL_RADIUS,
        mu_slide: 0.2,
        mu_roll: 0.01,
        mu_spin: 10.0 * 2.0 / 5.0 * BALL_RADIUS / 9.0,
        table_length: TABLE_LENGTH,
        table_width: TABLE_LENGTH / 2.0,
        edge_width: 0.03,
        cushion_width: 2.0 * 2.54 / 100.0,
        cushion_height: 0.64 * 2.0 * BALL_RADIUS,
        table_height: 0.708,
        lights_height: 1.99,
    };

    /// Moment of inertia of a solid ball: I = 2/5 m R²
    pub fn ball_inertia(&self) -> f64 {
        2.0 / 5.0 * self.ball_mass * self.ball_radius * self.ball_radius
    }

    /// Angular deceleration of the vertical spin component (rad/s²)
    pub fn spin_deceleration(&self) -> f64 {
        5.0 * self.mu_spin * self.g / (2.0 * self.ball_radius)
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::STANDARD
    }
}
