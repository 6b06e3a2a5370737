//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No randomness
//! - Stable iteration order (balls and segments by id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod cue;
pub mod history;
pub mod segment;
pub mod shot;
pub mod state;
pub mod table;
pub mod tick;

pub use collision::{
    CushionContact, ball_cushion_contact, reflect_velocity, resolve_cushion_collision,
};
pub use cue::{CueStrike, strike};
pub use history::{BallHistory, Sample, TrajectoryHistory};
pub use segment::{CircularSegment, CushionKind, CushionSegment, LinearSegment};
pub use shot::{Event, RunSummary, Simulation};
pub use state::{Ball, BallMotionState};
pub use table::{Table, TableBuilder};
pub use tick::{Transition, evolve, tick};
