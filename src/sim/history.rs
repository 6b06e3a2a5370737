//! Per-ball trajectory history
//!
//! Append-only record of each ball's kinematics, one sample per frame, read by
//! a renderer as a passive time series. Orientation is never stored: it is
//! integrated from the angular velocity samples whenever asked for.

use std::collections::BTreeMap;

use glam::{DQuat, EulerRot};
use serde::{Deserialize, Serialize};

use super::state::{Ball, BallMotionState};
use crate::Vec3;
use crate::error::{SimError, SimResult};

/// Kinematic snapshot of one ball at one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub frame: u64,
    pub time: f64,
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub state: BallMotionState,
}

/// Samples of a single ball, in frame order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BallHistory {
    samples: Vec<Sample>,
}

impl BallHistory {
    /// Append a sample; frames and times must not go backwards
    pub fn push(&mut self, sample: Sample) -> SimResult<()> {
        if let Some(last) = self.samples.last() {
            if sample.frame <= last.frame || sample.time < last.time {
                return Err(SimError::InvalidArgument(format!(
                    "history sample for frame {} (t={}) does not follow frame {} (t={})",
                    sample.frame, sample.time, last.frame, last.time
                )));
            }
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample recorded at `frame`, if any
    pub fn get(&self, frame: u64) -> Option<&Sample> {
        self.samples
            .binary_search_by_key(&frame, |s| s.frame)
            .ok()
            .map(|i| &self.samples[i])
    }

    /// Orientation at every sample, starting from identity
    ///
    /// Each interval rotates by the trapezoidal mean of its end angular
    /// velocities (world frame) times its duration.
    pub fn orientations(&self) -> Vec<DQuat> {
        let mut out = Vec::with_capacity(self.samples.len());
        let mut q = DQuat::IDENTITY;

        for (i, sample) in self.samples.iter().enumerate() {
            if i > 0 {
                let prev = &self.samples[i - 1];
                let dt = sample.time - prev.time;
                let w = 0.5 * (prev.angular_velocity + sample.angular_velocity);
                q = (DQuat::from_scaled_axis(w * dt) * q).normalize();
            }
            out.push(q);
        }

        out
    }

    /// Orientation at every sample as (heading, pitch, roll) in radians
    ///
    /// Z-Y-X convention, derived from [`BallHistory::orientations`].
    pub fn euler_angles(&self) -> Vec<Vec3> {
        self.orientations()
            .into_iter()
            .map(|q| {
                let (heading, pitch, roll) = q.to_euler(EulerRot::ZYX);
                Vec3::new(heading, pitch, roll)
            })
            .collect()
    }
}

/// Trajectory histories of every ball in a run, keyed by ball id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryHistory {
    balls: BTreeMap<String, BallHistory>,
}

impl TrajectoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the ball's current kinematics as the sample for `frame`
    pub fn record(&mut self, ball: &Ball, frame: u64, time: f64) -> SimResult<()> {
        self.balls.entry(ball.id.clone()).or_default().push(Sample {
            frame,
            time,
            position: ball.position,
            velocity: ball.velocity,
            angular_velocity: ball.angular_velocity,
            state: ball.state,
        })
    }

    pub fn ball(&self, id: &str) -> Option<&BallHistory> {
        self.balls.get(id)
    }

    /// Sample of ball `id` at `frame`
    pub fn frame(&self, id: &str, frame: u64) -> Option<&Sample> {
        self.balls.get(id).and_then(|h| h.get(frame))
    }

    /// Length of the longest ball history
    pub fn num_frames(&self) -> usize {
        self.balls.values().map(BallHistory::len).max().unwrap_or(0)
    }

    pub fn ball_ids(&self) -> impl Iterator<Item = &str> {
        self.balls.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.balls.clear();
    }

    /// Export for a renderer
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PhysicalConstants;
    use std::f64::consts::PI;

    const C: PhysicalConstants = PhysicalConstants::STANDARD;

    fn spinning_history(w: Vec3, frames: u64, dt: f64) -> BallHistory {
        let mut history = BallHistory::default();
        for frame in 0..frames {
            history
                .push(Sample {
                    frame,
                    time: frame as f64 * dt,
                    position: Vec3::ZERO,
                    velocity: Vec3::ZERO,
                    angular_velocity: w,
                    state: BallMotionState::Spinning,
                })
                .unwrap();
        }
        history
    }

    #[test]
    fn test_record_and_lookup_by_frame() {
        let mut history = TrajectoryHistory::new();
        let mut ball = Ball::new("cue", Vec3::new(0.2, 0.3, 0.0), &C);
        history.record(&ball, 0, 0.0).unwrap();
        ball.position.x = 0.25;
        history.record(&ball, 1, 0.01).unwrap();

        assert_eq!(history.num_frames(), 2);
        assert_eq!(history.frame("cue", 1).unwrap().position.x, 0.25);
        assert!(history.frame("cue", 2).is_none());
        assert!(history.frame("8", 0).is_none());
        assert_eq!(history.ball_ids().collect::<Vec<_>>(), vec!["cue"]);
    }

    #[test]
    fn test_history_is_append_only() {
        let mut history = TrajectoryHistory::new();
        let ball = Ball::new("cue", Vec3::ZERO, &C);
        history.record(&ball, 3, 0.03).unwrap();
        assert!(matches!(history.record(&ball, 3, 0.03), Err(SimError::InvalidArgument(_))));
        assert!(matches!(history.record(&ball, 2, 0.04), Err(SimError::InvalidArgument(_))));
        assert_eq!(history.ball("cue").unwrap().len(), 1);
    }

    #[test]
    fn test_constant_spin_rotates_by_w_t() {
        // Half a turn about z over one second
        let history = spinning_history(Vec3::new(0.0, 0.0, PI), 101, 0.01);
        let q = *history.orientations().last().unwrap();
        let (axis, angle) = q.to_axis_angle();
        assert!((angle - PI).abs() < 1e-9);
        assert!((axis - Vec3::Z).length() < 1e-9);
    }

    #[test]
    fn test_orientation_starts_at_identity() {
        let history = spinning_history(Vec3::new(3.0, -1.0, 2.0), 5, 0.01);
        assert_eq!(history.orientations()[0], DQuat::IDENTITY);
        assert!(history.euler_angles()[0].length() < 1e-12);
    }

    #[test]
    fn test_orientation_is_recomputable() {
        let history = spinning_history(Vec3::new(10.0, 5.0, -2.0), 50, 1.0 / 240.0);
        assert_eq!(history.orientations(), history.orientations());
        assert_eq!(history.euler_angles(), history.euler_angles());
    }

    #[test]
    fn test_euler_and_quaternion_agree() {
        let mut history = BallHistory::default();
        for frame in 0..200u64 {
            let t = frame as f64 / 120.0;
            history
                .push(Sample {
                    frame,
                    time: t,
                    position: Vec3::ZERO,
                    velocity: Vec3::ZERO,
                    angular_velocity: Vec3::new(20.0 * t.sin(), 35.0, 5.0 - 3.0 * t),
                    state: BallMotionState::Sliding,
                })
                .unwrap();
        }

        for (q, e) in history.orientations().iter().zip(history.euler_angles()) {
            let from_euler = DQuat::from_euler(EulerRot::ZYX, e.x, e.y, e.z);
            // q and -q are the same rotation
            assert!((q.dot(from_euler).abs() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_json_export() {
        let mut history = TrajectoryHistory::new();
        history.record(&Ball::new("cue", Vec3::ZERO, &C), 0, 0.0).unwrap();
        let json = history.to_json().unwrap();
        let back: TrajectoryHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.frame("cue", 0).unwrap().state, BallMotionState::Stationary);
    }
}
