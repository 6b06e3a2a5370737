//! Simulation of one table and its balls
//!
//! A `Simulation` owns everything a run mutates: balls, event log and
//! trajectory history. The table and constants are read-only once it is
//! created, so independent simulations can run on separate threads.

use std::collections::BTreeMap;

use serde::Serialize;

use super::cue::{CueStrike, strike};
use super::history::TrajectoryHistory;
use super::state::{Ball, BallMotionState};
use super::table::Table;
use super::tick::tick;
use crate::Vec3;
use crate::constants::PhysicalConstants;
use crate::error::{SimError, SimResult};
use crate::settings::SimSettings;

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Cue (or other external impulse) set the ball in motion
    Strike { time: f64, ball: String },
    /// Ball bounced off a cushion segment
    Collision {
        time: f64,
        ball: String,
        segment: String,
        normal: Vec3,
    },
    /// Ball changed motion regime
    Transition {
        time: f64,
        ball: String,
        from: BallMotionState,
        to: BallMotionState,
    },
}

impl Event {
    pub fn time(&self) -> f64 {
        match self {
            Event::Strike { time, .. }
            | Event::Collision { time, .. }
            | Event::Transition { time, .. } => *time,
        }
    }
}

/// Outcome of [`Simulation::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub time: f64,
    pub settled: bool,
    pub collisions: usize,
    pub transitions: usize,
}

/// One table, its balls and the record of a shot
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(crate) constants: PhysicalConstants,
    pub(crate) settings: SimSettings,
    pub(crate) table: Table,
    /// Balls by id (id order is the update order)
    pub(crate) balls: BTreeMap<String, Ball>,
    pub(crate) time: f64,
    pub(crate) frame: u64,
    pub(crate) events: Vec<Event>,
    pub(crate) history: TrajectoryHistory,
}

impl Simulation {
    pub fn new(
        table: Table,
        constants: PhysicalConstants,
        settings: SimSettings,
    ) -> SimResult<Self> {
        settings.validate()?;
        Ok(Self {
            constants,
            settings,
            table,
            balls: BTreeMap::new(),
            time: 0.0,
            frame: 0,
            events: Vec::new(),
            history: TrajectoryHistory::new(),
        })
    }

    /// Place a ball at rest
    pub fn add_ball(&mut self, id: impl Into<String>, position: Vec3) -> SimResult<()> {
        let id = id.into();
        if self.balls.contains_key(&id) {
            return Err(SimError::DuplicateId(id));
        }
        let ball = Ball::new(id.clone(), position, &self.constants);
        self.history.record(&ball, self.frame, self.time)?;
        self.balls.insert(id, ball);
        Ok(())
    }

    /// Strike a ball with the cue
    pub fn strike(&mut self, id: &str, cue: &CueStrike) -> SimResult<()> {
        let (velocity, angular_velocity) = strike(&self.constants, cue)?;
        log::info!(
            "Strike '{}': V0={} phi={} theta={} a={} b={}",
            id,
            cue.speed,
            cue.phi,
            cue.theta,
            cue.a,
            cue.b
        );
        self.set_motion(id, velocity, angular_velocity)
    }

    /// Apply an external impulse: overwrite the ball's velocities
    pub fn set_motion(
        &mut self,
        id: &str,
        velocity: Vec3,
        angular_velocity: Vec3,
    ) -> SimResult<()> {
        let tol = self.settings.tolerance;
        let ball = self
            .balls
            .get_mut(id)
            .ok_or_else(|| SimError::InvalidArgument(format!("no ball '{id}'")))?;

        let prev = ball.apply_impulse(velocity, angular_velocity, tol);
        self.events.push(Event::Strike {
            time: self.time,
            ball: id.to_string(),
        });
        if let Some(prev) = prev {
            self.events.push(Event::Transition {
                time: self.time,
                ball: id.to_string(),
                from: prev,
                to: ball.state,
            });
        }
        Ok(())
    }

    /// Advance every ball by one time step
    pub fn step(&mut self) -> SimResult<()> {
        tick(self)
    }

    /// Step until every ball is stationary or the step cap is reached
    pub fn run(&mut self) -> SimResult<RunSummary> {
        let mut steps = 0;
        while !self.is_settled() && steps < self.settings.max_steps {
            self.step()?;
            steps += 1;
        }

        let settled = self.is_settled();
        if !settled {
            log::warn!("Run stopped at step cap ({} steps, t={:.3}s)", steps, self.time);
        }

        let summary = RunSummary {
            steps,
            time: self.time,
            settled,
            collisions: self.count_events(|e| matches!(e, Event::Collision { .. })),
            transitions: self.count_events(|e| matches!(e, Event::Transition { .. })),
        };
        log::info!(
            "Run finished: {} steps, t={:.3}s, {} cushion hits",
            summary.steps,
            summary.time,
            summary.collisions
        );
        Ok(summary)
    }

    /// Start a new shot from the current ball positions
    ///
    /// Clears time, events and history; balls keep their positions and come
    /// to rest.
    pub fn new_shot(&mut self) -> SimResult<()> {
        self.time = 0.0;
        self.frame = 0;
        self.events.clear();
        self.history.clear();
        for ball in self.balls.values_mut() {
            let position = ball.position;
            *ball = Ball::new(ball.id.clone(), position, &self.constants);
            self.history.record(ball, 0, 0.0)?;
        }
        Ok(())
    }

    pub fn is_settled(&self) -> bool {
        self.balls.values().all(|b| b.state == BallMotionState::Stationary)
    }

    pub fn ball(&self, id: &str) -> Option<&Ball> {
        self.balls.get(id)
    }

    pub fn balls(&self) -> impl Iterator<Item = &Ball> {
        self.balls.values()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.constants
    }

    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn history(&self) -> &TrajectoryHistory {
        &self.history
    }

    fn count_events(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
