//! Fixed timestep simulation tick
//!
//! Each regime has a closed-form solution over an interval of constant
//! friction, so a step is split at every regime boundary that falls inside it
//! and each piece is evolved exactly. Transitions land at their analytic time
//! instead of at the next step edge.

use serde::Serialize;

use super::collision::{ball_cushion_contact, resolve_cushion_collision};
use super::shot::{Event, Simulation};
use super::state::{Ball, BallMotionState};
use crate::constants::PhysicalConstants;
use crate::error::SimResult;
use crate::{Vec3, Z_AXIS, horizontal};

/// Regime boundaries handled inside one call to [`evolve`]
const MAX_PIECES_PER_STEP: usize = 8;
/// Largest distance (in ball radii) a ball may travel in one substep
const MAX_TRAVEL_RADII: f64 = 0.5;

/// A regime change inside an evolution interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transition {
    /// Offset from the start of the interval (seconds)
    pub at: f64,
    pub from: BallMotionState,
    pub to: BallMotionState,
}

/// Advance one ball by `dt` under the friction laws of its regimes
///
/// The ball is reclassified after every piece. Stationary balls are left
/// untouched.
pub fn evolve(
    ball: &mut Ball,
    constants: &PhysicalConstants,
    tol: f64,
    dt: f64,
) -> Vec<Transition> {
    let mut transitions = Vec::new();
    let mut elapsed = 0.0;

    if let Some(prev) = ball.reclassify(tol) {
        transitions.push(Transition {
            at: 0.0,
            from: prev,
            to: ball.state,
        });
    }

    for _ in 0..MAX_PIECES_PER_STEP {
        let remaining = dt - elapsed;
        if remaining <= 0.0 || ball.state == BallMotionState::Stationary {
            break;
        }

        let t_end = ball.time_to_transition(constants);
        let tau = t_end.min(remaining);

        match ball.state {
            BallMotionState::Sliding => evolve_slide(ball, constants, tau),
            BallMotionState::Rolling => evolve_roll(ball, constants, tau),
            BallMotionState::Spinning => evolve_spin(ball, constants, tau),
            BallMotionState::Stationary => {}
        }

        if t_end <= remaining {
            snap_regime_end(ball);
        }

        elapsed += tau;

        if let Some(prev) = ball.reclassify(tol) {
            transitions.push(Transition {
                at: elapsed,
                from: prev,
                to: ball.state,
            });
        }
    }

    transitions
}

/// Vertical spin after `tau` seconds of spinning friction
fn decay_spin(wz: f64, constants: &PhysicalConstants, tau: f64) -> f64 {
    let dec = constants.spin_deceleration() * tau;
    if wz.abs() <= dec { 0.0 } else { wz - dec * wz.signum() }
}

fn evolve_slide(ball: &mut Ball, c: &PhysicalConstants, tau: f64) {
    let u_hat = horizontal(ball.contact_velocity()).normalize_or_zero();
    let decel = c.mu_slide * c.g;
    let wz = decay_spin(ball.angular_velocity.z, c, tau);

    ball.position += ball.velocity * tau - 0.5 * decel * tau * tau * u_hat;
    ball.velocity -= decel * tau * u_hat;
    ball.angular_velocity += (5.0 * decel * tau / (2.0 * ball.radius)) * Z_AXIS.cross(u_hat);
    ball.angular_velocity.z = wz;
}

fn evolve_roll(ball: &mut Ball, c: &PhysicalConstants, tau: f64) {
    let v_hat = horizontal(ball.velocity).normalize_or_zero();
    let decel = c.mu_roll * c.g;
    let wz = decay_spin(ball.angular_velocity.z, c, tau);

    ball.position += ball.velocity * tau - 0.5 * decel * tau * tau * v_hat;
    ball.velocity -= decel * tau * v_hat;
    ball.angular_velocity = rolling_spin(ball.velocity, ball.radius, wz);
}

fn evolve_spin(ball: &mut Ball, c: &PhysicalConstants, tau: f64) {
    ball.angular_velocity.z = decay_spin(ball.angular_velocity.z, c, tau);
}

/// Angular velocity of a ball rolling without slip at `velocity`
fn rolling_spin(velocity: Vec3, radius: f64, wz: f64) -> Vec3 {
    let w = Z_AXIS.cross(horizontal(velocity)) / radius;
    Vec3::new(w.x, w.y, wz)
}

/// Put the ball exactly on the far side of the boundary it just reached
fn snap_regime_end(ball: &mut Ball) {
    match ball.state {
        BallMotionState::Sliding => {
            ball.angular_velocity =
                rolling_spin(ball.velocity, ball.radius, ball.angular_velocity.z);
        }
        BallMotionState::Rolling => {
            ball.velocity = Vec3::ZERO;
            ball.angular_velocity = Vec3::new(0.0, 0.0, ball.angular_velocity.z);
        }
        BallMotionState::Spinning => {
            ball.angular_velocity.z = 0.0;
        }
        BallMotionState::Stationary => {}
    }
}

/// Substeps needed so no ball moves more than half a radius per substep
fn substeps_for(sim: &Simulation, dt: f64) -> u32 {
    let max_speed = sim
        .balls
        .values()
        .map(|b| b.velocity.length())
        .fold(0.0, f64::max);
    let travel = max_speed * dt / (MAX_TRAVEL_RADII * sim.constants.ball_radius);
    (travel.ceil() as u32).max(1)
}

/// Advance the simulation by one fixed timestep
///
/// Balls are evolved in id order. After each substep every moving ball is
/// checked against every cushion segment; a contact is resolved and the ball
/// reclassified on the spot. One history sample per ball is recorded at the
/// end of the tick.
pub fn tick(sim: &mut Simulation) -> SimResult<()> {
    let dt = sim.settings.time_step();
    let tol = sim.settings.tolerance;
    let slop = sim.settings.contact_slop;
    let restitution = sim.settings.cushion_restitution;

    let substeps = substeps_for(sim, dt);
    let sub_dt = dt / substeps as f64;

    for i in 0..substeps {
        let t0 = sim.time + sub_dt * i as f64;
        let t1 = t0 + sub_dt;

        for ball in sim.balls.values_mut() {
            if ball.state == BallMotionState::Stationary {
                continue;
            }

            for tr in evolve(ball, &sim.constants, tol, sub_dt) {
                log::debug!(
                    "t={:.5} ball '{}': {} -> {}",
                    t0 + tr.at,
                    ball.id,
                    tr.from.as_str(),
                    tr.to.as_str()
                );
                sim.events.push(Event::Transition {
                    time: t0 + tr.at,
                    ball: ball.id.clone(),
                    from: tr.from,
                    to: tr.to,
                });
            }

            for segment in sim.table.iter_segments() {
                let Some(contact) = ball_cushion_contact(ball, segment, slop)? else {
                    continue;
                };
                resolve_cushion_collision(ball, &contact, restitution);
                log::debug!("t={:.5} ball '{}' hit cushion '{}'", t1, ball.id, contact.segment_id);
                sim.events.push(Event::Collision {
                    time: t1,
                    ball: ball.id.clone(),
                    segment: contact.segment_id.clone(),
                    normal: contact.normal,
                });

                if let Some(prev) = ball.reclassify(tol) {
                    sim.events.push(Event::Transition {
                        time: t1,
                        ball: ball.id.clone(),
                        from: prev,
                        to: ball.state,
                    });
                }
            }
        }
    }

    sim.time += dt;
    sim.frame += 1;

    for ball in sim.balls.values() {
        sim.history.record(ball, sim.frame, sim.time)?;
    }

    Ok(())
}
