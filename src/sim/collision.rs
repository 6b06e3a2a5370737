//! Ball-cushion contact detection and response
//!
//! Contact is tested in the horizontal plane: cushions push on the ball
//! sideways only. The response keeps the tangential velocity, reverses the
//! normal component and scales it by the cushion restitution.

use serde::Serialize;

use super::segment::{CircularSegment, CushionSegment, LinearSegment};
use super::state::Ball;
use crate::error::SimResult;
use crate::{Vec3, horizontal};

/// Offsets shorter than this have no usable direction
const DIRECTION_EPS: f64 = 1e-12;

/// A ball touching a cushion segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CushionContact {
    pub segment_id: String,
    /// Horizontal unit normal pointing from the cushion toward the ball
    pub normal: Vec3,
    /// How far the ball overlaps the cushion (0 when just touching)
    pub penetration: f64,
}

/// Check whether `ball` touches `segment` while moving into it
///
/// A ball within `slop` of touching counts as touching. A ball already moving
/// away from the cushion is not in contact.
pub fn ball_cushion_contact(
    ball: &Ball,
    segment: &CushionSegment,
    slop: f64,
) -> SimResult<Option<CushionContact>> {
    let contact = match segment {
        CushionSegment::Linear(seg) => linear_contact(ball, seg, slop),
        CushionSegment::Circular(seg) => circular_contact(ball, seg, slop)?,
    };

    Ok(contact.filter(|c| ball.velocity.dot(c.normal) < 0.0))
}

fn linear_contact(ball: &Ball, seg: &LinearSegment, slop: f64) -> Option<CushionContact> {
    let (closest, t) = seg.project(ball.position);
    let offset = horizontal(ball.position - closest);
    let dist = offset.length();

    if dist > ball.radius + slop {
        return None;
    }

    let on_end_cap = t <= 0.0 || t >= 1.0;
    let normal = if on_end_cap && dist > DIRECTION_EPS {
        // Struck the tip of the segment
        offset / dist
    } else {
        // Fixed line normal, flipped to face the ball
        let n = seg.normal();
        let side = if dist > DIRECTION_EPS {
            n.dot(offset)
        } else {
            -n.dot(ball.velocity)
        };
        if side < 0.0 { -n } else { n }
    };

    Some(CushionContact {
        segment_id: seg.id().to_string(),
        normal,
        penetration: (ball.radius - dist).max(0.0),
    })
}

fn circular_contact(
    ball: &Ball,
    seg: &CircularSegment,
    slop: f64,
) -> SimResult<Option<CushionContact>> {
    let gap = seg.distance_to_rim(ball.position);

    if gap > ball.radius + slop {
        return Ok(None);
    }

    Ok(Some(CushionContact {
        segment_id: seg.id().to_string(),
        normal: seg.normal_at(ball.position)?,
        penetration: (ball.radius - gap).max(0.0),
    }))
}

/// Reflect velocity off a surface with restitution
///
/// `v' = v - (1 + e)(v·n)n`. With `e = 1` this is the elastic mirror reflection.
#[inline]
pub fn reflect_velocity(velocity: Vec3, normal: Vec3, restitution: f64) -> Vec3 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Apply a cushion contact to the ball: push it out of the cushion and reflect
/// its velocity. Spin is unchanged, so the caller must reclassify.
pub fn resolve_cushion_collision(ball: &mut Ball, contact: &CushionContact, restitution: f64) {
    ball.position += contact.normal * contact.penetration;
    ball.velocity = reflect_velocity(ball.velocity, contact.normal, restitution);
}
