//! Cushion segment geometry
//!
//! A cushion is a set of primitives, each either a straight line segment
//! (rails and pocket jaws) or a circle (pocket mouths, obstacles). Both have
//! closed-form normals, so a contact-normal query is O(1).

use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::{Vec3, horizontal};

/// Horizontal distances below this are treated as coincident points
const DEGENERATE_EPS: f64 = 1e-12;

/// Which primitive family a segment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CushionKind {
    Linear,
    Circular,
}

impl CushionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CushionKind::Linear => "linear",
            CushionKind::Circular => "circular",
        }
    }
}

/// A straight cushion segment between two points at the same height
///
/// The infinite extension of the segment satisfies `lx*x + ly*y + l0 = 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearSegment {
    id: String,
    p1: Vec3,
    p2: Vec3,
    height: f64,
    lx: f64,
    ly: f64,
    l0: f64,
    normal: Vec3,
}

impl LinearSegment {
    pub fn new(id: impl Into<String>, p1: Vec3, p2: Vec3) -> SimResult<Self> {
        let id = id.into();

        if p1.z != p2.z {
            return Err(SimError::geometry(&id, "height mismatch"));
        }
        if horizontal(p2 - p1).length() < DEGENERATE_EPS {
            return Err(SimError::geometry(&id, "degenerate segment"));
        }
        if p1.z < 0.0 {
            return Err(SimError::geometry(&id, "negative height"));
        }

        let (lx, ly, l0) = if p2.x - p1.x == 0.0 {
            // Vertical line: x = p1.x
            (1.0, 0.0, -p1.x)
        } else {
            let slope = (p2.y - p1.y) / (p2.x - p1.x);
            (-slope, 1.0, slope * p1.x - p1.y)
        };

        let normal = Vec3::new(lx, ly, 0.0).normalize();

        Ok(Self {
            id,
            p1,
            p2,
            height: p1.z,
            lx,
            ly,
            l0,
            normal,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn p1(&self) -> Vec3 {
        self.p1
    }

    pub fn p2(&self) -> Vec3 {
        self.p2
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half-plane coefficients `(lx, ly, l0)`
    pub fn line_coefficients(&self) -> (f64, f64, f64) {
        (self.lx, self.ly, self.l0)
    }

    /// Unit normal of the line (z = 0). The same wherever the ball strikes.
    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Signed horizontal distance from the infinite line, positive on the side
    /// the normal points to
    pub fn signed_distance(&self, point: Vec3) -> f64 {
        (self.lx * point.x + self.ly * point.y + self.l0) / self.lx.hypot(self.ly)
    }

    /// Closest point on the finite segment, in the horizontal plane, at the
    /// segment's height
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        self.project(point).0
    }

    /// Closest point plus the unclamped line parameter of `point`
    ///
    /// The parameter is 0 at `p1` and 1 at `p2`; outside `(0, 1)` the closest
    /// point is the corresponding endpoint, returned exactly.
    pub fn project(&self, point: Vec3) -> (Vec3, f64) {
        let a = horizontal(self.p1);
        let ab = horizontal(self.p2) - a;
        let t = (horizontal(point) - a).dot(ab) / ab.length_squared();
        let closest = if t <= 0.0 {
            self.p1
        } else if t >= 1.0 {
            self.p2
        } else {
            a + ab * t
        };
        (Vec3::new(closest.x, closest.y, self.height), t)
    }

    /// Segment length
    pub fn length(&self) -> f64 {
        horizontal(self.p2 - self.p1).length()
    }
}

/// A circular cushion segment (full circle around `center`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircularSegment {
    id: String,
    center: Vec3,
    radius: f64,
    height: f64,
}

impl CircularSegment {
    pub fn new(id: impl Into<String>, center: Vec3, radius: f64) -> SimResult<Self> {
        let id = id.into();

        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::configuration("radius", radius));
        }
        if center.z < 0.0 {
            return Err(SimError::geometry(&id, "negative height"));
        }

        Ok(Self {
            id,
            center,
            radius,
            height: center.z,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Horizontal unit vector from the center toward the ball
    ///
    /// Fails with `InvalidArgument` when the ball sits over the center, where
    /// the direction is undefined.
    pub fn normal_at(&self, ball_position: Vec3) -> SimResult<Vec3> {
        let offset = horizontal(ball_position - self.center);
        let dist = offset.length();
        if dist < DEGENERATE_EPS {
            return Err(SimError::InvalidArgument(format!(
                "ball position coincides with center of circular segment '{}'",
                self.id
            )));
        }
        Ok(offset / dist)
    }

    /// Horizontal distance from the ball center to the circle's rim
    pub fn distance_to_rim(&self, point: Vec3) -> f64 {
        horizontal(point - self.center).length() - self.radius
    }
}

/// A cushion primitive of either family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CushionSegment {
    Linear(LinearSegment),
    Circular(CircularSegment),
}

impl CushionSegment {
    pub fn id(&self) -> &str {
        match self {
            CushionSegment::Linear(s) => s.id(),
            CushionSegment::Circular(s) => s.id(),
        }
    }

    pub fn height(&self) -> f64 {
        match self {
            CushionSegment::Linear(s) => s.height(),
            CushionSegment::Circular(s) => s.height(),
        }
    }

    pub fn kind(&self) -> CushionKind {
        match self {
            CushionSegment::Linear(_) => CushionKind::Linear,
            CushionSegment::Circular(_) => CushionKind::Circular,
        }
    }

    /// Contact normal for a ball at `ball_position`
    ///
    /// Linear segments ignore the position. Circular segments require it.
    pub fn normal(&self, ball_position: Option<Vec3>) -> SimResult<Vec3> {
        match self {
            CushionSegment::Linear(s) => Ok(s.normal()),
            CushionSegment::Circular(s) => {
                let pos = ball_position.ok_or_else(|| {
                    SimError::InvalidArgument(format!(
                        "circular segment '{}' needs a ball position for its normal",
                        s.id()
                    ))
                })?;
                s.normal_at(pos)
            }
        }
    }
}

impl From<LinearSegment> for CushionSegment {
    fn from(segment: LinearSegment) -> Self {
        CushionSegment::Linear(segment)
    }
}

impl From<CircularSegment> for CushionSegment {
    fn from(segment: CircularSegment) -> Self {
        CushionSegment::Circular(segment)
    }
}
