//! Spline evaluation
//!
//! The generation pipeline samples an externally authored curve through the
//! [`Spline`] trait. Positions are reported in the spline's own local space;
//! the pipeline transforms them into world space for raycasting and back
//! into the owner's local space for storage. The two frames are distinct
//! and must not be conflated.

use glam::{Affine3A, Vec3};
use tracing::warn;

/// Chord subdivisions per segment for arc-length integration
const LENGTH_STEPS_PER_SEGMENT: usize = 64;

/// A parametric curve sampled by normalized parameter `t` in `[0, 1]`
///
/// Implementations own the control data; the pipeline only reads. Behavior
/// outside `[0, 1]` is unspecified and callers clamp before evaluating.
pub trait Spline {
    /// Position in the spline's local space at `t`
    fn evaluate_position(&self, t: f32) -> Vec3;

    /// Number of control segments
    fn segment_count(&self) -> usize;

    /// Scalar curvature at `t`
    ///
    /// Reports the true curvature everywhere, including the endpoints;
    /// callers that need the endpoint-zero convention clamp themselves.
    fn evaluate_curvature(&self, t: f32) -> f32;

    /// Curve length under a local-to-world transform
    fn arc_length(&self, transform: &Affine3A) -> f32 {
        let steps = (self.segment_count() * LENGTH_STEPS_PER_SEGMENT).max(1);
        let mut length = 0.0;
        let mut prev = transform.transform_point3(self.evaluate_position(0.0));
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let next = transform.transform_point3(self.evaluate_position(t));
            length += prev.distance(next);
            prev = next;
        }
        length
    }
}

/// Uniform Catmull-Rom spline through a list of control points
///
/// The curve passes through every control point. End segments use mirrored
/// phantom points so the curve runs naturally through the first and last
/// control point; with exactly two points the curve degenerates to the
/// straight line between them.
#[derive(Clone, Debug)]
pub struct CatmullRomSpline {
    points: Vec<Vec3>,
}

impl CatmullRomSpline {
    /// Create a spline from control points
    ///
    /// Fewer than two points is degenerate; the list is padded with a
    /// duplicate so evaluation stays defined.
    pub fn new(points: Vec<Vec3>) -> Self {
        let mut points = points;
        if points.is_empty() {
            warn!("CatmullRomSpline::new: no control points, using the origin");
            points.push(Vec3::ZERO);
        }
        if points.len() < 2 {
            warn!("CatmullRomSpline::new: a single control point has no segments, duplicating it");
            let last = points[0];
            points.push(last);
        }
        Self { points }
    }

    /// Control point with mirrored phantoms at `i = -1` and `i = len`
    fn control(&self, i: isize) -> Vec3 {
        let n = self.points.len() as isize;
        if i < 0 {
            2.0 * self.points[0] - self.points[1]
        } else if i >= n {
            2.0 * self.points[(n - 1) as usize] - self.points[(n - 2) as usize]
        } else {
            self.points[i as usize]
        }
    }

    /// Map `t` to a segment index and a local parameter in `[0, 1]`
    fn segment(&self, t: f32) -> (isize, f32) {
        let segments = self.segment_count() as f32;
        let s = t.clamp(0.0, 1.0) * segments;
        let i = (s.floor() as isize).min(self.segment_count() as isize - 1);
        (i, s - i as f32)
    }

    /// The four control points framing segment `i`
    fn frame(&self, i: isize) -> (Vec3, Vec3, Vec3, Vec3) {
        (
            self.control(i - 1),
            self.control(i),
            self.control(i + 1),
            self.control(i + 2),
        )
    }

    /// First and second derivative with respect to the local parameter
    fn derivatives(&self, t: f32) -> (Vec3, Vec3) {
        let (i, u) = self.segment(t);
        let (p0, p1, p2, p3) = self.frame(i);
        let c1 = -p0 + p2;
        let c2 = 2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3;
        let c3 = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
        let first = 0.5 * (c1 + 2.0 * c2 * u + 3.0 * c3 * u * u);
        let second = 0.5 * (2.0 * c2 + 6.0 * c3 * u);
        (first, second)
    }
}

impl Spline for CatmullRomSpline {
    fn evaluate_position(&self, t: f32) -> Vec3 {
        let (i, u) = self.segment(t);
        let (p0, p1, p2, p3) = self.frame(i);
        let u2 = u * u;
        let u3 = u2 * u;
        0.5 * ((2.0 * p1)
            + (-p0 + p2) * u
            + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
            + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * u3)
    }

    fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    fn evaluate_curvature(&self, t: f32) -> f32 {
        let (first, second) = self.derivatives(t);
        let speed = first.length();
        if speed <= f32::EPSILON {
            return 0.0;
        }
        let curvature = first.cross(second).length() / (speed * speed * speed);
        if curvature.is_finite() {
            curvature
        } else {
            0.0
        }
    }
}
