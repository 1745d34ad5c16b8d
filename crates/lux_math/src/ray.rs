use std::ops::Mul;

use crate::{Point, Transformation, Vec3};

/// Default lower bound of the ray parameter.
pub const DEFAULT_TMIN: f32 = 1e-5;

/// A half-open segment `origin + t * direction` with `t` in `(tmin, tmax)`.
///
/// `depth` counts how many scattering events produced this ray; camera rays
/// start at zero.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point,
    pub direction: Vec3,
    pub tmin: f32,
    pub tmax: f32,
    pub depth: u32,
}

impl Ray {
    /// Create an unbounded ray at depth zero.
    pub fn new(origin: Point, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            tmin: DEFAULT_TMIN,
            tmax: f32::INFINITY,
            depth: 0,
        }
    }

    /// Set the accepted parameter range.
    pub fn with_bounds(mut self, tmin: f32, tmax: f32) -> Self {
        self.tmin = tmin;
        self.tmax = tmax;
        self
    }

    /// Set the recursion depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Point {
        self.origin + self.direction * t
    }

    /// Returns true if `t` lies strictly inside `(tmin, tmax)`.
    #[inline]
    pub fn surrounds(&self, t: f32) -> bool {
        self.tmin < t && t < self.tmax
    }

    /// Map the ray into another frame. Bounds and depth are unchanged, so the
    /// parameter of any point along the ray is preserved.
    pub fn transform(&self, transformation: &Transformation) -> Ray {
        Ray {
            origin: transformation.apply_point(self.origin),
            direction: transformation.apply_vec(self.direction),
            ..*self
        }
    }

    /// Compare origin and direction only.
    pub fn is_close(&self, other: &Ray) -> bool {
        self.origin.is_close(&other.origin)
            && self.direction.abs_diff_eq(other.direction, crate::EPSILON)
    }
}

impl Mul<Ray> for Transformation {
    type Output = Ray;

    fn mul(self, rhs: Ray) -> Ray {
        rhs.transform(&self)
    }
}
