//! Points, normals and surface coordinates.
//!
//! Free vectors are plain `glam::Vec3`. Points and normals wrap it so they
//! cannot be mixed up by accident: a point picks up translation, a vector
//! ignores it, and a normal transforms by the inverse transpose. The
//! operators below are the only conversions between them.

use std::ops::{Add, Mul, Neg, Sub};

use glam::{Vec2, Vec3};

/// Absolute tolerance used by every `is_close` comparison.
pub const EPSILON: f32 = 1e-5;

/// UV coordinates on a parametric surface.
pub type Vec2d = Vec2;

/// Linear RGB radiance.
pub type Color = Vec3;

/// Returns true if two scalars agree within [`EPSILON`].
#[inline]
pub fn are_close(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// An affine position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(Vec3);

impl Point {
    pub const ORIGIN: Point = Point(Vec3::ZERO);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    /// Interpret a displacement from the origin as a point.
    #[inline]
    pub const fn from_vec(v: Vec3) -> Self {
        Self(v)
    }

    /// Displacement of this point from the origin.
    #[inline]
    pub const fn to_vec(self) -> Vec3 {
        self.0
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(self) -> f32 {
        self.0.z
    }

    pub fn distance(self, other: Point) -> f32 {
        self.0.distance(other.0)
    }

    pub fn is_close(&self, other: &Point) -> bool {
        self.0.abs_diff_eq(other.0, EPSILON)
    }
}

impl Sub for Point {
    type Output = Vec3;

    #[inline]
    fn sub(self, rhs: Point) -> Vec3 {
        self.0 - rhs.0
    }
}

impl Add<Vec3> for Point {
    type Output = Point;

    #[inline]
    fn add(self, rhs: Vec3) -> Point {
        Point(self.0 + rhs)
    }
}

impl Sub<Vec3> for Point {
    type Output = Point;

    #[inline]
    fn sub(self, rhs: Vec3) -> Point {
        Point(self.0 - rhs)
    }
}

/// A surface normal. Not necessarily unit length.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Normal(Vec3);

impl Normal {
    pub const X: Normal = Normal(Vec3::X);
    pub const Y: Normal = Normal(Vec3::Y);
    pub const Z: Normal = Normal(Vec3::Z);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    #[inline]
    pub const fn from_vec(v: Vec3) -> Self {
        Self(v)
    }

    /// Explicit conversion to a free vector.
    #[inline]
    pub const fn to_vec(self) -> Vec3 {
        self.0
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.0.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.0.y
    }

    #[inline]
    pub fn z(self) -> f32 {
        self.0.z
    }

    #[inline]
    pub fn dot(self, v: Vec3) -> f32 {
        self.0.dot(v)
    }

    pub fn length(self) -> f32 {
        self.0.length()
    }

    /// Unit-length copy. Zero normals stay zero.
    pub fn normalize(self) -> Normal {
        Normal(self.0.normalize_or_zero())
    }

    pub fn is_close(&self, other: &Normal) -> bool {
        self.0.abs_diff_eq(other.0, EPSILON)
    }
}

impl Neg for Normal {
    type Output = Normal;

    #[inline]
    fn neg(self) -> Normal {
        Normal(-self.0)
    }
}

impl Mul<f32> for Normal {
    type Output = Normal;

    #[inline]
    fn mul(self, rhs: f32) -> Normal {
        Normal(self.0 * rhs)
    }
}

/// Build an orthonormal basis whose third axis is `normal`.
///
/// Branchless construction from Duff et al., "Building an Orthonormal Basis,
/// Revisited" (JCGT 2017). `normal` must be unit length.
pub fn create_onb_from_z(normal: Normal) -> (Vec3, Vec3, Vec3) {
    let n = normal.to_vec();
    let sign = 1.0_f32.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    let e1 = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
    let e2 = Vec3::new(b, sign + n.y * n.y * a, -n.y);

    (e1, e2, n)
}
