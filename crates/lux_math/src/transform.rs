//! Affine transformations carried together with their inverse.
//!
//! The inverse is always supplied by the builder that created the matrix and
//! is never recovered numerically. Composition multiplies the inverses in
//! reverse order, so `(a * b).invm()` is exactly `b.invm() * a.invm()`.

use std::ops::Mul;

use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::geometry::{are_close, Normal, Point, EPSILON};

/// A 4x4 affine matrix paired with its explicit inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    m: Mat4,
    invm: Mat4,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transformation {
    pub const IDENTITY: Transformation = Transformation {
        m: Mat4::IDENTITY,
        invm: Mat4::IDENTITY,
    };

    /// Pair a matrix with its inverse.
    ///
    /// The caller is responsible for `invm` actually inverting `m`; use
    /// [`Transformation::is_consistent`] to check.
    pub const fn new(m: Mat4, invm: Mat4) -> Self {
        Self { m, invm }
    }

    pub fn m(&self) -> Mat4 {
        self.m
    }

    pub fn invm(&self) -> Mat4 {
        self.invm
    }

    /// Returns true if `m * invm` is the identity within tolerance.
    pub fn is_consistent(&self) -> bool {
        (self.m * self.invm).abs_diff_eq(Mat4::IDENTITY, EPSILON)
    }

    /// Swap the matrix and its inverse.
    pub fn inverse(&self) -> Transformation {
        Self {
            m: self.invm,
            invm: self.m,
        }
    }

    pub fn is_close(&self, other: &Transformation) -> bool {
        self.m.abs_diff_eq(other.m, EPSILON) && self.invm.abs_diff_eq(other.invm, EPSILON)
    }

    pub fn translation(v: Vec3) -> Self {
        Self::new(Mat4::from_translation(v), Mat4::from_translation(-v))
    }

    /// Non-uniform scaling. Every component of `v` must be non-zero.
    pub fn scaling(v: Vec3) -> Self {
        Self::new(Mat4::from_scale(v), Mat4::from_scale(v.recip()))
    }

    /// Right-handed rotation around the X axis, angle in degrees.
    pub fn rotation_x(angle_deg: f32) -> Self {
        Self::from_rotation(Mat4::from_rotation_x(angle_deg.to_radians()))
    }

    /// Right-handed rotation around the Y axis, angle in degrees.
    pub fn rotation_y(angle_deg: f32) -> Self {
        Self::from_rotation(Mat4::from_rotation_y(angle_deg.to_radians()))
    }

    /// Right-handed rotation around the Z axis, angle in degrees.
    pub fn rotation_z(angle_deg: f32) -> Self {
        Self::from_rotation(Mat4::from_rotation_z(angle_deg.to_radians()))
    }

    // Rotations are orthogonal: the inverse is the transpose.
    fn from_rotation(m: Mat4) -> Self {
        Self::new(m, m.transpose())
    }

    /// Full homogeneous transform. The perspective divide only happens when
    /// the resulting w is not 1.
    pub fn apply_point(&self, p: Point) -> Point {
        let h = self.m * Vec4::new(p.x(), p.y(), p.z(), 1.0);
        let xyz = h.truncate();
        if are_close(h.w, 1.0) {
            Point::from_vec(xyz)
        } else {
            Point::from_vec(xyz / h.w)
        }
    }

    /// Linear part only: translation does not move a direction.
    pub fn apply_vec(&self, v: Vec3) -> Vec3 {
        self.m.transform_vector3(v)
    }

    /// Multiply by the transpose of the inverse's linear block.
    ///
    /// The result is not renormalized.
    pub fn apply_normal(&self, n: Normal) -> Normal {
        Normal::from_vec(Mat3::from_mat4(self.invm).transpose() * n.to_vec())
    }
}

impl Mul for Transformation {
    type Output = Transformation;

    fn mul(self, rhs: Transformation) -> Transformation {
        Transformation {
            m: self.m * rhs.m,
            invm: rhs.invm * self.invm,
        }
    }
}

impl Mul<Point> for Transformation {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        self.apply_point(rhs)
    }
}

impl Mul<Vec3> for Transformation {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.apply_vec(rhs)
    }
}

impl Mul<Normal> for Transformation {
    type Output = Normal;

    fn mul(self, rhs: Normal) -> Normal {
        self.apply_normal(rhs)
    }
}
