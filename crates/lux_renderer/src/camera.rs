//! Cameras map normalized screen coordinates to primary rays.
//!
//! In camera space the observer looks along +X with +Z up. The screen
//! coordinates (u, v) span [0, 1]: u = 0 is the left edge and v = 0 the
//! bottom edge.

use lux_math::{Point, Ray, Transformation, Vec3};

/// Produces the primary ray through a point of the screen.
pub trait Camera: Send + Sync {
    fn fire_ray(&self, u: f32, v: f32) -> Ray;
}

/// Parallel projection onto a screen two units tall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthogonalCamera {
    aspect_ratio: f32,
    transformation: Transformation,
}

impl OrthogonalCamera {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            transformation: Transformation::IDENTITY,
        }
    }

    /// Set the camera-to-world placement.
    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }
}

impl Camera for OrthogonalCamera {
    fn fire_ray(&self, u: f32, v: f32) -> Ray {
        let origin = Point::new(-1.0, (1.0 - 2.0 * u) * self.aspect_ratio, 2.0 * v - 1.0);
        Ray::new(origin, Vec3::X).transform(&self.transformation)
    }
}

/// Pinhole projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Distance from the eye to the screen. Larger values narrow the view.
    distance: f32,
    aspect_ratio: f32,
    transformation: Transformation,
}

impl PerspectiveCamera {
    pub fn new(distance: f32, aspect_ratio: f32) -> Self {
        Self {
            distance,
            aspect_ratio,
            transformation: Transformation::IDENTITY,
        }
    }

    /// Set the camera-to-world placement.
    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    /// Horizontal field of view in degrees.
    pub fn aperture_deg(&self) -> f32 {
        2.0 * (self.aspect_ratio / self.distance).atan().to_degrees()
    }
}

impl Camera for PerspectiveCamera {
    fn fire_ray(&self, u: f32, v: f32) -> Ray {
        let origin = Point::new(-self.distance, 0.0, 0.0);
        let direction = Vec3::new(
            self.distance,
            (1.0 - 2.0 * u) * self.aspect_ratio,
            2.0 * v - 1.0,
        );
        Ray::new(origin, direction).transform(&self.transformation)
    }
}
