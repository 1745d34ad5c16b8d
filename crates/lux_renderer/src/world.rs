//! The scene registry: shapes and point lights.

use lux_math::{Color, Point, Ray};

use crate::shape::{HitRecord, Shape};

/// Offset, in world units, that keeps a visibility ray from hitting the
/// surface it starts on.
const VISIBILITY_EPSILON: f32 = 1e-2;

/// A point light source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Point,
    pub color: Color,
    /// Distance at which the light has its nominal intensity. Zero disables
    /// distance attenuation.
    pub linear_radius: f32,
}

impl PointLight {
    pub fn new(position: Point, color: Color) -> Self {
        Self {
            position,
            color,
            linear_radius: 0.0,
        }
    }

    pub fn with_linear_radius(mut self, linear_radius: f32) -> Self {
        self.linear_radius = linear_radius;
        self
    }
}

/// Shapes and lights, filled once before rendering and read-only after.
#[derive(Debug, Clone, Default)]
pub struct World {
    shapes: Vec<Shape>,
    point_lights: Vec<PointLight>,
}

impl World {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shape(&mut self, shape: impl Into<Shape>) {
        self.shapes.push(shape.into());
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Check if the world has no shapes.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Closest hit over all shapes.
    ///
    /// On an exact tie in `t` the shape registered first wins.
    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for shape in &self.shapes {
            // Narrow the search to hits strictly closer than the best one.
            let bounded = match &closest {
                Some(hit) => Ray { tmax: hit.t, ..*ray },
                None => *ray,
            };
            if let Some(hit) = shape.ray_intersection(&bounded) {
                closest = Some(HitRecord { ray: *ray, ..hit });
            }
        }

        closest
    }

    /// Returns true if nothing blocks the segment from `observer` to `point`.
    ///
    /// Occluders beyond `point` are ignored.
    pub fn is_point_visible(&self, point: Point, observer: Point) -> bool {
        let direction = point - observer;
        let distance = direction.length();
        if distance <= 0.0 {
            return true;
        }

        let ray = Ray::new(observer, direction).with_bounds(VISIBILITY_EPSILON / distance, 1.0);
        !self.shapes.iter().any(|shape| shape.quick_ray_intersection(&ray))
    }
}
