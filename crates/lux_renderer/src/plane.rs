//! Infinite plane primitive, z = 0 in local space.

use std::sync::Arc;

use lux_math::{Normal, Point, Ray, Transformation, Vec2d};

use crate::shape::HitRecord;
use crate::Material;

/// Rays whose local z direction is smaller than this are treated as parallel.
const PARALLEL_TOLERANCE: f32 = 1e-5;

/// The xy plane of the local frame. Bounds no volume.
#[derive(Debug, Clone)]
pub struct Plane {
    transformation: Transformation,
    material: Arc<Material>,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new()
    }
}

impl Plane {
    pub fn new() -> Self {
        Self {
            transformation: Transformation::IDENTITY,
            material: Arc::new(Material::default()),
        }
    }

    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = material;
        self
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Unit tiling: the fractional part of local x and y.
    pub fn shape_point_to_uv(&self, local_point: Point) -> Vec2d {
        Vec2d::new(
            local_point.x() - local_point.x().floor(),
            local_point.y() - local_point.y().floor(),
        )
    }

    /// Parameter of the crossing in local space, if it lies within bounds.
    fn crossing(local_ray: &Ray) -> Option<f32> {
        if local_ray.direction.z.abs() < PARALLEL_TOLERANCE {
            return None;
        }
        let t = -local_ray.origin.z() / local_ray.direction.z;
        local_ray.surrounds(t).then_some(t)
    }

    pub fn quick_ray_intersection(&self, ray: &Ray) -> bool {
        let local_ray = ray.transform(&self.transformation.inverse());
        Self::crossing(&local_ray).is_some()
    }

    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let local_ray = ray.transform(&self.transformation.inverse());
        let t = Self::crossing(&local_ray)?;
        let local_point = local_ray.at(t);

        let normal = if local_ray.direction.z < 0.0 {
            Normal::Z
        } else {
            -Normal::Z
        };

        Some(HitRecord {
            world_point: self.transformation.apply_point(local_point),
            normal: self.transformation.apply_normal(normal).normalize(),
            surface_point: self.shape_point_to_uv(local_point),
            t,
            ray: *ray,
            material: &self.material,
        })
    }

    pub fn all_intersections(&self, ray: &Ray) -> Vec<HitRecord<'_>> {
        self.ray_intersection(ray).into_iter().collect()
    }
}
