//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use lux_math::{Normal, Point, Ray, Transformation, Vec2d, Vec3};

use crate::shape::{facing, HitRecord};
use crate::Material;

/// A sphere centred on the local origin.
#[derive(Debug, Clone)]
pub struct Sphere {
    transformation: Transformation,
    radius: f32,
    material: Arc<Material>,
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Sphere {
    /// Create a sphere with identity placement and the default material.
    pub fn new(radius: f32) -> Self {
        Self {
            transformation: Transformation::IDENTITY,
            radius,
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

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Spherical coordinates remapped to the unit square.
    ///
    /// u follows the azimuth from +X towards +Y, v the polar angle from +Z.
    pub fn shape_point_to_uv(&self, local_point: Point) -> Vec2d {
        let mut u = local_point.y().atan2(local_point.x()) / (2.0 * PI);
        if u < 0.0 {
            u += 1.0;
        }
        // atan2 can land exactly on 1.0 after the shift.
        if u >= 1.0 {
            u = 0.0;
        }
        let v = (local_point.z() / self.radius).clamp(-1.0, 1.0).acos() / PI;
        Vec2d::new(u, v)
    }

    /// Roots of |o + t d|^2 = R^2 in ascending order, or `None` if the ray
    /// misses the sphere's supporting surface entirely.
    fn roots(&self, local_ray: &Ray) -> Option<(f32, f32)> {
        let origin = local_ray.origin.to_vec();
        let a = local_ray.direction.length_squared();
        let b = 2.0 * origin.dot(local_ray.direction);
        let c = origin.length_squared() - self.radius * self.radius;

        let delta = b * b - 4.0 * a * c;
        if delta < 0.0 || a <= 0.0 {
            return None;
        }

        let sqrt_delta = delta.sqrt();
        Some(((-b - sqrt_delta) / (2.0 * a), (-b + sqrt_delta) / (2.0 * a)))
    }

    fn local_ray(&self, ray: &Ray) -> Ray {
        ray.transform(&self.transformation.inverse())
    }

    fn hit_record(&self, ray: &Ray, local_ray: &Ray, t: f32) -> HitRecord<'_> {
        let local_point = local_ray.at(t);
        let outward = Normal::from_vec(local_point.to_vec());
        let normal = facing(outward, local_ray.direction);

        HitRecord {
            world_point: self.transformation.apply_point(local_point),
            normal: self.transformation.apply_normal(normal).normalize(),
            surface_point: self.shape_point_to_uv(local_point),
            t,
            ray: *ray,
            material: &self.material,
        }
    }

    pub fn quick_ray_intersection(&self, ray: &Ray) -> bool {
        let local_ray = self.local_ray(ray);
        match self.roots(&local_ray) {
            Some((t1, t2)) => local_ray.surrounds(t1) || local_ray.surrounds(t2),
            None => false,
        }
    }

    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let local_ray = self.local_ray(ray);
        let (t1, t2) = self.roots(&local_ray)?;

        let t = if local_ray.surrounds(t1) {
            t1
        } else if local_ray.surrounds(t2) {
            t2
        } else {
            return None;
        };

        Some(self.hit_record(ray, &local_ray, t))
    }

    pub fn all_intersections(&self, ray: &Ray) -> Vec<HitRecord<'_>> {
        let local_ray = self.local_ray(ray);
        let Some((t1, t2)) = self.roots(&local_ray) else {
            return Vec::new();
        };

        [t1, t2]
            .into_iter()
            .filter(|&t| local_ray.surrounds(t))
            .map(|t| self.hit_record(ray, &local_ray, t))
            .collect()
    }

    /// Occupancy test: an auxiliary ray from the point must find one root
    /// behind it and one ahead of it.
    pub fn is_point_internal(&self, point: Point) -> bool {
        let local_point = self.transformation.inverse().apply_point(point);
        let cast = Ray::new(local_point, Vec3::X);
        match self.roots(&cast) {
            Some((t1, t2)) => t1 < 0.0 && t2 > 0.0,
            None => false,
        }
    }
}
