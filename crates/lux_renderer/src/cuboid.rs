//! Axis-aligned unit cube primitive, [0, 1]^3 in local space.
//!
//! Any box is a unit cube under a scaling and translation, so only the unit
//! case is implemented.

use std::sync::Arc;

use lux_math::{Normal, Point, Ray, Transformation, Vec2d, Vec3};

use crate::shape::{facing, HitRecord};
use crate::Material;

/// One face of the cube: the axis it is perpendicular to and which end of the
/// [0, 1] range it sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Face {
    axis: usize,
    upper: bool,
}

impl Face {
    fn outward_normal(self) -> Normal {
        let mut n = Vec3::ZERO;
        n[self.axis] = if self.upper { 1.0 } else { -1.0 };
        Normal::from_vec(n)
    }

    /// Face whose plane lies closest to `p`.
    fn nearest(p: Point) -> Face {
        let coords = p.to_vec();
        let mut best = Face { axis: 0, upper: false };
        let mut best_distance = f32::INFINITY;
        for axis in 0..3 {
            for upper in [false, true] {
                let plane = if upper { 1.0 } else { 0.0 };
                let distance = (coords[axis] - plane).abs();
                if distance < best_distance {
                    best_distance = distance;
                    best = Face { axis, upper };
                }
            }
        }
        best
    }
}

/// A box spanning [0, 1] on each local axis.
#[derive(Debug, Clone)]
pub struct Cuboid {
    transformation: Transformation,
    material: Arc<Material>,
}

impl Default for Cuboid {
    fn default() -> Self {
        Self::new()
    }
}

impl Cuboid {
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

    /// Unwraps the six faces into a cross laid out on a 4x3 grid:
    ///
    /// ```text
    ///        +z
    ///  -x  -y  +x  +y
    ///        -z
    /// ```
    pub fn shape_point_to_uv(&self, local_point: Point) -> Vec2d {
        let p = local_point.to_vec().clamp(Vec3::ZERO, Vec3::ONE);
        let face = Face::nearest(local_point);

        let (cell_col, cell_row, a, b) = match (face.axis, face.upper) {
            (0, false) => (0.0, 1.0, 1.0 - p.y, p.z),
            (1, false) => (1.0, 1.0, p.x, p.z),
            (0, true) => (2.0, 1.0, p.y, p.z),
            (1, true) => (3.0, 1.0, 1.0 - p.x, p.z),
            (2, true) => (1.0, 2.0, p.x, p.y),
            _ => (1.0, 0.0, p.x, 1.0 - p.y),
        };

        Vec2d::new((cell_col + a) / 4.0, (cell_row + b) / 3.0)
    }

    /// Slab test. Returns the entry and exit parameters, in that order.
    fn slabs(local_ray: &Ray) -> Option<(f32, f32)> {
        let origin = local_ray.origin.to_vec();
        let direction = local_ray.direction;
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                if origin[axis] < 0.0 || origin[axis] > 1.0 {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let mut t0 = -origin[axis] * inv;
            let mut t1 = (1.0 - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        t_near.is_finite().then_some((t_near, t_far))
    }

    fn local_ray(&self, ray: &Ray) -> Ray {
        ray.transform(&self.transformation.inverse())
    }

    fn hit_record(&self, ray: &Ray, local_ray: &Ray, t: f32) -> HitRecord<'_> {
        let local_point = local_ray.at(t);
        let outward = Face::nearest(local_point).outward_normal();
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
        match Self::slabs(&local_ray) {
            Some((t_near, t_far)) => local_ray.surrounds(t_near) || local_ray.surrounds(t_far),
            None => false,
        }
    }

    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let local_ray = self.local_ray(ray);
        let (t_near, t_far) = Self::slabs(&local_ray)?;

        let t = if local_ray.surrounds(t_near) {
            t_near
        } else if local_ray.surrounds(t_far) {
            t_far
        } else {
            return None;
        };

        Some(self.hit_record(ray, &local_ray, t))
    }

    pub fn all_intersections(&self, ray: &Ray) -> Vec<HitRecord<'_>> {
        let local_ray = self.local_ray(ray);
        let Some((t_near, t_far)) = Self::slabs(&local_ray) else {
            return Vec::new();
        };

        [t_near, t_far]
            .into_iter()
            .filter(|&t| local_ray.surrounds(t))
            .map(|t| self.hit_record(ray, &local_ray, t))
            .collect()
    }

    /// The slab interval of an auxiliary ray must straddle the point.
    pub fn is_point_internal(&self, point: Point) -> bool {
        let local_point = self.transformation.inverse().apply_point(point);
        let cast = Ray::new(local_point, Vec3::ONE);
        match Self::slabs(&cast) {
            Some((t_near, t_far)) => t_near < 0.0 && t_far > 0.0,
            None => false,
        }
    }
}
