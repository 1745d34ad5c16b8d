//! The closed set of renderable shapes and the intersection record.

use lux_math::{Normal, Point, Ray, Transformation, Vec2d};

use crate::csg::Crossing;
use crate::{Csg, Cuboid, Material, Plane, Sphere};

/// Record of a ray-shape intersection.
///
/// Borrows the material of the shape that was hit, so it cannot outlive the
/// world it came from.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Hit position in the frame of the ray
    pub world_point: Point,
    /// Unit normal, always facing against the ray
    pub normal: Normal,
    /// UV coordinates on the surface
    pub surface_point: Vec2d,
    /// Ray parameter of the hit
    pub t: f32,
    /// The ray that produced this hit
    pub ray: Ray,
    /// Material of the primitive that was hit
    pub material: &'a Material,
}

impl<'a> HitRecord<'a> {
    /// Move a record computed in a shape's local frame into its parent
    /// frame. `parent_ray` is the ray as the parent sees it; `t` is preserved
    /// because the local ray was derived from it by the same transformation.
    pub(crate) fn to_parent(self, transformation: &Transformation, parent_ray: &Ray) -> Self {
        Self {
            world_point: transformation.apply_point(self.world_point),
            normal: transformation.apply_normal(self.normal).normalize(),
            ray: *parent_ray,
            ..self
        }
    }

    pub fn is_close(&self, other: &HitRecord<'_>) -> bool {
        self.world_point.is_close(&other.world_point)
            && self.normal.is_close(&other.normal)
            && self.surface_point.abs_diff_eq(other.surface_point, lux_math::EPSILON)
            && lux_math::are_close(self.t, other.t)
            && self.ray.is_close(&other.ray)
    }
}

/// Orient an outward normal so that it faces against `direction`.
#[inline]
pub(crate) fn facing(outward: Normal, direction: lux_math::Vec3) -> Normal {
    if outward.dot(direction) < 0.0 {
        outward
    } else {
        -outward
    }
}

/// Every shape the renderer can intersect.
///
/// Each variant carries its own world-from-local transformation. Primitives
/// own a material; a [`Csg`] node only owns its two children.
#[derive(Debug, Clone)]
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
    Cuboid(Cuboid),
    Csg(Csg),
}

impl Shape {
    pub fn transformation(&self) -> &Transformation {
        match self {
            Shape::Sphere(s) => s.transformation(),
            Shape::Plane(p) => p.transformation(),
            Shape::Cuboid(c) => c.transformation(),
            Shape::Csg(c) => c.transformation(),
        }
    }

    /// UV coordinates of a point on the surface, given in the local frame.
    ///
    /// Composites have no parametrization of their own and return `None`;
    /// their hits carry the UV of the child that was hit.
    pub fn shape_point_to_uv(&self, local_point: Point) -> Option<Vec2d> {
        match self {
            Shape::Sphere(s) => Some(s.shape_point_to_uv(local_point)),
            Shape::Plane(p) => Some(p.shape_point_to_uv(local_point)),
            Shape::Cuboid(c) => Some(c.shape_point_to_uv(local_point)),
            Shape::Csg(_) => None,
        }
    }

    /// Cheap existence test, no record is built.
    pub fn quick_ray_intersection(&self, ray: &Ray) -> bool {
        match self {
            Shape::Sphere(s) => s.quick_ray_intersection(ray),
            Shape::Plane(p) => p.quick_ray_intersection(ray),
            Shape::Cuboid(c) => c.quick_ray_intersection(ray),
            Shape::Csg(c) => c.quick_ray_intersection(ray),
        }
    }

    /// Nearest hit with `t` strictly inside the ray bounds.
    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        match self {
            Shape::Sphere(s) => s.ray_intersection(ray),
            Shape::Plane(p) => p.ray_intersection(ray),
            Shape::Cuboid(c) => c.ray_intersection(ray),
            Shape::Csg(c) => c.ray_intersection(ray),
        }
    }

    /// Every surface crossing inside the ray bounds, sorted by `t`.
    pub fn all_intersections(&self, ray: &Ray) -> Vec<HitRecord<'_>> {
        match self {
            Shape::Sphere(s) => s.all_intersections(ray),
            Shape::Plane(p) => p.all_intersections(ray),
            Shape::Cuboid(c) => c.all_intersections(ray),
            Shape::Csg(c) => c.all_intersections(ray),
        }
    }

    /// Like [`Shape::all_intersections`], with each crossing tagged by whether
    /// it bounds the solid.
    pub(crate) fn crossings(&self, ray: &Ray) -> Vec<Crossing<'_>> {
        match self {
            Shape::Csg(c) => c.crossings(ray),
            primitive => {
                let bounds_volume = primitive.has_interior();
                primitive
                    .all_intersections(ray)
                    .into_iter()
                    .map(|hit| Crossing { hit, bounds_volume })
                    .collect()
            }
        }
    }

    /// Returns true if `point`, given in the parent frame, lies strictly
    /// inside the solid.
    pub fn is_point_internal(&self, point: Point) -> bool {
        match self {
            Shape::Sphere(s) => s.is_point_internal(point),
            Shape::Plane(_) => false,
            Shape::Cuboid(c) => c.is_point_internal(point),
            Shape::Csg(c) => c.is_point_internal(point),
        }
    }

    /// Whether the shape encloses a volume. Planes are bare sheets.
    pub fn has_interior(&self) -> bool {
        match self {
            Shape::Sphere(_) | Shape::Cuboid(_) => true,
            Shape::Plane(_) => false,
            Shape::Csg(c) => c.has_interior(),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<Plane> for Shape {
    fn from(plane: Plane) -> Self {
        Shape::Plane(plane)
    }
}

impl From<Cuboid> for Shape {
    fn from(cuboid: Cuboid) -> Self {
        Shape::Cuboid(cuboid)
    }
}

impl From<Csg> for Shape {
    fn from(csg: Csg) -> Self {
        Shape::Csg(csg)
    }
}
