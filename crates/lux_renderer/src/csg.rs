//! Constructive solid geometry: boolean combinations of two shapes.
//!
//! A ray is classified by sweeping over every surface crossing of both
//! children in `t` order. Each crossing of a solid child toggles whether the
//! ray is inside that child; the composite surface is wherever the boolean
//! predicate changes value. Every crossing carries whether it bounds a
//! volume: sheet crossings (a plane, or a plane surviving inside a nested
//! node) do not toggle anything and count as surface only where flipping
//! that child's occupancy would change the predicate.

use lux_math::{Point, Ray, Transformation};

use crate::shape::{HitRecord, Shape};

/// Boolean operator combining two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsgOperation {
    Union,
    Intersection,
    /// Points in the first shape but not in the second.
    Difference,
}

impl CsgOperation {
    pub fn combine(self, in_first: bool, in_second: bool) -> bool {
        match self {
            CsgOperation::Union => in_first || in_second,
            CsgOperation::Intersection => in_first && in_second,
            CsgOperation::Difference => in_first && !in_second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    First,
    Second,
}

/// A surface crossing along a ray, tagged with whether occupancy of the
/// shape changes across it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Crossing<'a> {
    pub hit: HitRecord<'a>,
    pub bounds_volume: bool,
}

/// A boolean node owning its two children.
///
/// The node's transformation places the whole subtree; children's own
/// transformations are relative to it.
#[derive(Debug, Clone)]
pub struct Csg {
    transformation: Transformation,
    first: Box<Shape>,
    second: Box<Shape>,
    operation: CsgOperation,
}

impl Csg {
    pub fn new(first: impl Into<Shape>, second: impl Into<Shape>, operation: CsgOperation) -> Self {
        Self {
            transformation: Transformation::IDENTITY,
            first: Box::new(first.into()),
            second: Box::new(second.into()),
            operation,
        }
    }

    pub fn union(first: impl Into<Shape>, second: impl Into<Shape>) -> Self {
        Self::new(first, second, CsgOperation::Union)
    }

    pub fn intersection(first: impl Into<Shape>, second: impl Into<Shape>) -> Self {
        Self::new(first, second, CsgOperation::Intersection)
    }

    pub fn difference(first: impl Into<Shape>, second: impl Into<Shape>) -> Self {
        Self::new(first, second, CsgOperation::Difference)
    }

    pub fn with_transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = transformation;
        self
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn operation(&self) -> CsgOperation {
        self.operation
    }

    pub fn first(&self) -> &Shape {
        &self.first
    }

    pub fn second(&self) -> &Shape {
        &self.second
    }

    pub fn has_interior(&self) -> bool {
        let first = self.first.has_interior();
        let second = self.second.has_interior();
        match self.operation {
            CsgOperation::Union => first || second,
            CsgOperation::Intersection => first && second,
            CsgOperation::Difference => first,
        }
    }

    /// True if either child might be hit. May report rays that only touch
    /// parts of a child the operator removes.
    pub fn quick_ray_intersection(&self, ray: &Ray) -> bool {
        let local_ray = ray.transform(&self.transformation.inverse());
        self.first.quick_ray_intersection(&local_ray) || self.second.quick_ray_intersection(&local_ray)
    }

    pub fn ray_intersection(&self, ray: &Ray) -> Option<HitRecord<'_>> {
        let local_ray = ray.transform(&self.transformation.inverse());
        self.sweep(&local_ray, true)
            .into_iter()
            .next()
            .map(|crossing| crossing.hit.to_parent(&self.transformation, ray))
    }

    pub fn all_intersections(&self, ray: &Ray) -> Vec<HitRecord<'_>> {
        self.crossings(ray).into_iter().map(|crossing| crossing.hit).collect()
    }

    pub(crate) fn crossings(&self, ray: &Ray) -> Vec<Crossing<'_>> {
        let local_ray = ray.transform(&self.transformation.inverse());
        self.sweep(&local_ray, false)
            .into_iter()
            .map(|crossing| Crossing {
                hit: crossing.hit.to_parent(&self.transformation, ray),
                ..crossing
            })
            .collect()
    }

    /// Evaluates the operator on the children's own containment tests.
    pub fn is_point_internal(&self, point: Point) -> bool {
        let local_point = self.transformation.inverse().apply_point(point);
        self.operation.combine(
            self.first.is_point_internal(local_point),
            self.second.is_point_internal(local_point),
        )
    }

    /// Boundary crossings of the composite along a ray in the local frame.
    fn sweep(&self, local_ray: &Ray, first_only: bool) -> Vec<Crossing<'_>> {
        let mut events: Vec<(Crossing<'_>, Side)> = self
            .first
            .crossings(local_ray)
            .into_iter()
            .map(|crossing| (crossing, Side::First))
            .chain(
                self.second
                    .crossings(local_ray)
                    .into_iter()
                    .map(|crossing| (crossing, Side::Second)),
            )
            .collect();
        events.sort_by(|a, b| a.0.hit.t.total_cmp(&b.0.hit.t));

        // Containment just before the first admissible crossing.
        let start = local_ray.at(local_ray.tmin);
        let mut in_first = self.first.is_point_internal(start);
        let mut in_second = self.second.is_point_internal(start);

        let mut boundary = Vec::new();
        for (crossing, side) in events {
            let inside_before = self.operation.combine(in_first, in_second);

            let visible = match (side, crossing.bounds_volume) {
                (Side::First, true) => {
                    in_first = !in_first;
                    self.operation.combine(in_first, in_second) != inside_before
                }
                (Side::Second, true) => {
                    in_second = !in_second;
                    self.operation.combine(in_first, in_second) != inside_before
                }
                (Side::First, false) => {
                    self.operation.combine(true, in_second) != self.operation.combine(false, in_second)
                }
                (Side::Second, false) => {
                    self.operation.combine(in_first, true) != self.operation.combine(in_first, false)
                }
            };

            if visible {
                boundary.push(crossing);
                if first_only {
                    break;
                }
            }
        }
        boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cuboid, Plane, Sphere};
    use lux_math::{Normal, Vec3, EPSILON};

    fn unit_sphere_at(x: f32) -> Sphere {
        Sphere::new(1.0).with_transformation(Transformation::translation(Vec3::new(x, 0.0, 0.0)))
    }

    fn sample_points() -> Vec<Point> {
        let mut points = Vec::new();
        for i in -6..=6 {
            for j in -3..=3 {
                points.push(Point::new(i as f32 * 0.37, j as f32 * 0.41, 0.1 * j as f32));
            }
        }
        points
    }

    #[test]
    fn test_point_internal_follows_operator() {
        let a = Shape::from(unit_sphere_at(-0.5));
        let b = Shape::from(unit_sphere_at(0.5));

        for operation in [CsgOperation::Union, CsgOperation::Intersection, CsgOperation::Difference] {
            let csg = Csg::new(a.clone(), b.clone(), operation);
            for p in sample_points() {
                let expected = operation.combine(a.is_point_internal(p), b.is_point_internal(p));
                assert_eq!(csg.is_point_internal(p), expected, "{:?} at {:?}", operation, p);
            }
        }

        let union = Csg::union(a.clone(), b.clone());
        let difference = Csg::difference(a.clone(), b.clone());
        assert!(union.is_point_internal(Point::new(1.2, 0.0, 0.0)));
        assert!(difference.is_point_internal(Point::new(-1.2, 0.0, 0.0)));
        assert!(!difference.is_point_internal(Point::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_union_hits_nearest_outer_surface() {
        let csg = Csg::union(unit_sphere_at(-0.5), unit_sphere_at(0.5));

        let ray = Ray::new(Point::new(-5.0, 0.0, 0.0), Vec3::X);
        let hit = csg.ray_intersection(&ray).unwrap();
        assert!((hit.t - 3.5).abs() < 1e-4);
        assert!(hit.normal.is_close(&-Normal::X));

        // Entry and exit only, no internal surfaces.
        let hits = csg.all_intersections(&ray);
        assert_eq!(hits.len(), 2);
        assert!((hits[1].t - 6.5).abs() < 1e-4);
    }

    #[test]
    fn test_intersection_hits_lens() {
        let csg = Csg::intersection(unit_sphere_at(-0.5), unit_sphere_at(0.5));

        let ray = Ray::new(Point::new(-5.0, 0.0, 0.0), Vec3::X);
        let hit = csg.ray_intersection(&ray).unwrap();
        // Enters the second sphere's surface at x = -0.5.
        assert!((hit.t - 4.5).abs() < 1e-4);
        assert!(hit.world_point.is_close(&Point::new(-0.5, 0.0, 0.0)));

        // A ray that crosses only the first sphere misses the lens.
        let ray = Ray::new(Point::new(-1.3, 5.0, 0.0), -Vec3::Y);
        assert!(csg.ray_intersection(&ray).is_none());
    }

    #[test]
    fn test_difference_carves_second_shape() {
        let csg = Csg::difference(unit_sphere_at(0.0), unit_sphere_at(1.0));

        // From the left the first sphere is untouched.
        let ray = Ray::new(Point::new(-5.0, 0.0, 0.0), Vec3::X);
        let hit = csg.ray_intersection(&ray).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-4);

        // From the right the ray enters the hole, then hits the carved wall
        // where it leaves the second sphere at x = 0.
        let ray = Ray::new(Point::new(5.0, 0.0, 0.0), -Vec3::X);
        let hit = csg.ray_intersection(&ray).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert!(hit.world_point.is_close(&Point::new(0.0, 0.0, 0.0)));
        assert!(hit.normal.is_close(&Normal::X));
    }

    #[test]
    fn test_ray_starting_inside_finds_exit() {
        let csg = Csg::union(unit_sphere_at(-0.5), unit_sphere_at(0.5));
        let ray = Ray::new(Point::ORIGIN, Vec3::X);

        let hit = csg.ray_intersection(&ray).unwrap();
        assert!((hit.t - 1.5).abs() < 1e-4);
        assert!(hit.normal.is_close(&-Normal::X));
    }

    #[test]
    fn test_csg_transformation_and_nesting() {
        let lens = Csg::intersection(unit_sphere_at(-0.5), unit_sphere_at(0.5));
        let carved = Csg::difference(lens, Cuboid::new().with_transformation(
            Transformation::translation(Vec3::new(-2.0, -2.0, 0.0)) * Transformation::scaling(Vec3::splat(4.0)),
        ))
        .with_transformation(Transformation::translation(Vec3::new(0.0, 0.0, 10.0)));

        // Upper half removed: a ray from above hits the flat cut at local z = 0.
        let ray = Ray::new(Point::new(0.0, 0.0, 15.0), -Vec3::Z);
        let hit = carved.ray_intersection(&ray).unwrap();
        assert!(hit.world_point.is_close(&Point::new(0.0, 0.0, 10.0)));
        assert!(hit.normal.is_close(&Normal::Z));
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert!(hit.ray.is_close(&ray));

        assert!(carved.is_point_internal(Point::new(0.0, 0.0, 9.9)));
        assert!(!carved.is_point_internal(Point::new(0.0, 0.0, 10.1)));
    }

    #[test]
    fn test_plane_child_has_no_volume() {
        let csg = Csg::union(Plane::new(), unit_sphere_at(0.0));
        assert!(!csg.first().has_interior());
        assert!(csg.has_interior());

        // Inside the sphere the plane is hidden.
        let ray = Ray::new(Point::new(0.0, 0.0, 5.0), -Vec3::Z);
        let hits = csg.all_intersections(&ray);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].t - 4.0).abs() < EPSILON);
        assert!((hits[1].t - 6.0).abs() < EPSILON);

        // Away from the sphere the plane shows.
        let ray = Ray::new(Point::new(3.0, 0.0, 5.0), -Vec3::Z);
        let hit = csg.ray_intersection(&ray).unwrap();
        assert!((hit.t - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_nested_sheet_does_not_toggle_occupancy() {
        let sheet_and_ball = || Csg::union(Plane::new(), unit_sphere_at(-10.0));
        let ball_at_z =
            |z: f32| Sphere::new(1.0).with_transformation(Transformation::translation(Vec3::new(0.0, 0.0, z)));
        let ray = Ray::new(Point::new(0.0, 0.0, 5.0), -Vec3::Z);

        // The sheet never reaches the ball below it: nothing is left.
        let empty = Csg::intersection(sheet_and_ball(), ball_at_z(-3.0));
        assert!(!empty.is_point_internal(Point::new(0.0, 0.0, -3.0)));
        assert!(empty.ray_intersection(&ray).is_none());
        assert!(empty.all_intersections(&ray).is_empty());

        // Cutting the ball, only the disc of the sheet survives.
        let disc = Csg::intersection(sheet_and_ball(), ball_at_z(0.0));
        let hits = disc.all_intersections(&ray);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t - 5.0).abs() < EPSILON);
        assert!(hits[0].normal.is_close(&Normal::Z));
    }

    #[test]
    fn test_quick_intersection_is_any_child() {
        let csg = Csg::intersection(unit_sphere_at(-3.0), unit_sphere_at(3.0));
        let ray = Ray::new(Point::new(-3.0, 5.0, 0.0), -Vec3::Y);

        assert!(csg.quick_ray_intersection(&ray));
        assert!(csg.ray_intersection(&ray).is_none());
    }
}
