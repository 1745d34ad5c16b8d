//! Built-in scenes.

use std::sync::Arc;

use lux_math::{Color, Point, Transformation, Vec3};
use lux_renderer::{Csg, Cuboid, Material, Pigment, Plane, PointLight, Sphere, World};

use crate::settings::ScenePreset;

pub fn build(preset: ScenePreset) -> World {
    let world = match preset {
        ScenePreset::Demo => demo(),
        ScenePreset::Furnace => furnace(),
        ScenePreset::Csg => csg_showcase(),
    };
    log::info!(
        "Built {:?} scene: {} shapes, {} lights",
        preset,
        world.len(),
        world.point_lights().len()
    );
    world
}

fn translation(x: f32, y: f32, z: f32) -> Transformation {
    Transformation::translation(Vec3::new(x, y, z))
}

fn sky() -> Sphere {
    let material = Material::diffuse(Pigment::Uniform(Color::ZERO))
        .with_emission(Pigment::Uniform(Color::new(0.6, 0.75, 1.0)));
    Sphere::new(1.0)
        .with_transformation(translation(0.0, 0.0, 0.4) * Transformation::scaling(Vec3::splat(200.0)))
        .with_material(Arc::new(material))
}

fn checkered_floor() -> Plane {
    let material = Material::diffuse(Pigment::Checkered {
        color1: Color::new(0.3, 0.5, 0.1),
        color2: Color::new(0.1, 0.2, 0.5),
        steps: 4,
    });
    Plane::new().with_material(Arc::new(material))
}

/// Spheres on a checkered floor under a sky dome.
fn demo() -> World {
    let mut world = World::new();
    world.add_shape(sky());
    world.add_shape(checkered_floor());

    let matte = Arc::new(Material::diffuse(Pigment::Uniform(Color::new(0.7, 0.3, 0.2))));
    world.add_shape(
        Sphere::new(0.5)
            .with_transformation(translation(1.5, -0.8, 0.5))
            .with_material(matte),
    );

    let mirror = Arc::new(Material::specular(Pigment::Uniform(Color::splat(0.6))));
    world.add_shape(
        Sphere::new(0.5)
            .with_transformation(translation(2.5, 0.8, 0.5))
            .with_material(mirror),
    );

    // Lens: two overlapping spheres intersected.
    let glass_green = Arc::new(Material::diffuse(Pigment::Uniform(Color::new(0.3, 0.7, 0.4))));
    let lens = Csg::intersection(
        Sphere::new(0.6)
            .with_transformation(translation(0.0, -0.3, 0.0))
            .with_material(glass_green.clone()),
        Sphere::new(0.6)
            .with_transformation(translation(0.0, 0.3, 0.0))
            .with_material(glass_green),
    )
    .with_transformation(translation(3.0, -1.5, 0.6));
    world.add_shape(lens);

    world.add_light(PointLight::new(Point::new(-1.0, 3.0, 6.0), Color::ONE).with_linear_radius(6.0));
    world
}

/// Closed emitting sphere around the camera; converges to a flat frame.
fn furnace() -> World {
    let material = Material::diffuse(Pigment::Uniform(Color::splat(0.5)))
        .with_emission(Pigment::Uniform(Color::splat(0.5)));
    let mut world = World::new();
    world.add_shape(Sphere::new(10.0).with_material(Arc::new(material)));
    world
}

/// Union, intersection and difference side by side.
fn csg_showcase() -> World {
    let mut world = World::new();
    world.add_shape(sky());
    world.add_shape(checkered_floor());

    let red = Arc::new(Material::diffuse(Pigment::Uniform(Color::new(0.8, 0.2, 0.2))));
    let blue = Arc::new(Material::diffuse(Pigment::Uniform(Color::new(0.2, 0.3, 0.8))));
    let ball = |x: f32, material: &Arc<Material>| {
        Sphere::new(0.5)
            .with_transformation(translation(x, 0.0, 0.0))
            .with_material(material.clone())
    };
    let cube = |material: &Arc<Material>| {
        Cuboid::new()
            .with_transformation(translation(-0.4, -0.4, -0.4) * Transformation::scaling(Vec3::splat(0.8)))
            .with_material(material.clone())
    };

    world.add_shape(Csg::union(ball(-0.25, &red), ball(0.25, &blue)).with_transformation(translation(3.0, 1.6, 0.5)));
    world.add_shape(Csg::intersection(ball(0.0, &red), cube(&blue)).with_transformation(translation(3.0, 0.0, 0.5)));
    world.add_shape(
        Csg::difference(cube(&blue), ball(0.0, &red).with_transformation(Transformation::scaling(Vec3::splat(1.1))))
            .with_transformation(translation(3.0, -1.6, 0.5) * Transformation::rotation_z(30.0)),
    );

    world.add_light(PointLight::new(Point::new(0.0, 2.0, 5.0), Color::ONE));
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use lux_math::Ray;

    #[test]
    fn test_presets_build() {
        for preset in [ScenePreset::Demo, ScenePreset::Furnace, ScenePreset::Csg] {
            let world = build(preset);
            assert!(!world.is_empty());
        }
        assert_eq!(build(ScenePreset::Demo).point_lights().len(), 1);
    }

    #[test]
    fn test_furnace_encloses_camera() {
        let world = build(ScenePreset::Furnace);
        for direction in [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Z] {
            let ray = Ray::new(Point::new(-1.0, 0.0, 1.0), direction);
            assert!(world.ray_intersection(&ray).is_some());
        }
    }

    #[test]
    fn test_csg_difference_is_hollow_at_center() {
        // Along its centre line the cube lies entirely inside the carving
        // sphere, so the ray passes through and reaches the sky.
        let world = csg_showcase();
        let ray = Ray::new(Point::new(2.0, -1.6, 0.5), Vec3::X);
        let hit = world.ray_intersection(&ray).unwrap();
        assert!(hit.t > 10.0);

        // Off-centre the cube corners survive.
        let ray = Ray::new(Point::new(2.0, -1.6, 0.12), Vec3::X);
        let hit = world.ray_intersection(&ray).unwrap();
        assert!(hit.t < 2.0);
    }
}
