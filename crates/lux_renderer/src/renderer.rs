//! Ray to radiance solvers.
//!
//! Implements:
//! - On/off hit testing for quick scene previews
//! - Flat shading with no light transport
//! - Direct illumination from point lights
//! - Monte Carlo path tracing with Russian roulette

use lux_math::{Color, Ray};

use crate::{Pcg, World};

/// Computes the radiance carried back along a ray.
///
/// The generator is passed in rather than owned so that parallel drivers
/// can give every pixel its own stream.
pub trait Renderer: Send + Sync {
    fn render(&self, ray: &Ray, pcg: &mut Pcg) -> Color;
}

impl<F> Renderer for F
where
    F: Fn(&Ray, &mut Pcg) -> Color + Send + Sync,
{
    fn render(&self, ray: &Ray, pcg: &mut Pcg) -> Color {
        self(ray, pcg)
    }
}

/// Paints every pixel that sees a shape with a single color.
#[derive(Debug, Clone)]
pub struct OnOffRenderer<'a> {
    world: &'a World,
    pub background: Color,
    pub hit_color: Color,
}

impl<'a> OnOffRenderer<'a> {
    pub fn new(world: &'a World) -> Self {
        Self {
            world,
            background: Color::ZERO,
            hit_color: Color::ONE,
        }
    }

    pub fn with_colors(mut self, background: Color, hit_color: Color) -> Self {
        self.background = background;
        self.hit_color = hit_color;
        self
    }
}

impl Renderer for OnOffRenderer<'_> {
    fn render(&self, ray: &Ray, _pcg: &mut Pcg) -> Color {
        if self.world.ray_intersection(ray).is_some() {
            self.hit_color
        } else {
            self.background
        }
    }
}

/// Unlit emission: what each surface would look like with no light around.
#[derive(Debug, Clone)]
pub struct FlatRenderer<'a> {
    world: &'a World,
    pub background: Color,
}

impl<'a> FlatRenderer<'a> {
    pub fn new(world: &'a World) -> Self {
        Self {
            world,
            background: Color::ZERO,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

impl Renderer for FlatRenderer<'_> {
    fn render(&self, ray: &Ray, _pcg: &mut Pcg) -> Color {
        let Some(hit) = self.world.ray_intersection(ray) else {
            return self.background;
        };
        hit.material.emitted_radiance.color(hit.surface_point)
    }
}

/// Direct lighting from the world's point lights, with hard shadows.
#[derive(Debug, Clone)]
pub struct PointLightRenderer<'a> {
    world: &'a World,
    pub background: Color,
    /// Added once to every surface hit, lit or not.
    pub ambient_color: Color,
}

impl<'a> PointLightRenderer<'a> {
    pub fn new(world: &'a World) -> Self {
        Self {
            world,
            background: Color::ZERO,
            ambient_color: Color::splat(0.1),
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_ambient(mut self, ambient_color: Color) -> Self {
        self.ambient_color = ambient_color;
        self
    }
}

impl Renderer for PointLightRenderer<'_> {
    fn render(&self, ray: &Ray, _pcg: &mut Pcg) -> Color {
        let Some(hit) = self.world.ray_intersection(ray) else {
            return self.background;
        };

        let material = hit.material;
        let uv = hit.surface_point;
        let out_dir = -ray.direction;
        let mut result = self.ambient_color;

        for light in self.world.point_lights() {
            if !self.world.is_point_visible(light.position, hit.world_point) {
                continue;
            }

            let to_light = light.position - hit.world_point;
            let distance = to_light.length();
            if distance <= 0.0 {
                continue;
            }
            let to_light = to_light / distance;

            let cos_theta = hit.normal.dot(to_light).max(0.0);
            let attenuation = if light.linear_radius > 0.0 {
                (light.linear_radius / distance).powi(2)
            } else {
                1.0
            };

            let emitted = material.emitted_radiance.color(uv);
            let reflected = material.brdf.eval(hit.normal, to_light, out_dir, uv);
            result += (emitted + reflected) * light.color * cos_theta * attenuation;
        }

        result
    }
}

/// Monte Carlo path tracer.
#[derive(Debug, Clone)]
pub struct PathTracer<'a> {
    world: &'a World,
    /// Radiance of rays that escape the scene.
    pub background: Color,
    /// Secondary rays spawned at every bounce.
    pub num_of_rays: u32,
    /// Hard recursion ceiling.
    pub max_depth: u32,
    /// Depth from which Russian roulette may end a path.
    pub russian_roulette_limit: u32,
}

impl<'a> PathTracer<'a> {
    pub fn new(world: &'a World) -> Self {
        Self {
            world,
            background: Color::ZERO,
            num_of_rays: 10,
            max_depth: 2,
            russian_roulette_limit: 3,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_quality(mut self, num_of_rays: u32, max_depth: u32, russian_roulette_limit: u32) -> Self {
        self.num_of_rays = num_of_rays;
        self.max_depth = max_depth;
        self.russian_roulette_limit = russian_roulette_limit;
        self
    }
}

impl Renderer for PathTracer<'_> {
    fn render(&self, ray: &Ray, pcg: &mut Pcg) -> Color {
        if ray.depth > self.max_depth {
            return Color::ZERO;
        }

        let Some(hit) = self.world.ray_intersection(ray) else {
            return self.background;
        };

        let material = hit.material;
        let uv = hit.surface_point;
        let mut hit_color = material.brdf.pigment().color(uv);
        let emitted = material.emitted_radiance.color(uv);
        let hit_color_lum = hit_color.max_element();

        if ray.depth >= self.russian_roulette_limit {
            let q = (1.0 - hit_color_lum).max(0.05);
            if pcg.random_float() > q {
                // Survivors are reweighted to keep the estimate unbiased.
                hit_color /= 1.0 - q;
            } else {
                return emitted;
            }
        }

        let mut cum_radiance = Color::ZERO;
        if hit_color_lum > 0.0 && self.num_of_rays > 0 {
            for _ in 0..self.num_of_rays {
                let new_ray = material.brdf.scatter_ray(
                    pcg,
                    ray.direction,
                    hit.world_point,
                    hit.normal,
                    ray.depth + 1,
                );
                let new_radiance = self.render(&new_ray, pcg);
                cum_radiance += hit_color * new_radiance;
            }
            cum_radiance /= self.num_of_rays as f32;
        }

        emitted + cum_radiance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, Pigment, Plane, PointLight, Sphere};
    use lux_math::{Point, Transformation, Vec3};
    use std::sync::Arc;

    fn colors_close(a: Color, b: Color, tolerance: f32) -> bool {
        a.abs_diff_eq(b, tolerance)
    }

    #[test]
    fn test_closure_is_a_renderer() {
        let renderer = |_ray: &Ray, _pcg: &mut Pcg| Color::new(1.0, 2.0, 3.0);
        let mut pcg = Pcg::default();
        let color = renderer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg);
        assert_eq!(color, Color::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_onoff_renderer() {
        let mut world = World::new();
        world.add_shape(
            Sphere::new(0.2).with_transformation(Transformation::translation(Vec3::new(2.0, 0.0, 0.0))),
        );
        let renderer = OnOffRenderer::new(&world);
        let mut pcg = Pcg::default();

        assert_eq!(renderer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg), Color::ONE);
        assert_eq!(renderer.render(&Ray::new(Point::ORIGIN, Vec3::Y), &mut pcg), Color::ZERO);

        let renderer = renderer.with_colors(Color::splat(0.5), Color::X);
        assert_eq!(renderer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg), Color::X);
        assert_eq!(renderer.render(&Ray::new(Point::ORIGIN, Vec3::Y), &mut pcg), Color::splat(0.5));
    }

    #[test]
    fn test_flat_renderer() {
        let sphere_color = Color::new(1.0, 2.0, 3.0);
        let glow = Color::new(0.5, 0.0, 0.0);
        let material = Arc::new(Material::diffuse(Pigment::Uniform(sphere_color)).with_emission(Pigment::Uniform(glow)));

        let mut world = World::new();
        world.add_shape(
            Sphere::new(0.2)
                .with_transformation(Transformation::translation(Vec3::new(2.0, 0.0, 0.0)))
                .with_material(material),
        );
        let renderer = FlatRenderer::new(&world).with_background(Color::splat(0.25));
        let mut pcg = Pcg::default();

        // Reflectance plays no part, only the emission shows.
        let hit = renderer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg);
        assert!(colors_close(hit, glow, 1e-6));
        let miss = renderer.render(&Ray::new(Point::ORIGIN, Vec3::Y), &mut pcg);
        assert_eq!(miss, Color::splat(0.25));

        let mut dark = World::new();
        dark.add_shape(
            Sphere::new(0.2)
                .with_transformation(Transformation::translation(Vec3::new(2.0, 0.0, 0.0)))
                .with_material(Arc::new(Material::diffuse(Pigment::Uniform(sphere_color)))),
        );
        let renderer = FlatRenderer::new(&dark).with_background(Color::ONE);
        assert_eq!(renderer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg), Color::ZERO);
    }

    #[test]
    fn test_point_light_renderer() {
        // Floor at z = 0 lit from straight above.
        let mut world = World::new();
        world.add_shape(Plane::new());
        world.add_light(PointLight::new(Point::new(0.0, 0.0, 2.0), Color::ONE));

        let renderer = PointLightRenderer::new(&world).with_ambient(Color::ZERO);
        let mut pcg = Pcg::default();

        let ray = Ray::new(Point::new(0.0, 0.0, 1.0), -Vec3::Z);
        let lit = renderer.render(&ray, &mut pcg);
        // White diffuse pigment / pi, cos = 1, no attenuation.
        assert!(colors_close(lit, Color::splat(1.0 / std::f32::consts::PI), 1e-5));

        // Light at 45 degrees from the normal.
        let mut world = World::new();
        world.add_shape(Plane::new());
        world.add_light(PointLight::new(Point::new(2.0, 0.0, 2.0), Color::ONE));
        let renderer = PointLightRenderer::new(&world).with_ambient(Color::ZERO);
        let slanted = renderer.render(&ray, &mut pcg);
        let expected = std::f32::consts::FRAC_1_SQRT_2 / std::f32::consts::PI;
        assert!(colors_close(slanted, Color::splat(expected), 1e-5));
    }

    #[test]
    fn test_point_light_attenuation_and_ambient() {
        let mut world = World::new();
        world.add_shape(Plane::new());
        world.add_light(PointLight::new(Point::new(0.0, 0.0, 2.0), Color::ONE).with_linear_radius(1.0));

        let renderer = PointLightRenderer::new(&world);
        let mut pcg = Pcg::default();
        let ray = Ray::new(Point::new(0.0, 0.0, 1.0), -Vec3::Z);

        let color = renderer.render(&ray, &mut pcg);
        let expected = 0.1 + 0.25 / std::f32::consts::PI;
        assert!(colors_close(color, Color::splat(expected), 1e-5));

        // Background on a miss, no ambient.
        let up = Ray::new(Point::new(0.0, 0.0, 1.0), Vec3::Z);
        assert_eq!(renderer.render(&up, &mut pcg), Color::ZERO);
    }

    #[test]
    fn test_point_light_shadow() {
        let mut world = World::new();
        world.add_shape(Plane::new());
        // Blocker between the floor and the light.
        world.add_shape(
            Sphere::new(0.5).with_transformation(Transformation::translation(Vec3::new(0.0, 0.0, 5.0))),
        );
        world.add_light(PointLight::new(Point::new(0.0, 0.0, 10.0), Color::ONE));

        let renderer = PointLightRenderer::new(&world).with_ambient(Color::splat(0.1));
        let mut pcg = Pcg::default();

        // Approach from the side so the primary ray misses the blocker.
        let ray = Ray::new(Point::new(-1.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -1.0));
        let color = renderer.render(&ray, &mut pcg);
        assert!(colors_close(color, Color::splat(0.1), 1e-6));
    }

    #[test]
    fn test_path_tracer_background_and_depth() {
        let world = World::new();
        let tracer = PathTracer::new(&world).with_background(Color::splat(0.3));
        let mut pcg = Pcg::default();

        let ray = Ray::new(Point::ORIGIN, Vec3::X);
        assert_eq!(tracer.render(&ray, &mut pcg), Color::splat(0.3));

        // Past the depth ceiling nothing is traced.
        let deep = ray.with_depth(tracer.max_depth + 1);
        assert_eq!(tracer.render(&deep, &mut pcg), Color::ZERO);
    }

    #[test]
    fn test_path_tracer_black_surface_returns_emission() {
        let glow = Color::new(0.2, 0.4, 0.6);
        let material = Arc::new(Material::diffuse(Pigment::Uniform(Color::ZERO)).with_emission(Pigment::Uniform(glow)));

        let mut world = World::new();
        world.add_shape(Sphere::default().with_material(material));
        let tracer = PathTracer::new(&world);
        let mut pcg = Pcg::default();

        let color = tracer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg);
        assert!(colors_close(color, glow, 1e-6));
    }

    #[test]
    fn test_path_tracer_zero_rays_returns_emission() {
        let glow = Color::splat(0.5);
        let material = Arc::new(Material::default().with_emission(Pigment::Uniform(glow)));

        let mut world = World::new();
        world.add_shape(Sphere::default().with_material(material));
        let tracer = PathTracer::new(&world).with_quality(0, 5, 6);
        let mut pcg = Pcg::default();

        let color = tracer.render(&Ray::new(Point::ORIGIN, Vec3::X), &mut pcg);
        assert!(colors_close(color, glow, 1e-6));
    }

    #[test]
    fn test_furnace() {
        let mut pcg = Pcg::default();

        // Several random (emission, reflectance) pairs.
        for _ in 0..5 {
            let emitted_radiance = pcg.random_float();
            let reflectance = pcg.random_float() * 0.9;

            let material = Arc::new(
                Material::diffuse(Pigment::Uniform(Color::splat(reflectance)))
                    .with_emission(Pigment::Uniform(Color::splat(emitted_radiance))),
            );
            let mut world = World::new();
            world.add_shape(Sphere::default().with_material(material));

            let tracer = PathTracer::new(&world).with_quality(1, 100, 101);
            let ray = Ray::new(Point::ORIGIN, Vec3::X);
            let color = tracer.render(&ray, &mut pcg);

            let expected = emitted_radiance / (1.0 - reflectance);
            assert!((color.x - expected).abs() < 1e-3, "{} vs {}", color.x, expected);
            assert!((color.y - expected).abs() < 1e-3);
            assert!((color.z - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_russian_roulette_keeps_estimate_unbiased() {
        // Roulette from the first hit: the mean still matches the furnace value.
        let emitted_radiance = 0.5;
        let reflectance = 0.5;
        let material = Arc::new(
            Material::diffuse(Pigment::Uniform(Color::splat(reflectance)))
                .with_emission(Pigment::Uniform(Color::splat(emitted_radiance))),
        );
        let mut world = World::new();
        world.add_shape(Sphere::default().with_material(material));

        let tracer = PathTracer::new(&world).with_quality(1, 200, 0);
        let mut pcg = Pcg::new(7, 11);
        let ray = Ray::new(Point::ORIGIN, Vec3::X);

        let samples = 20_000;
        let mut sum = 0.0f64;
        for _ in 0..samples {
            sum += tracer.render(&ray, &mut pcg).x as f64;
        }
        let mean = sum / samples as f64;
        let expected = emitted_radiance as f64 / (1.0 - reflectance as f64);
        assert!((mean - expected).abs() < 0.05, "mean {mean} vs {expected}");
    }
}
