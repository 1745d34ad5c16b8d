//! Surface appearance: pigments, BRDFs and the material that pairs them.

use std::f32::consts::PI;
use std::fmt::Debug;
use std::sync::Arc;

use lux_core::HdrImage;
use lux_math::{create_onb_from_z, Color, Normal, Point, Ray, Vec2d, Vec3};

use crate::Pcg;

/// Lower bound for rays leaving a surface, so they do not hit it again.
pub const SCATTER_TMIN: f32 = 1e-3;

/// Maximum angular mismatch, in radians, for a mirror reflection to count.
const SPECULAR_ANGLE_TOLERANCE: f32 = 1e-4;

/// A color field over the (u, v) square.
#[derive(Debug, Clone)]
pub enum Pigment {
    Uniform(Color),
    /// Alternates two colors on an `steps` x `steps` grid.
    Checkered {
        color1: Color,
        color2: Color,
        steps: u32,
    },
    /// Nearest-pixel lookup into a raster, no filtering.
    Image(Arc<HdrImage>),
}

impl Default for Pigment {
    fn default() -> Self {
        Pigment::Uniform(Color::ONE)
    }
}

impl Pigment {
    pub fn color(&self, uv: Vec2d) -> Color {
        match self {
            Pigment::Uniform(color) => *color,
            Pigment::Checkered {
                color1,
                color2,
                steps,
            } => {
                let steps = *steps as f32;
                let int_u = (uv.x * steps).floor() as i64;
                let int_v = (uv.y * steps).floor() as i64;
                if int_u.rem_euclid(2) == int_v.rem_euclid(2) {
                    *color1
                } else {
                    *color2
                }
            }
            Pigment::Image(image) => {
                if image.width() == 0 || image.height() == 0 {
                    return Color::ZERO;
                }
                // Negative products saturate to 0 in the cast.
                let col = ((uv.x * image.width() as f32) as u32).min(image.width() - 1);
                let row = ((uv.y * image.height() as f32) as u32).min(image.height() - 1);
                image.get_pixel(col, row).unwrap_or(Color::ZERO)
            }
        }
    }
}

/// How a surface redirects light.
pub trait Brdf: Send + Sync + Debug {
    /// The reflectance pigment.
    fn pigment(&self) -> &Pigment;

    /// Reflected fraction for light arriving along `in_dir` and leaving along
    /// `out_dir`. Both directions point away from the surface.
    fn eval(&self, normal: Normal, in_dir: Vec3, out_dir: Vec3, uv: Vec2d) -> Color;

    /// Sample an outgoing ray for a path arriving along `incoming_dir`.
    ///
    /// `normal` must face the incoming ray.
    fn scatter_ray(
        &self,
        pcg: &mut Pcg,
        incoming_dir: Vec3,
        interaction_point: Point,
        normal: Normal,
        depth: u32,
    ) -> Ray;
}

/// Lambertian reflector.
#[derive(Debug, Clone, Default)]
pub struct DiffuseBrdf {
    pigment: Pigment,
}

impl DiffuseBrdf {
    pub fn new(pigment: Pigment) -> Self {
        Self { pigment }
    }
}

impl Brdf for DiffuseBrdf {
    fn pigment(&self) -> &Pigment {
        &self.pigment
    }

    fn eval(&self, _normal: Normal, _in_dir: Vec3, _out_dir: Vec3, uv: Vec2d) -> Color {
        self.pigment.color(uv) / PI
    }

    /// Cosine-weighted hemisphere sample around `normal`.
    fn scatter_ray(
        &self,
        pcg: &mut Pcg,
        _incoming_dir: Vec3,
        interaction_point: Point,
        normal: Normal,
        depth: u32,
    ) -> Ray {
        let (e1, e2, e3) = create_onb_from_z(normal.normalize());
        let cos_theta_sq = pcg.random_float();
        let cos_theta = cos_theta_sq.sqrt();
        let sin_theta = (1.0 - cos_theta_sq).sqrt();
        let phi = 2.0 * PI * pcg.random_float();

        let direction = e1 * (phi.cos() * sin_theta) + e2 * (phi.sin() * sin_theta) + e3 * cos_theta;
        Ray::new(interaction_point, direction)
            .with_bounds(SCATTER_TMIN, f32::INFINITY)
            .with_depth(depth)
    }
}

/// Perfect mirror.
#[derive(Debug, Clone, Default)]
pub struct SpecularBrdf {
    pigment: Pigment,
}

impl SpecularBrdf {
    pub fn new(pigment: Pigment) -> Self {
        Self { pigment }
    }
}

impl Brdf for SpecularBrdf {
    fn pigment(&self) -> &Pigment {
        &self.pigment
    }

    fn eval(&self, normal: Normal, in_dir: Vec3, out_dir: Vec3, uv: Vec2d) -> Color {
        let normal = normal.normalize();
        let theta_in = angle_to(normal, in_dir);
        let theta_out = angle_to(normal, out_dir);

        if (theta_in - theta_out).abs() < SPECULAR_ANGLE_TOLERANCE {
            self.pigment.color(uv)
        } else {
            Color::ZERO
        }
    }

    fn scatter_ray(
        &self,
        _pcg: &mut Pcg,
        incoming_dir: Vec3,
        interaction_point: Point,
        normal: Normal,
        depth: u32,
    ) -> Ray {
        let direction = reflect(incoming_dir.normalize_or_zero(), normal.normalize().to_vec());
        Ray::new(interaction_point, direction)
            .with_bounds(SCATTER_TMIN, f32::INFINITY)
            .with_depth(depth)
    }
}

/// A BRDF plus a light-emitting pigment.
#[derive(Debug, Clone)]
pub struct Material {
    pub brdf: Arc<dyn Brdf>,
    pub emitted_radiance: Pigment,
}

impl Default for Material {
    /// White diffuse, no emission.
    fn default() -> Self {
        Self {
            brdf: Arc::new(DiffuseBrdf::default()),
            emitted_radiance: Pigment::Uniform(Color::ZERO),
        }
    }
}

impl Material {
    pub fn new(brdf: impl Brdf + 'static, emitted_radiance: Pigment) -> Self {
        Self {
            brdf: Arc::new(brdf),
            emitted_radiance,
        }
    }

    /// Non-emitting Lambertian surface.
    pub fn diffuse(pigment: Pigment) -> Self {
        Self::new(DiffuseBrdf::new(pigment), Pigment::Uniform(Color::ZERO))
    }

    /// Non-emitting mirror.
    pub fn specular(pigment: Pigment) -> Self {
        Self::new(SpecularBrdf::new(pigment), Pigment::Uniform(Color::ZERO))
    }

    pub fn with_emission(mut self, emitted_radiance: Pigment) -> Self {
        self.emitted_radiance = emitted_radiance;
        self
    }
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

#[inline]
fn angle_to(normal: Normal, dir: Vec3) -> f32 {
    normal
        .dot(dir.normalize_or_zero())
        .clamp(-1.0, 1.0)
        .acos()
}
