//! Drives a renderer over every pixel of an image.
//!
//! Pixel (col, row) maps to screen coordinates u = (col + u_pixel) / (width - 1)
//! and v = (row + v_pixel) / (height - 1), so row 0 is the bottom edge of the
//! frame. Flip the raster before writing it to a top-down file format.

use std::time::Instant;

use lux_core::{HdrImage, ImageResult};
use lux_math::{Color, Ray};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::{Camera, Pcg, Renderer};

/// Owns the output raster and the camera looking at the scene.
pub struct ImageTracer {
    image: HdrImage,
    camera: Box<dyn Camera>,
    samples_per_side: u32,
    bucket_size: u32,
}

impl ImageTracer {
    pub fn new(image: HdrImage, camera: impl Camera + 'static) -> Self {
        Self {
            image,
            camera: Box::new(camera),
            samples_per_side: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }

    /// Antialiasing: average an N x N grid of jittered samples per pixel.
    ///
    /// 0 and 1 both fire a single ray through the pixel centre.
    pub fn with_samples_per_side(mut self, samples_per_side: u32) -> Self {
        self.samples_per_side = samples_per_side;
        self
    }

    /// Tile size used by [`ImageTracer::fire_all_rays_parallel`].
    pub fn with_bucket_size(mut self, bucket_size: u32) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    pub fn image(&self) -> &HdrImage {
        &self.image
    }

    pub fn into_image(self) -> HdrImage {
        self.image
    }

    pub fn samples_per_side(&self) -> u32 {
        self.samples_per_side
    }

    /// Ray through the point (u_pixel, v_pixel) of a pixel, both in [0, 1].
    pub fn fire_ray(&self, col: u32, row: u32, u_pixel: f32, v_pixel: f32) -> Ray {
        // A single column or row would divide by zero.
        let width_span = self.image.width().saturating_sub(1).max(1) as f32;
        let height_span = self.image.height().saturating_sub(1).max(1) as f32;

        let u = (col as f32 + u_pixel) / width_span;
        let v = (row as f32 + v_pixel) / height_span;
        self.camera.fire_ray(u, v)
    }

    /// Radiance of one pixel, antialiased if enabled.
    pub fn sample_pixel<R>(&self, col: u32, row: u32, renderer: &R, pcg: &mut Pcg) -> Color
    where
        R: Renderer + ?Sized,
    {
        let n = self.samples_per_side;
        if n <= 1 {
            let ray = self.fire_ray(col, row, 0.5, 0.5);
            return renderer.render(&ray, pcg);
        }

        let mut cum_color = Color::ZERO;
        for i in 0..n {
            for j in 0..n {
                let u_pixel = (i as f32 + pcg.random_float()) / n as f32;
                let v_pixel = (j as f32 + pcg.random_float()) / n as f32;
                let ray = self.fire_ray(col, row, u_pixel, v_pixel);
                cum_color += renderer.render(&ray, pcg);
            }
        }
        cum_color / (n * n) as f32
    }

    /// Render every pixel in raster order, drawing from a single generator.
    pub fn fire_all_rays<R>(&mut self, renderer: &R, pcg: &mut Pcg) -> ImageResult<()>
    where
        R: Renderer + ?Sized,
    {
        let (width, height) = (self.image.width(), self.image.height());
        let start = Instant::now();

        for row in 0..height {
            for col in 0..width {
                let color = self.sample_pixel(col, row, renderer, pcg);
                self.image.set_pixel(col, row, color)?;
            }
        }

        log::info!("Rendered {}x{} in {:.2?}", width, height, start.elapsed());
        Ok(())
    }

    /// Render buckets on the rayon pool.
    ///
    /// Each pixel draws from `Pcg::for_pixel(init_state, init_seq, row * width + col)`,
    /// so the result does not depend on scheduling.
    pub fn fire_all_rays_parallel<R>(&mut self, renderer: &R, init_state: u64, init_seq: u64) -> ImageResult<()>
    where
        R: Renderer + ?Sized,
    {
        let (width, height) = (self.image.width(), self.image.height());
        let buckets = generate_buckets(width, height, self.bucket_size);
        let start = Instant::now();

        log::info!(
            "Rendering {}x{} in {} buckets on {} threads",
            width,
            height,
            buckets.len(),
            rayon::current_num_threads()
        );

        let tracer = &*self;
        let results: Vec<BucketResult> = buckets
            .par_iter()
            .map(|bucket| {
                let result = render_bucket(bucket, |col, row| {
                    let index = u64::from(row) * u64::from(width) + u64::from(col);
                    let mut pcg = Pcg::for_pixel(init_state, init_seq, index);
                    tracer.sample_pixel(col, row, renderer, &mut pcg)
                });
                log::debug!("Bucket {} done ({}x{} at {}, {})", bucket.index, bucket.width, bucket.height, bucket.x, bucket.y);
                result
            })
            .collect();

        for result in &results {
            for (col, row, color) in result.iter() {
                self.image.set_pixel(col, row, color)?;
            }
        }

        log::info!("Rendered {}x{} in {:.2?}", width, height, start.elapsed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Material, OrthogonalCamera, PathTracer, PerspectiveCamera, Pigment, Sphere, World};
    use lux_math::{Point, Transformation, Vec3};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tracer(width: u32, height: u32) -> ImageTracer {
        let camera = PerspectiveCamera::new(1.0, width as f32 / height as f32);
        ImageTracer::new(HdrImage::new(width, height), camera)
    }

    #[test]
    fn test_same_screen_point_same_ray() {
        let tracer = tracer(4, 2);

        let ray1 = tracer.fire_ray(0, 0, 2.5, 1.5);
        let ray2 = tracer.fire_ray(2, 1, 0.5, 0.5);
        assert!(ray1.is_close(&ray2));
    }

    #[test]
    fn test_screen_corners() {
        let camera = OrthogonalCamera::new(2.0);
        let tracer = ImageTracer::new(HdrImage::new(4, 2), camera);

        let bottom_left = tracer.fire_ray(0, 0, 0.0, 0.0);
        assert!(bottom_left.origin.is_close(&Point::new(-1.0, 2.0, -1.0)));
        let top_right = tracer.fire_ray(3, 1, 0.0, 0.0);
        assert!(top_right.origin.is_close(&Point::new(-1.0, -2.0, 1.0)));
    }

    #[test]
    fn test_fire_all_rays_writes_every_pixel() {
        let mut tracer = tracer(4, 2);
        let mut pcg = Pcg::default();
        let renderer = |_ray: &Ray, _pcg: &mut Pcg| Color::new(1.0, 2.0, 3.0);

        tracer.fire_all_rays(&renderer, &mut pcg).unwrap();
        assert!(tracer.image().pixels().iter().all(|&p| p == Color::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_antialiasing_stays_inside_pixel() {
        let (width, height) = (5, 5);
        let camera = OrthogonalCamera::new(1.0);
        let mut tracer = ImageTracer::new(HdrImage::new(width, height), camera).with_samples_per_side(3);
        let calls = AtomicUsize::new(0);

        // Orthogonal camera: origin y = 1 - 2u, z = 2v - 1. Encode (u, v).
        let renderer = |ray: &Ray, _pcg: &mut Pcg| {
            calls.fetch_add(1, Ordering::Relaxed);
            let u = (1.0 - ray.origin.y()) / 2.0;
            let v = (ray.origin.z() + 1.0) / 2.0;
            Color::new(u, v, 0.0)
        };

        let mut pcg = Pcg::default();
        tracer.fire_all_rays(&renderer, &mut pcg).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), (width * height * 9) as usize);

        let span = (width - 1) as f32;
        for row in 0..height {
            for col in 0..width {
                let color = tracer.image().get_pixel(col, row).unwrap();
                // The mean of samples jittered over the pixel stays within it.
                assert!(color.x >= col as f32 / span - 1e-5 && color.x <= (col + 1) as f32 / span + 1e-5);
                assert!(color.y >= row as f32 / span - 1e-5 && color.y <= (row + 1) as f32 / span + 1e-5);
            }
        }
    }

    fn sphere_world() -> World {
        let grey = Arc::new(Material::diffuse(Pigment::Uniform(Color::splat(0.5))));
        let mut world = World::new();
        world.add_shape(
            Sphere::new(1.0)
                .with_transformation(Transformation::translation(Vec3::new(2.0, 0.0, 0.0)))
                .with_material(grey),
        );
        world
    }

    #[test]
    fn test_parallel_matches_per_pixel_serial() {
        let world = sphere_world();
        let renderer = PathTracer::new(&world)
            .with_background(Color::splat(0.8))
            .with_quality(2, 3, 2);
        let (seed, seq) = (17, 5);

        let mut parallel = tracer(9, 7).with_samples_per_side(2).with_bucket_size(4);
        parallel.fire_all_rays_parallel(&renderer, seed, seq).unwrap();

        let reference = tracer(9, 7).with_samples_per_side(2);
        for row in 0..7 {
            for col in 0..9 {
                let mut pcg = Pcg::for_pixel(seed, seq, (row * 9 + col) as u64);
                let expected = reference.sample_pixel(col, row, &renderer, &mut pcg);
                assert_eq!(parallel.image().get_pixel(col, row).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_parallel_is_reproducible() {
        let world = sphere_world();
        let renderer = PathTracer::new(&world).with_background(Color::ONE);

        let mut first = tracer(16, 12).with_bucket_size(5);
        first.fire_all_rays_parallel(&renderer, 3, 54).unwrap();
        let mut second = tracer(16, 12).with_bucket_size(3);
        second.fire_all_rays_parallel(&renderer, 3, 54).unwrap();

        assert_eq!(first.image(), second.image());
        // The sphere covers the centre and the background shows at a corner.
        let centre = first.image().get_pixel(8, 6).unwrap();
        assert!(centre.abs_diff_eq(Color::splat(0.5), 1e-6));
        assert_eq!(first.image().get_pixel(0, 0).unwrap(), Color::ONE);
    }
}
