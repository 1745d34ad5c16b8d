//! High dynamic range raster.
//!
//! Stores linear radiance per pixel. The tracer only needs `set_pixel` and
//! `get_pixel`; the tone mapping and file helpers are here so the driver can
//! export a viewable image and image pigments can load textures.

use std::path::Path;

use lux_math::Color;
use thiserror::Error;

/// Offset added to every luminosity before taking its logarithm.
pub const DEFAULT_LUMINOSITY_DELTA: f32 = 1e-10;

/// Errors that can occur while accessing or converting a raster.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Pixel ({col}, {row}) is outside a {width}x{height} image")]
    OutOfBounds {
        col: u32,
        row: u32,
        width: u32,
        height: u32,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image codec error: {0}")]
    Codec(#[from] image::ImageError),

    #[error("Invalid image: {0}")]
    Invalid(String),
}

pub type ImageResult<T> = Result<T, ImageError>;

/// A fixed-size raster of linear colors, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct HdrImage {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl HdrImage {
    /// Create a new image filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width as usize) * (height as usize)],
        }
    }

    /// Wrap existing row-major pixel data.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> ImageResult<Self> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(ImageError::Invalid(format!(
                "expected {} pixels for {}x{}, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn valid_coordinates(&self, col: u32, row: u32) -> bool {
        col < self.width && row < self.height
    }

    fn pixel_offset(&self, col: u32, row: u32) -> ImageResult<usize> {
        if !self.valid_coordinates(col, row) {
            return Err(ImageError::OutOfBounds {
                col,
                row,
                width: self.width,
                height: self.height,
            });
        }
        Ok(row as usize * self.width as usize + col as usize)
    }

    pub fn get_pixel(&self, col: u32, row: u32) -> ImageResult<Color> {
        let offset = self.pixel_offset(col, row)?;
        Ok(self.pixels[offset])
    }

    pub fn set_pixel(&mut self, col: u32, row: u32, color: Color) -> ImageResult<()> {
        let offset = self.pixel_offset(col, row)?;
        self.pixels[offset] = color;
        Ok(())
    }

    /// Logarithmic average of the per-pixel luminosity.
    ///
    /// Luminosity of a pixel is the mean of its largest and smallest channel.
    pub fn average_luminosity(&self, delta: f32) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        let cumsum: f64 = self
            .pixels
            .iter()
            .map(|p| f64::from(luminosity(*p) + delta).log10())
            .sum();
        10f64.powf(cumsum / self.pixels.len() as f64) as f32
    }

    /// Scale every pixel by `factor / luminosity`.
    ///
    /// With `luminosity == None` the image's own average luminosity is used.
    pub fn normalize(&mut self, factor: f32, luminosity: Option<f32>) {
        let luminosity = luminosity.unwrap_or_else(|| self.average_luminosity(DEFAULT_LUMINOSITY_DELTA));
        if luminosity <= 0.0 {
            log::warn!("Skipping normalization of an image with zero luminosity");
            return;
        }
        let scale = factor / luminosity;
        for pixel in &mut self.pixels {
            *pixel *= scale;
        }
    }

    /// Swap rows top to bottom.
    pub fn flip_vertical(&mut self) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        let rows: Vec<Vec<Color>> = self.pixels.chunks(width).rev().map(<[Color]>::to_vec).collect();
        self.pixels = rows.concat();
    }

    /// Compress each channel into [0, 1) with `x / (1 + x)`.
    pub fn clamp(&mut self) {
        for pixel in &mut self.pixels {
            *pixel = *pixel / (Color::ONE + *pixel);
        }
    }

    /// Convert to 8-bit RGB with the given display gamma.
    ///
    /// Channels are expected in [0, 1]; call [`HdrImage::clamp`] first.
    pub fn to_rgb8(&self, gamma: f32) -> image::RgbImage {
        let mut out = image::RgbImage::new(self.width, self.height);
        for (col, row, pixel) in out.enumerate_pixels_mut() {
            let color = self.pixels[row as usize * self.width as usize + col as usize];
            *pixel = image::Rgb([
                encode_channel(color.x, gamma),
                encode_channel(color.y, gamma),
                encode_channel(color.z, gamma),
            ]);
        }
        out
    }

    /// Save a gamma-encoded 8-bit copy. The format follows the file extension.
    pub fn save_ldr(&self, path: impl AsRef<Path>, gamma: f32) -> ImageResult<()> {
        let path = path.as_ref();
        self.to_rgb8(gamma).save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }

    /// Load an image file and convert it to linear floats.
    pub fn load(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?;
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();

        // Rows come out top to bottom, which matches our row-major layout.
        let pixels = rgb
            .pixels()
            .map(|p| {
                Color::new(
                    srgb_to_linear(p[0]),
                    srgb_to_linear(p[1]),
                    srgb_to_linear(p[2]),
                )
            })
            .collect();

        log::debug!("Loaded raster {} ({}x{})", path.display(), width, height);
        Self::from_pixels(width, height, pixels)
    }
}

fn luminosity(color: Color) -> f32 {
    (color.max_element() + color.min_element()) / 2.0
}

fn encode_channel(value: f32, gamma: f32) -> u8 {
    (255.0 * value.clamp(0.0, 1.0).powf(1.0 / gamma)).round() as u8
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
