//! Lux Core - the raster side of the renderer.
//!
//! This crate provides:
//!
//! - **`HdrImage`**: a fixed-size floating point raster the tracer writes into
//!   and image pigments sample from
//! - **Tone mapping**: log-average luminosity, normalization and clamping
//! - **Raster I/O**: loading textures and saving tone-mapped LDR output
//!   through the `image` crate
//!
//! # Example
//!
//! ```ignore
//! use lux_core::HdrImage;
//!
//! let mut img = HdrImage::new(640, 480);
//! // ... render ...
//! img.normalize(1.0, None);
//! img.clamp();
//! img.save_ldr("out.png", 1.0)?;
//! ```

pub mod raster;

// Re-export commonly used types
pub use raster::{HdrImage, ImageError, ImageResult, DEFAULT_LUMINOSITY_DELTA};
