//! Lux math types.
//!
//! Free vectors come straight from `glam`; affine points and surface normals
//! are distinct wrappers so each transforms by its own rule.

pub mod geometry;
pub mod ray;
pub mod transform;

pub use geometry::{are_close, create_onb_from_z, Color, Normal, Point, Vec2d, EPSILON};
pub use ray::{Ray, DEFAULT_TMIN};
pub use transform::Transformation;

// Re-export glam for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
