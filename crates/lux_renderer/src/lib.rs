//! Lux renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer over a small closed set of shapes, including
//! boolean (CSG) combinations, with simpler preview renderers sharing the
//! same ray to color contract.

mod bucket;
mod camera;
mod csg;
mod cuboid;
mod image_tracer;
mod material;
mod pcg;
mod plane;
mod renderer;
mod shape;
mod sphere;
mod world;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{Camera, OrthogonalCamera, PerspectiveCamera};
pub use csg::{Csg, CsgOperation};
pub use cuboid::Cuboid;
pub use image_tracer::ImageTracer;
pub use material::{Brdf, DiffuseBrdf, Material, Pigment, SpecularBrdf, SCATTER_TMIN};
pub use pcg::{Pcg, DEFAULT_INIT_SEQ, DEFAULT_INIT_STATE};
pub use plane::Plane;
pub use renderer::{FlatRenderer, OnOffRenderer, PathTracer, PointLightRenderer, Renderer};
pub use shape::{HitRecord, Shape};
pub use sphere::Sphere;
pub use world::{PointLight, World};

/// Re-export the geometry types from lux_math
pub use lux_math::{Color, Normal, Point, Ray, Transformation, Vec2d, Vec3};
