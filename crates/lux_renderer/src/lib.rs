//! Lux Renderer - CPU ray tracing
//!
//! Primitives, a BVH, point and area lights, BRDF and Blinn-Phong materials,
//! and three integrators (binary, phong, pathtracer) driven by a pinhole or
//! thin-lens camera. Rendering is split into buckets and run on rayon.

mod bucket;
mod bvh;
mod camera;
mod cylinder;
mod hittable;
mod light;
mod material;
mod renderer;
pub mod sampling;
mod scene;
mod shape;
mod sphere;
mod tonemap;
mod triangle;

pub use bucket::{
    generate_buckets, pixel_rng, render, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE,
};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use cylinder::Cylinder;
pub use hittable::{HitRecord, Hittable, HittableList, SCENE_RAY_T};
pub use light::{AreaLight, Light, PointLight};
pub use material::{BlinnPhong, Lambertian, Material, Schlick, SchlickRefractive};
pub use renderer::{
    binary_color, path_trace, phong_color, ray_color, render_pixel, ImageBuffer, RenderConfig,
    HIT_COLOR,
};
pub use scene::Scene;
pub use shape::Shape;
pub use sphere::Sphere;
pub use tonemap::{linear_to_gamma, ToneMapper};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from lux_math
pub use lux_math::{Aabb, Color, Interval, Ray, Vec3};
