//! Math primitives shared by the lux crates.
//!
//! `Vec3` and friends come straight from `glam`; this crate adds the
//! ray-tracing specific types on top of them.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Colour in linear RGB. Components may exceed 1.0 before tone mapping.
pub type Color = Vec3;
