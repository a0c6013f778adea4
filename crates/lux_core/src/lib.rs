//! Lux Core - scene configuration and assets.
//!
//! This crate provides:
//!
//! - **Scene description**: the JSON scene format, parsed with serde and
//!   converted into the renderer's right-handed working frame
//! - **Textures**: binary PPM loading and a path-keyed cache so primitives
//!   share texture data
//!
//! # Example
//!
//! ```ignore
//! use lux_core::SceneDescription;
//!
//! let desc = SceneDescription::from_path("scene.json")?;
//! println!("{} shapes, {} lights", desc.scene.shapes.len(), desc.scene.lights.len());
//! ```

pub mod description;
pub mod texture;

pub use description::{
    CameraDesc, LightDesc, MaterialDesc, RenderMode, SceneDescription, SceneError, SceneResult,
    ShapeDesc, ToneMap, WorldDesc,
};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
