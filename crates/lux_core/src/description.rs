//! JSON scene description.
//!
//! The file format is left-handed (z points into the screen). Loading flips
//! the z coordinate of every position so the renderer only ever sees its own
//! right-handed frame; direction-like values (`upVector`, `axis`, area light
//! edges) and colours are taken as written.

use std::path::{Path, PathBuf};

use lux_math::Vec3;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a scene. All of them are fatal:
/// nothing is rendered from a scene that fails here.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scene: `{field}` {reason}")]
    Invalid { field: String, reason: String },
}

pub type SceneResult<T> = Result<T, SceneError>;

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> SceneError {
    SceneError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Which integrator turns camera rays into colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Fixed colour on any hit; a visibility check, not a light simulation.
    Binary,
    /// Direct lighting with Blinn-Phong materials.
    Phong,
    /// Recursive Monte-Carlo path tracing with BRDF materials.
    Pathtracer,
}

/// Operator compressing linear radiance into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneMap {
    /// Luminance-based Reinhard: `c / (1 + L)`.
    #[default]
    Reinhard,
    /// Per-channel `1 - exp(-c)`.
    Exponential,
}

/// Top level of a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    #[serde(rename = "rendermode")]
    pub render_mode: RenderMode,
    #[serde(default = "default_bounces")]
    pub nbounces: u32,
    /// Base seed for the per-pixel samplers.
    #[serde(default)]
    pub seed: u64,
    pub camera: CameraDesc,
    pub scene: WorldDesc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDesc {
    #[serde(rename = "type", default = "default_camera_kind")]
    pub kind: String,
    pub width: u32,
    /// 0 means "derive from `aspect_ratio`".
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_aspect_ratio", alias = "aspectratio")]
    pub aspect_ratio: f32,
    pub position: Vec3,
    pub look_at: Vec3,
    pub up_vector: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    #[serde(default = "default_exposure")]
    pub exposure: f32,
    #[serde(default)]
    pub lens_radius: f32,
    #[serde(default = "default_samples")]
    pub samples: u32,
    #[serde(default)]
    pub tonemap: ToneMap,
}

impl CameraDesc {
    /// Image height in pixels, falling back to `width / aspect_ratio`.
    pub fn image_height(&self) -> u32 {
        if self.height > 0 {
            self.height
        } else {
            ((self.width as f32 / self.aspect_ratio) as u32).max(1)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldDesc {
    #[serde(rename = "backgroundcolor", default)]
    pub background: Vec3,
    #[serde(default)]
    pub shapes: Vec<ShapeDesc>,
    #[serde(rename = "lightsources", default)]
    pub lights: Vec<LightDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDesc {
    Sphere {
        center: Vec3,
        radius: f32,
        #[serde(default)]
        material: MaterialDesc,
    },
    Cylinder {
        center: Vec3,
        axis: Vec3,
        radius: f32,
        /// Half-extent along the axis.
        height: f32,
        #[serde(default)]
        material: MaterialDesc,
    },
    Triangle {
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        #[serde(default)]
        material: MaterialDesc,
    },
}

impl ShapeDesc {
    pub fn material(&self) -> &MaterialDesc {
        match self {
            ShapeDesc::Sphere { material, .. }
            | ShapeDesc::Cylinder { material, .. }
            | ShapeDesc::Triangle { material, .. } => material,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum LightDesc {
    #[serde(rename = "pointlight")]
    Point { position: Vec3, intensity: Vec3 },
    #[serde(rename = "arealight")]
    Area {
        corner: Vec3,
        edge1: Vec3,
        edge2: Vec3,
        intensity: Vec3,
        samples: u32,
    },
}

/// Material block as written in the file.
///
/// The same block is read as Blinn-Phong parameters in phong mode and as a
/// BRDF selection (`brdf_type`) in the other modes, so every field is
/// optional here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MaterialDesc {
    #[serde(rename = "diffusecolor")]
    pub diffuse_color: Vec3,
    #[serde(rename = "specularcolor")]
    pub specular_color: Vec3,
    #[serde(rename = "specularexponent")]
    pub specular_exponent: f32,
    pub ks: f32,
    pub kd: f32,
    pub reflectivity: f32,
    #[serde(rename = "refractiveindex")]
    pub refractive_index: f32,
    #[serde(rename = "isreflective")]
    pub is_reflective: bool,
    #[serde(rename = "isrefractive")]
    pub is_refractive: bool,
    pub transparency: f32,
    #[serde(rename = "brdfType")]
    pub brdf_type: Option<String>,
    /// Normal-incidence Fresnel reflectance for the Schlick BRDFs.
    pub reflectance: f32,
    pub texture: Option<String>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::splat(0.5),
            specular_color: Vec3::ONE,
            specular_exponent: 10.0,
            ks: 0.1,
            kd: 0.9,
            reflectivity: 0.0,
            refractive_index: 1.0,
            is_reflective: false,
            is_refractive: false,
            transparency: 0.0,
            brdf_type: None,
            reflectance: 0.04,
            texture: None,
        }
    }
}

fn default_bounces() -> u32 {
    1
}

fn default_camera_kind() -> String {
    "pinhole".to_string()
}

fn default_aspect_ratio() -> f32 {
    1.0
}

fn default_exposure() -> f32 {
    0.1
}

fn default_samples() -> u32 {
    20
}

impl SceneDescription {
    /// Read, parse, convert and validate a scene file.
    pub fn from_path(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> SceneResult<Self> {
        let mut desc: SceneDescription = serde_json::from_str(text)?;
        desc.flip_handedness();
        desc.validate()?;

        log::info!(
            "Loaded {:?} scene: {} shapes, {} lights, {}x{}",
            desc.render_mode,
            desc.scene.shapes.len(),
            desc.scene.lights.len(),
            desc.camera.width,
            desc.camera.image_height()
        );

        Ok(desc)
    }

    /// Negate the z coordinate of every position.
    fn flip_handedness(&mut self) {
        fn flip(p: &mut Vec3) {
            p.z = -p.z;
        }

        flip(&mut self.camera.position);
        flip(&mut self.camera.look_at);

        for shape in &mut self.scene.shapes {
            match shape {
                ShapeDesc::Sphere { center, .. } | ShapeDesc::Cylinder { center, .. } => {
                    flip(center)
                }
                ShapeDesc::Triangle { v0, v1, v2, .. } => {
                    flip(v0);
                    flip(v1);
                    flip(v2);
                }
            }
        }

        for light in &mut self.scene.lights {
            match light {
                LightDesc::Point { position, .. } => flip(position),
                LightDesc::Area { corner, .. } => flip(corner),
            }
        }
    }

    fn validate(&self) -> SceneResult<()> {
        let camera = &self.camera;
        if camera.width == 0 {
            return Err(invalid("camera.width", "must be positive"));
        }
        if camera.height == 0 && !(camera.aspect_ratio > 0.0) {
            return Err(invalid("camera.aspectRatio", "must be positive"));
        }
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(invalid("camera.fov", "must lie strictly between 0 and 180"));
        }
        if camera.samples == 0 {
            return Err(invalid("camera.samples", "must be positive"));
        }
        if camera.lens_radius < 0.0 {
            return Err(invalid("camera.lensRadius", "must not be negative"));
        }
        if (camera.look_at - camera.position).length_squared() == 0.0 {
            return Err(invalid("camera.lookAt", "must differ from camera.position"));
        }
        if camera
            .up_vector
            .cross(camera.position - camera.look_at)
            .length_squared()
            == 0.0
        {
            return Err(invalid(
                "camera.upVector",
                "must not be parallel to the viewing direction",
            ));
        }

        for (i, shape) in self.scene.shapes.iter().enumerate() {
            match shape {
                ShapeDesc::Sphere { radius, .. } if *radius <= 0.0 => {
                    return Err(invalid(format!("scene.shapes[{i}].radius"), "must be positive"));
                }
                ShapeDesc::Cylinder {
                    axis,
                    radius,
                    height,
                    ..
                } => {
                    if *radius <= 0.0 || *height <= 0.0 {
                        return Err(invalid(
                            format!("scene.shapes[{i}]"),
                            "cylinder radius and height must be positive",
                        ));
                    }
                    if ![Vec3::X, Vec3::Y, Vec3::Z].contains(axis) {
                        return Err(invalid(
                            format!("scene.shapes[{i}].axis"),
                            "must be one of [1,0,0], [0,1,0] or [0,0,1]",
                        ));
                    }
                }
                _ => {}
            }

            let material = shape.material();
            if material.is_refractive && !(material.refractive_index > 0.0) {
                return Err(invalid(
                    format!("scene.shapes[{i}].material.refractiveindex"),
                    "must be positive for a refractive material",
                ));
            }
        }

        for (i, light) in self.scene.lights.iter().enumerate() {
            if let LightDesc::Area { samples: 0, .. } = light {
                return Err(invalid(
                    format!("scene.lightsources[{i}].samples"),
                    "must be positive",
                ));
            }
        }

        Ok(())
    }
}
