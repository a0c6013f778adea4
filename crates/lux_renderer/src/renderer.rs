//! Integrators and the image buffer.
//!
//! Three ways to turn a camera ray into a colour:
//! - binary: a fixed colour wherever something is hit
//! - phong: Blinn-Phong direct lighting with its own reflection/refraction
//! - pathtracer: recursive Monte Carlo path tracing over the BRDF materials
//!
//! A ray that escapes the scene returns the background in every mode.

use std::io::{self, Write};

use lux_core::{RenderMode, SceneDescription, ToneMap};
use lux_math::Color;
use rand::RngCore;

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::{Camera, Ray, Scene, ToneMapper, SCENE_RAY_T};

/// Colour written by the binary integrator for any hit.
pub const HIT_COLOR: Color = Color::new(1.0, 0.0, 0.0);

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// Samples per pixel (forced to 1 in binary mode)
    pub samples_per_pixel: u32,
    /// Recursion budget for reflection, refraction and path bounces
    pub nbounces: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    pub exposure: f32,
    pub tone_map: ToneMap,
    /// Base seed for the per-pixel generators
    pub seed: u64,
    /// Edge length of the square tiles rendered in parallel
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Pathtracer,
            samples_per_pixel: 20,
            nbounces: 1,
            background: Color::ZERO,
            exposure: 0.1,
            tone_map: ToneMap::Reinhard,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn from_description(desc: &SceneDescription) -> Self {
        let camera = &desc.camera;
        let binary = desc.render_mode == RenderMode::Binary;

        Self {
            mode: desc.render_mode,
            samples_per_pixel: if binary { 1 } else { camera.samples.max(1) },
            nbounces: desc.nbounces,
            background: desc.scene.background,
            // Binary output is written unexposed
            exposure: if binary { 1.0 } else { camera.exposure },
            tone_map: camera.tonemap,
            seed: desc.seed,
            bucket_size: DEFAULT_BUCKET_SIZE,
        }
    }

    pub fn tone_mapper(&self) -> ToneMapper {
        ToneMapper::new(self.tone_map, self.exposure)
    }
}

/// Visibility only: [`HIT_COLOR`] on a hit, the background otherwise.
pub fn binary_color(scene: &Scene, ray: &Ray, background: Color) -> Color {
    match scene.hit(ray, SCENE_RAY_T) {
        Some(_) => HIT_COLOR,
        None => background,
    }
}

/// Blinn-Phong shading of whatever `ray` hits, with `depth` recursive
/// reflection/refraction bounces available.
pub fn phong_color(
    scene: &Scene,
    ray: &Ray,
    background: Color,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    match scene.hit(ray, SCENE_RAY_T) {
        Some(rec) => rec.material.shade(scene, ray, &rec, background, depth, rng),
        None => background,
    }
}

/// Compute the color seen by a ray.
///
/// Each bounce adds the direct light at its hit point plus the attenuated
/// radiance of the next bounce. Out of depth, a hit is black.
pub fn path_trace(
    scene: &Scene,
    ray: &Ray,
    background: Color,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let Some(rec) = scene.hit(ray, SCENE_RAY_T) else {
        return background;
    };

    if depth == 0 {
        return Color::ZERO;
    }

    let direct = scene.direct_lighting(&rec, rng);

    match rec.material.scatter(ray, &rec, rng) {
        Some((attenuation, scattered)) => {
            // Fully absorbed: nothing further can contribute
            if attenuation == Color::ZERO {
                return Color::ZERO;
            }
            let indirect = path_trace(scene, &scattered, background, depth - 1, rng);
            attenuation * direct + attenuation * indirect
        }
        None => direct,
    }
}

/// Colour of a single ray under the configured integrator.
pub fn ray_color(scene: &Scene, ray: &Ray, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    match config.mode {
        RenderMode::Binary => binary_color(scene, ray, config.background),
        RenderMode::Phong => phong_color(scene, ray, config.background, config.nbounces, rng),
        RenderMode::Pathtracer => path_trace(scene, ray, config.background, config.nbounces, rng),
    }
}

/// Average linear radiance of pixel (x, y).
///
/// Only the path tracer jitters its rays; binary and phong modes reuse the
/// pixel-centre ray for every sample.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = match config.mode {
        RenderMode::Binary => 1,
        _ => config.samples_per_pixel.max(1),
    };

    let mut pixel_color = Color::ZERO;
    for sample in 0..samples {
        let ray = match config.mode {
            RenderMode::Pathtracer => camera.sample_ray(x, y, sample, rng),
            RenderMode::Binary | RenderMode::Phong => camera.center_ray(x, y),
        };
        pixel_color += ray_color(scene, &ray, config, rng);
    }

    pixel_color / samples as f32
}

/// Linear radiance per pixel, row-major from the top-left.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Tone-mapped, gamma-corrected 8-bit RGB triples.
    pub fn to_rgb8(&self, tone: &ToneMapper) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|&c| tone.to_rgb8(c)).collect()
    }

    /// Write the image as plain-text PPM (`P3`): a three-line header, then one
    /// `r g b` line per pixel.
    pub fn write_ppm<W: Write>(&self, mut writer: W, tone: &ToneMapper) -> io::Result<()> {
        writeln!(writer, "P3")?;
        writeln!(writer, "{} {}", self.width, self.height)?;
        writeln!(writer, "255")?;

        for [r, g, b] in self.to_rgb8(tone) {
            writeln!(writer, "{r} {g} {b}")?;
        }

        writer.flush()
    }
}
