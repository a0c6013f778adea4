//! Point and area lights.
//!
//! A light answers one question for a shading point: how much radiance
//! arrives from it, after a visibility test against the scene.

use lux_math::{Color, Vec3};
use rand::RngCore;

use crate::sampling::gen_f32;
use crate::{HitRecord, Hittable, Ray, SCENE_RAY_T};

/// Any light the scene can hold.
#[derive(Debug, Clone)]
pub enum Light {
    Point(PointLight),
    Area(AreaLight),
}

impl Light {
    /// Reference position used for shading directions. For an area light this
    /// is its corner.
    pub fn position(&self) -> Vec3 {
        match self {
            Light::Point(light) => light.position,
            Light::Area(light) => light.corner,
        }
    }

    pub fn intensity(&self) -> Color {
        match self {
            Light::Point(light) => light.intensity,
            Light::Area(light) => light.intensity,
        }
    }

    /// Radiance arriving at `rec` from this light, zero where occluded.
    pub fn sample<H>(&self, rec: &HitRecord<'_>, world: &H, rng: &mut dyn RngCore) -> Color
    where
        H: Hittable + ?Sized,
    {
        match self {
            Light::Point(light) => light.sample(rec, world),
            Light::Area(light) => light.sample(rec, world, rng),
        }
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<AreaLight> for Light {
    fn from(light: AreaLight) -> Self {
        Light::Area(light)
    }
}

/// True if anything in `world` lies along `direction` from `origin`.
///
/// The test is not bounded by the light's distance, so geometry behind the
/// light also casts shadow.
fn occluded<H: Hittable + ?Sized>(world: &H, origin: Vec3, direction: Vec3) -> bool {
    world.hit(&Ray::new(origin, direction), SCENE_RAY_T).is_some()
}

#[derive(Debug, Clone)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// `max(0, N·L) · I · 2 / d²`.
    pub fn sample<H: Hittable + ?Sized>(&self, rec: &HitRecord<'_>, world: &H) -> Color {
        let to_light = self.position - rec.p;
        let dist_sq = to_light.length_squared();
        if dist_sq == 0.0 {
            return Color::ZERO;
        }

        let light_dir = to_light / dist_sq.sqrt();
        if occluded(world, rec.p, light_dir) {
            return Color::ZERO;
        }

        let n_dot_l = rec.normal.dot(light_dir).max(0.0);
        n_dot_l * self.intensity * 2.0 / dist_sq
    }
}

/// Parallelogram emitter spanned by `edge1` and `edge2` from `corner`.
#[derive(Debug, Clone)]
pub struct AreaLight {
    pub corner: Vec3,
    pub edge1: Vec3,
    pub edge2: Vec3,
    pub intensity: Color,
    /// Shadow rays per shading point
    pub samples: u32,
}

impl AreaLight {
    pub fn new(corner: Vec3, edge1: Vec3, edge2: Vec3, intensity: Color, samples: u32) -> Self {
        Self {
            corner,
            edge1,
            edge2,
            intensity,
            samples: samples.max(1),
        }
    }

    /// Mean over `samples` uniform points on the parallelogram. Each visible
    /// point contributes with attenuation `1 / (1 + 0.1·d² + 0.01·d⁴)`.
    pub fn sample<H: Hittable + ?Sized>(
        &self,
        rec: &HitRecord<'_>,
        world: &H,
        rng: &mut dyn RngCore,
    ) -> Color {
        let mut total = Color::ZERO;

        for _ in 0..self.samples {
            let u = gen_f32(rng);
            let v = gen_f32(rng);
            let point = self.corner + u * self.edge1 + v * self.edge2;

            let to_light = point - rec.p;
            let dist_sq = to_light.length_squared();
            if dist_sq == 0.0 {
                continue;
            }

            let light_dir = to_light / dist_sq.sqrt();
            if occluded(world, rec.p, light_dir) {
                continue;
            }

            let cos_theta = rec.normal.dot(light_dir).max(0.0);
            let attenuation = 1.0 / (1.0 + 0.1 * dist_sq + 0.01 * dist_sq * dist_sq);
            total += attenuation * cos_theta * self.intensity * 2.0;
        }

        total / self.samples as f32
    }
}
