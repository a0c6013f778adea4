//! Material system for ray tracing.
//!
//! Two families share one enum. The BRDF materials (Lambertian and the two
//! Schlick variants) answer `scatter` with an attenuation and a continuation
//! ray for the path tracer. Blinn-Phong answers `shade` with a finished colour,
//! recursing on its own for mirror and glass effects.

use std::sync::Arc;

use lux_core::Texture;
use lux_math::{Color, Vec3};
use rand::RngCore;

use crate::renderer::phong_color;
use crate::sampling::{gen_f32, random_unit_vector};
use crate::{HitRecord, Ray, Scene};

/// Index of refraction assumed by the refractive Schlick BRDF.
const SCHLICK_IOR: f32 = 1.5;

/// Beer's-law absorption coefficient of the refractive Schlick BRDF.
const SCHLICK_ABSORPTION: f32 = 0.2;

/// Constant ambient weight applied to the Blinn-Phong albedo.
const AMBIENT: f32 = 0.2;

/// Any material a shape can carry. Shared between shapes through `Arc`.
#[derive(Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Schlick(Schlick),
    SchlickRefractive(SchlickRefractive),
    BlinnPhong(BlinnPhong),
}

impl Material {
    pub fn texture(&self) -> Option<&Arc<Texture>> {
        match self {
            Material::Lambertian(m) => m.texture.as_ref(),
            Material::BlinnPhong(m) => m.texture.as_ref(),
            Material::Schlick(_) | Material::SchlickRefractive(_) => None,
        }
    }

    /// Whether hits on this material need texture coordinates.
    pub fn is_textured(&self) -> bool {
        self.texture().is_some()
    }

    /// Sample a continuation ray.
    ///
    /// Returns `(attenuation, scattered)`, or `None` when the material ends the
    /// path (Blinn-Phong is only evaluated through [`Material::shade`]).
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        match self {
            Material::Lambertian(m) => Some(m.scatter(rec, rng)),
            Material::Schlick(m) => Some(m.scatter(ray_in, rec, rng)),
            Material::SchlickRefractive(m) => Some(m.scatter(ray_in, rec, rng)),
            Material::BlinnPhong(_) => None,
        }
    }

    /// Direct-lighting colour at `rec`, with `depth` recursive bounces left
    /// for reflection and refraction. Only Blinn-Phong shades; the BRDF
    /// materials return black.
    pub fn shade(
        &self,
        scene: &Scene,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        background: Color,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        match self {
            Material::BlinnPhong(m) => m.shade(scene, ray_in, rec, background, depth, rng),
            _ => Color::ZERO,
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Schlick> for Material {
    fn from(m: Schlick) -> Self {
        Material::Schlick(m)
    }
}

impl From<SchlickRefractive> for Material {
    fn from(m: SchlickRefractive) -> Self {
        Material::SchlickRefractive(m)
    }
}

impl From<BlinnPhong> for Material {
    fn from(m: BlinnPhong) -> Self {
        Material::BlinnPhong(m)
    }
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Color,
    texture: Option<Arc<Texture>>,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self {
            albedo,
            texture: None,
        }
    }

    /// Albedo taken from `texture` at the hit's UV.
    pub fn textured(texture: Arc<Texture>) -> Self {
        Self::new(Color::ONE).with_texture(texture)
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    fn albedo(&self, rec: &HitRecord<'_>) -> Color {
        match &self.texture {
            Some(texture) => texture.sample(rec.u, rec.v),
            None => self.albedo,
        }
    }

    fn scatter(&self, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> (Color, Ray) {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        (self.albedo(rec), Ray::new(rec.p, scatter_direction))
    }
}

/// Mirror that reflects with Schlick's Fresnel probability and absorbs the
/// rest.
#[derive(Debug, Clone, Copy)]
pub struct Schlick {
    /// Reflectance at normal incidence (R0)
    pub reflectance: f32,
}

impl Schlick {
    pub fn new(reflectance: f32) -> Self {
        Self { reflectance }
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> (Color, Ray) {
        let unit_direction = ray_in.direction().normalize_or_zero();
        let reflected = Ray::new(rec.p, reflect(unit_direction, rec.normal));

        let cos_theta = (-unit_direction).dot(rec.normal).clamp(0.0, 1.0);
        if gen_f32(rng) < fresnel_schlick(cos_theta, self.reflectance) {
            (Color::ONE, reflected)
        } else {
            (Color::ZERO, reflected)
        }
    }
}

/// Glass-like Schlick BRDF: Fresnel-weighted choice between reflection and
/// refraction through a fixed IOR of 1.5, absorbing with distance.
#[derive(Debug, Clone, Copy)]
pub struct SchlickRefractive {
    /// Reflectance at normal incidence (R0)
    pub reflectance: f32,
}

impl SchlickRefractive {
    pub fn new(reflectance: f32) -> Self {
        Self { reflectance }
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord<'_>, rng: &mut dyn RngCore) -> (Color, Ray) {
        let unit_direction = ray_in.direction().normalize_or_zero();
        let reflected = reflect(unit_direction, rec.normal);

        let cos_theta = (-unit_direction).dot(rec.normal).clamp(0.0, 1.0);
        if gen_f32(rng) < fresnel_schlick(cos_theta, self.reflectance) {
            return (Color::ONE, Ray::new(rec.p, reflected));
        }

        let ri = if rec.front_face {
            1.0 / SCHLICK_IOR
        } else {
            SCHLICK_IOR
        };
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        let beers_law = Color::splat((-SCHLICK_ABSORPTION * rec.t).exp());

        let direction = if ri * sin_theta > 1.0 {
            // Total internal reflection
            reflected
        } else {
            refract(unit_direction, rec.normal, ri)
        };

        (beers_law, Ray::new(rec.p, direction))
    }
}

/// Blinn-Phong material with optional mirror reflection and refraction.
#[derive(Clone)]
pub struct BlinnPhong {
    pub diffuse_color: Color,
    pub specular_color: Color,
    pub specular_exponent: f32,
    /// Specular weight
    pub ks: f32,
    /// Diffuse weight
    pub kd: f32,
    pub reflectivity: f32,
    pub refractive_index: f32,
    pub is_reflective: bool,
    pub is_refractive: bool,
    /// Beer's-law absorption coefficient used by the recursive branches
    pub transparency: f32,
    pub texture: Option<Arc<Texture>>,
}

impl Default for BlinnPhong {
    fn default() -> Self {
        Self {
            diffuse_color: Color::splat(0.5),
            specular_color: Color::ONE,
            specular_exponent: 10.0,
            ks: 0.1,
            kd: 0.9,
            reflectivity: 0.0,
            refractive_index: 1.0,
            is_reflective: false,
            is_refractive: false,
            transparency: 0.0,
            texture: None,
        }
    }
}

impl BlinnPhong {
    fn albedo(&self, rec: &HitRecord<'_>) -> Color {
        match &self.texture {
            Some(texture) => texture.sample(rec.u, rec.v),
            None => self.diffuse_color,
        }
    }

    fn shade(
        &self,
        scene: &Scene,
        ray_in: &Ray,
        rec: &HitRecord<'_>,
        background: Color,
        depth: u32,
        rng: &mut dyn RngCore,
    ) -> Color {
        let unit_direction = ray_in.direction().normalize_or_zero();
        let view_direction = -unit_direction;

        let mut diffuse = Color::ZERO;
        let mut specular = Color::ZERO;

        for light in scene.lights() {
            let to_light = light.position() - rec.p;
            let dist_sq = to_light.length_squared();
            if dist_sq == 0.0 {
                continue;
            }
            let light_direction = to_light / dist_sq.sqrt();
            let half_vector = (view_direction + light_direction).normalize_or_zero();

            let lambertian = rec.normal.dot(light_direction).max(0.0);
            let specular_angle = rec.normal.dot(half_vector).max(0.0);
            let incoming = light.sample(rec, scene.world(), rng);

            diffuse += lambertian * incoming * 2.0 / dist_sq;
            specular += specular_angle.powf(self.specular_exponent)
                * self.specular_color
                * incoming
                * 2.0
                / dist_sq;
        }

        let albedo = self.albedo(rec);
        let mut shading = self.kd * diffuse * albedo + self.ks * specular + AMBIENT * albedo;

        // The recursive branches replace the local term rather than add to it
        if self.is_reflective && depth > 0 && self.reflectivity > 0.0 {
            let reflected = Ray::new(rec.p, reflect(unit_direction, rec.normal));
            shading = phong_color(scene, &reflected, background, depth - 1, rng) * self.reflectivity;
        }

        if self.is_refractive && depth > 0 {
            let ri = if rec.front_face {
                1.0 / self.refractive_index
            } else {
                self.refractive_index
            };

            let cos_theta = view_direction.dot(rec.normal).min(1.0);
            let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

            let cannot_refract = ri * sin_theta > 1.0;
            let direction = if cannot_refract || reflectance(cos_theta, ri) > gen_f32(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, ri)
            };

            let traced = phong_color(scene, &Ray::new(rec.p, direction), background, depth - 1, rng);
            shading = traced * (-self.transparency * rec.t).exp();
        }

        shading
    }
}

/// Schlick's approximation with a given reflectance at normal incidence.
fn fresnel_schlick(cosine: f32, r0: f32) -> f32 {
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

/// Schlick's approximation for a refractive index ratio.
fn reflectance(cosine: f32, ri: f32) -> f32 {
    let r0 = ((1.0 - ri) / (1.0 + ri)).powi(2);
    fresnel_schlick(cosine.clamp(0.0, 1.0), r0)
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with unit normal `n`.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[inline]
fn near_zero(v: Vec3) -> bool {
    const S: f32 = 1e-8;
    v.x.abs() < S && v.y.abs() < S && v.z.abs() < S
}
