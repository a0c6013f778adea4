//! Random and low-discrepancy sampling helpers.
//!
//! Every function takes the generator explicitly; there is no global RNG, so a
//! render is reproducible from its seed regardless of thread count.

use glam::Vec2;
use lux_math::Vec3;
use rand::{Rng, RngCore};
use std::f32::consts::PI;

/// Largest f32 strictly below 1.
const ONE_MINUS_EPSILON: f32 = 1.0 - f32::EPSILON / 2.0;

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Uniformly distributed direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Rejection sampling inside the unit ball, then project to the surface
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Uniform point on the unit disk, polar mapping `r = sqrt(u)`, `θ = 2πv`.
pub fn sample_unit_disk(rng: &mut dyn RngCore) -> Vec2 {
    let r = gen_f32(rng).sqrt();
    let theta = 2.0 * PI * gen_f32(rng);
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Radical inverse of `index` in `base`: the Halton sequence value in [0, 1).
pub fn halton(index: u32, base: u32) -> f32 {
    let inv_base = 1.0 / base as f32;
    let mut f = inv_base;
    let mut result = 0.0;
    let mut i = index;

    while i > 0 {
        result += f * (i % base) as f32;
        i /= base;
        f *= inv_base;
    }

    // Long digit expansions can round up to exactly 1.0 in f32
    result.min(ONE_MINUS_EPSILON)
}

/// 2-D Halton point with bases 2 and 3.
#[inline]
pub fn halton_2d(index: u32) -> Vec2 {
    Vec2::new(halton(index, 2), halton(index, 3))
}
