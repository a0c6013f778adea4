//! Tone mapping and 8-bit quantisation of linear radiance.

use lux_core::ToneMap;
use lux_math::{Color, Interval};

/// Output channels are clamped here before scaling by 256, so the largest
/// value maps to 255.
const INTENSITY: Interval = Interval::new(0.0, 0.9999);

/// Applies exposure, a tone-mapping operator, gamma 2 and quantisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneMapper {
    pub operator: ToneMap,
    pub exposure: f32,
}

impl ToneMapper {
    pub fn new(operator: ToneMap, exposure: f32) -> Self {
        Self { operator, exposure }
    }

    /// Tone-mapped colour in display range, before gamma.
    ///
    /// Computed in f64 from inputs sanitised to `[0, f32::MAX]` (NaN counts as
    /// zero) so arbitrarily bright pixels stay finite and ordered.
    pub fn apply(&self, color: Color) -> [f64; 3] {
        let exposure = self.exposure as f64;
        let [r, g, b] = color.to_array().map(sanitize);

        match self.operator {
            ToneMap::Reinhard => {
                let (r, g, b) = (r * exposure, g * exposure, b * exposure);
                let luminance = 0.2126 * r + 0.7152 * g + 0.0722 * b;
                [r, g, b].map(|c| c / (1.0 + luminance))
            }
            ToneMap::Exponential => [r, g, b].map(|c| 1.0 - (-c * exposure).exp()),
        }
    }

    /// Final 8-bit output for one pixel.
    pub fn to_rgb8(&self, color: Color) -> [u8; 3] {
        self.apply(color).map(|c| quantize(linear_to_gamma(c)))
    }
}

impl Default for ToneMapper {
    fn default() -> Self {
        Self::new(ToneMap::Reinhard, 1.0)
    }
}

fn sanitize(c: f32) -> f64 {
    if c > 0.0 {
        c.min(f32::MAX) as f64
    } else {
        0.0
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

#[inline]
fn quantize(c: f64) -> u8 {
    (256.0 * INTENSITY.clamp(c as f32)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_black_and_overflow() {
        for operator in [ToneMap::Reinhard, ToneMap::Exponential] {
            let tone = ToneMapper::new(operator, 0.1);
            assert_eq!(tone.to_rgb8(Color::ZERO), [0, 0, 0]);
            assert_eq!(tone.to_rgb8(Color::splat(-5.0)), [0, 0, 0]);
            assert_eq!(tone.to_rgb8(Color::splat(f32::NAN)), [0, 0, 0]);

            // Huge input saturates without wrapping around
            assert_eq!(tone.to_rgb8(Color::splat(f32::MAX)), [255; 3]);
            assert_eq!(tone.to_rgb8(Color::splat(f32::INFINITY)), [255; 3]);
        }
    }

    #[test]
    fn test_exponential_saturates_to_255() {
        let tone = ToneMapper::new(ToneMap::Exponential, 1.0);
        assert_eq!(tone.to_rgb8(Color::splat(1e6)), [255, 255, 255]);
    }

    #[test]
    fn test_reinhard_known_value() {
        let tone = ToneMapper::new(ToneMap::Reinhard, 1.0);
        // Grey 1.0: luminance 1, mapped to 0.5, gamma sqrt(0.5)
        let [r, g, b] = tone.to_rgb8(Color::ONE);
        let expected = (256.0 * 0.5f64.sqrt()) as u8;
        assert_eq!([r, g, b], [expected; 3]);
    }

    #[test]
    fn test_monotonic_per_channel() {
        for operator in [ToneMap::Reinhard, ToneMap::Exponential] {
            let tone = ToneMapper::new(operator, 0.1);
            for channel in 0..3 {
                let mut previous = 0u8;
                let mut value = 0.0f32;
                while value < 1e7 {
                    let mut color = Color::splat(0.3);
                    color[channel] = value;
                    let out = tone.to_rgb8(color)[channel];
                    assert!(out >= previous, "{operator:?} channel {channel} at {value}");
                    previous = out;
                    value = value * 1.5 + 0.01;
                }
            }
        }
    }
}
