//! Per-particle brightness oscillation for static star layers.
//!
//! Each particle gets its own frequency and phase at generation time, so the
//! sky sparkles without any visible synchrony. Positions are never touched.

use crate::error::RecipeError;
use crate::layer::Layer;

/// Brightness oscillation parameters.
///
/// `brightness = base_level + amplitude * sin(elapsed * frequency_i + phase_i)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwinkleConfig {
    pub base_level: f32,
    pub amplitude: f32,
    /// Per-particle angular frequency is drawn from `[min_frequency, max_frequency)`.
    pub min_frequency: f32,
    pub max_frequency: f32,
}

impl TwinkleConfig {
    pub fn new(base_level: f32, amplitude: f32) -> Self {
        Self {
            base_level,
            amplitude,
            ..Default::default()
        }
    }

    pub fn with_frequency(mut self, min: f32, max: f32) -> Self {
        self.min_frequency = min;
        self.max_frequency = max;
        self
    }

    /// Brightness stays inside `[base - amplitude, base + amplitude]`, which must fit in `[0, 1]`.
    pub fn validate(&self) -> Result<(), RecipeError> {
        let low = self.base_level - self.amplitude;
        let high = self.base_level + self.amplitude;
        if !low.is_finite() || !high.is_finite() || self.amplitude < 0.0 || low < 0.0 || high > 1.0
        {
            return Err(RecipeError::TwinkleOutOfRange {
                base_level: self.base_level,
                amplitude: self.amplitude,
            });
        }
        let (min, max) = (self.min_frequency, self.max_frequency);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(RecipeError::InvalidTwinkleFrequency { min, max });
        }
        Ok(())
    }

    #[inline]
    pub fn brightness(&self, elapsed: f32, frequency: f32, phase: f32) -> f32 {
        let b = self.base_level + self.amplitude * (elapsed * frequency + phase).sin();
        b.clamp(0.0, 1.0)
    }
}

impl Default for TwinkleConfig {
    fn default() -> Self {
        Self {
            base_level: 0.6,
            amplitude: 0.4,
            min_frequency: 0.5,
            max_frequency: 2.0,
        }
    }
}

/// Frequencies and phases fixed at generation time.
#[derive(Debug, Clone)]
pub(crate) struct TwinkleState {
    pub(crate) config: TwinkleConfig,
    pub(crate) frequencies: Vec<f32>,
    pub(crate) phases: Vec<f32>,
}

/// Recompute the colors of a twinkling layer for `elapsed` seconds.
///
/// Each color becomes the particle's generated tint times its brightness.
/// Layers without twinkle are left alone.
pub fn modulate(layer: &mut Layer, elapsed: f32) {
    let Some(state) = layer.twinkle.as_ref() else {
        return;
    };

    for (i, color) in layer.colors.iter_mut().enumerate() {
        let b = state
            .config
            .brightness(elapsed, state.frequencies[i], state.phases[i]);
        *color = layer.tints[i] * b;
    }
    layer.dirty = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{generate, LayerRecipe};
    use crate::layout::Layout;
    use crate::spawn::SeededSource;
    use crate::visuals::Palette;
    use glam::Vec3;

    fn sky(config: TwinkleConfig) -> Layer {
        let recipe = LayerRecipe::new(
            "sky",
            Layout::SphereShell {
                min_radius: 10.0,
                max_radius: 20.0,
            },
            64,
        )
        .with_palette(Palette::single(Vec3::ONE))
        .with_twinkle(config);
        generate(&recipe, &mut SeededSource::new(17)).unwrap()
    }

    #[test]
    fn test_brightness_stays_in_band() {
        let config = TwinkleConfig::new(0.5, 0.3);
        let mut layer = sky(config);
        let rest = layer.positions().to_vec();
        for frame in 0..600 {
            modulate(&mut layer, frame as f32 / 60.0);
            for c in layer.colors() {
                // White tint, so every channel equals the brightness.
                assert!(c.x >= 0.2 - 1e-5 && c.x <= 0.8 + 1e-5);
            }
        }
        assert_eq!(layer.positions(), rest.as_slice());
    }

    #[test]
    fn test_particles_do_not_twinkle_in_sync() {
        let mut layer = sky(TwinkleConfig::default());
        modulate(&mut layer, 3.0);
        let first = layer.colors()[0];
        assert!(layer.colors().iter().any(|c| (c.x - first.x).abs() > 1e-3));
    }

    #[test]
    fn test_modulate_marks_dirty() {
        let mut layer = sky(TwinkleConfig::default());
        layer.mark_clean();
        modulate(&mut layer, 1.0);
        assert!(layer.is_dirty());
    }

    #[test]
    fn test_validate_rejects_clipping() {
        assert!(TwinkleConfig::new(0.8, 0.3).validate().is_err());
        assert!(TwinkleConfig::new(0.2, 0.3).validate().is_err());
        assert!(TwinkleConfig::new(0.5, 0.5).validate().is_ok());
        assert!(TwinkleConfig::default()
            .with_frequency(2.0, 1.0)
            .validate()
            .is_err());
    }
}
