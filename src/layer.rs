//! Particle layers and the layer generator.
//!
//! A [`Layer`] is a fixed-size arena: every per-particle buffer has exactly
//! `count` entries from generation until drop. Buffers are only mutated by
//! [`physics::step`](crate::physics::step), [`impulse::inject`](crate::impulse::inject),
//! [`twinkle::modulate`](crate::twinkle::modulate) and [`rain::advance`](crate::rain::advance).

use glam::Vec3;
use log::debug;

use crate::error::RecipeError;
use crate::impulse::ImpulseConfig;
use crate::layout::Layout;
use crate::physics::PhysicsConfig;
use crate::rain::{RainConfig, RainState};
use crate::spawn::{RandomSource, SpawnContext};
use crate::twinkle::{TwinkleConfig, TwinkleState};
use crate::visuals::{BlendMode, Palette, SizeRange, VisualConfig};

/// Everything needed to generate one layer.
///
/// ```ignore
/// let recipe = LayerRecipe::new("core", Layout::SphereShell { min_radius: 5.0, max_radius: 9.0 }, 2_000)
///     .with_palette(Palette::single(Vec3::new(1.0, 0.9, 0.7)))
///     .with_blend_mode(BlendMode::Additive)
///     .with_physics(PhysicsConfig::default());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecipe {
    pub name: String,
    pub layout: Layout,
    pub count: usize,
    pub palette: Palette,
    pub visuals: VisualConfig,
    /// `None` makes the layer static: no advection, relaxation or attraction.
    pub physics: Option<PhysicsConfig>,
    pub impulse: Option<ImpulseConfig>,
    pub twinkle: Option<TwinkleConfig>,
    /// Falling motion; only valid with [`Layout::Rain`].
    pub rain: Option<RainConfig>,
    /// Overrides the seed the field derives for this layer.
    pub seed: Option<u64>,
}

impl LayerRecipe {
    pub fn new(name: impl Into<String>, layout: Layout, count: usize) -> Self {
        Self {
            name: name.into(),
            layout,
            count,
            palette: Palette::default(),
            visuals: VisualConfig::default(),
            physics: None,
            impulse: None,
            twinkle: None,
            rain: None,
            seed: None,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_visuals(mut self, visuals: VisualConfig) -> Self {
        self.visuals = visuals;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.visuals.blend_mode = blend_mode;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.visuals.opacity = opacity;
        self
    }

    pub fn with_sizes(mut self, sizes: SizeRange) -> Self {
        self.visuals.sizes = sizes;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn with_impulse(mut self, impulse: ImpulseConfig) -> Self {
        self.impulse = Some(impulse);
        self
    }

    pub fn with_twinkle(mut self, twinkle: TwinkleConfig) -> Self {
        self.twinkle = Some(twinkle);
        self
    }

    pub fn with_rain(mut self, rain: RainConfig) -> Self {
        self.rain = Some(rain);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.count == 0 {
            return Err(RecipeError::EmptyLayer);
        }
        self.layout.validate(self.count)?;
        self.palette.validate()?;
        self.visuals.validate()?;
        if let Some(physics) = &self.physics {
            physics.validate()?;
        }
        if let Some(impulse) = &self.impulse {
            impulse.validate()?;
        }
        if let Some(twinkle) = &self.twinkle {
            twinkle.validate()?;
        }
        if let Some(rain) = &self.rain {
            rain.validate()?;
            if !matches!(self.layout, Layout::Rain(_)) {
                return Err(RecipeError::RainWithoutGrid);
            }
        }
        Ok(())
    }
}

/// A fixed-size set of particles sharing a recipe.
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) name: String,
    pub(crate) positions: Vec<Vec3>,
    pub(crate) rest_positions: Vec<Vec3>,
    pub(crate) velocities: Vec<Vec3>,
    pub(crate) colors: Vec<Vec3>,
    /// Colors as generated; twinkle scales these into `colors`.
    pub(crate) tints: Vec<Vec3>,
    pub(crate) sizes: Vec<f32>,
    pub(crate) visuals: VisualConfig,
    pub(crate) physics: Option<PhysicsConfig>,
    pub(crate) impulse: Option<ImpulseConfig>,
    pub(crate) twinkle: Option<TwinkleState>,
    pub(crate) rain: Option<RainState>,
    pub(crate) dirty: bool,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.rest_positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn rest_positions(&self) -> &[Vec3] {
        &self.rest_positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn visuals(&self) -> &VisualConfig {
        &self.visuals
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.visuals.blend_mode
    }

    pub fn opacity(&self) -> f32 {
        self.visuals.opacity
    }

    pub fn physics(&self) -> Option<&PhysicsConfig> {
        self.physics.as_ref()
    }

    pub fn impulse(&self) -> Option<&ImpulseConfig> {
        self.impulse.as_ref()
    }

    pub fn twinkle(&self) -> Option<&TwinkleConfig> {
        self.twinkle.as_ref().map(|t| &t.config)
    }

    /// Whether physics moves this layer's particles.
    pub fn is_animated(&self) -> bool {
        self.physics.is_some()
    }

    pub fn is_twinkling(&self) -> bool {
        self.twinkle.is_some()
    }

    pub fn rain(&self) -> Option<&RainConfig> {
        self.rain.as_ref().map(|r| &r.drops.config)
    }

    pub fn is_raining(&self) -> bool {
        self.rain.is_some()
    }

    /// Whether buffers changed since the backend last saw them.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Build a layer from a recipe, drawing every random value from `source`.
///
/// The same recipe and an identically seeded source always produce identical
/// buffers. Per particle, the layout draws come first, then palette pick,
/// brightness, size and, for twinkling layers, frequency and phase. Rain
/// layers then take two more draws to seed their falling stream.
pub fn generate(recipe: &LayerRecipe, source: &mut dyn RandomSource) -> Result<Layer, RecipeError> {
    recipe.validate()?;

    let count = recipe.count;
    let mut rest_positions = Vec::with_capacity(count);
    let mut tints = Vec::with_capacity(count);
    let mut sizes = Vec::with_capacity(count);
    let mut frequencies = Vec::new();
    let mut phases = Vec::new();

    for index in 0..count {
        let mut ctx = SpawnContext::new(index, count, &mut *source);

        rest_positions.push(recipe.layout.place(&mut ctx));

        let pick = ctx.random();
        let brightness = ctx.random();
        tints.push(recipe.palette.sample(pick, brightness));

        let size = ctx.random();
        sizes.push(recipe.visuals.sizes.sample(size));

        if let Some(twinkle) = &recipe.twinkle {
            frequencies.push(ctx.random_range(twinkle.min_frequency, twinkle.max_frequency));
            phases.push(ctx.azimuth());
        }
    }

    let rain = match (recipe.rain, &recipe.layout) {
        (Some(config), Layout::Rain(grid)) => Some(RainState::new(
            config,
            *grid,
            recipe.palette.clone(),
            &rest_positions,
            source,
        )),
        _ => None,
    };

    let twinkle = recipe.twinkle.map(|config| TwinkleState {
        config,
        frequencies,
        phases,
    });

    let mut layer = Layer {
        name: recipe.name.clone(),
        positions: rest_positions.clone(),
        velocities: vec![Vec3::ZERO; count],
        colors: tints.clone(),
        rest_positions,
        tints,
        sizes,
        visuals: recipe.visuals,
        physics: recipe.physics,
        impulse: recipe.impulse,
        twinkle,
        rain,
        dirty: true,
    };

    if layer.is_twinkling() {
        crate::twinkle::modulate(&mut layer, 0.0);
    }

    debug!(
        "Generated layer '{}': {} {} particles (animated: {}, twinkling: {}, raining: {})",
        layer.name,
        count,
        recipe.layout.kind(),
        layer.is_animated(),
        layer.is_twinkling(),
        layer.is_raining()
    );

    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::{ScriptedSource, SeededSource};
    use crate::visuals::PaletteEntry;

    fn galaxy() -> LayerRecipe {
        LayerRecipe::new(
            "galaxy",
            Layout::SpiralDisc {
                branches: 4,
                min_radius: 0.2,
                max_radius: 12.0,
                spin: 0.8,
                randomness: 0.35,
                power: 3.0,
                thickness: 0.4,
            },
            1000,
        )
        .with_palette(
            Palette::new(vec![
                PaletteEntry::from_hex(0xffc88a, 3.0),
                PaletteEntry::from_hex(0x8ab4ff, 1.0),
            ])
            .with_brightness(0.6, 1.0),
        )
        .with_sizes(SizeRange::new(0.5, 2.5))
        .with_physics(PhysicsConfig::default())
    }

    #[test]
    fn test_buffer_lengths_match_count() {
        let layer = generate(&galaxy(), &mut SeededSource::new(1)).unwrap();
        assert_eq!(layer.count(), 1000);
        assert_eq!(layer.positions().len(), 1000);
        assert_eq!(layer.rest_positions().len(), 1000);
        assert_eq!(layer.velocities().len(), 1000);
        assert_eq!(layer.colors().len(), 1000);
        assert_eq!(layer.sizes().len(), 1000);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate(&galaxy(), &mut SeededSource::new(42)).unwrap();
        let b = generate(&galaxy(), &mut SeededSource::new(42)).unwrap();
        assert_eq!(a.rest_positions(), b.rest_positions());
        assert_eq!(a.colors(), b.colors());
        assert_eq!(a.sizes(), b.sizes());

        let c = generate(&galaxy(), &mut SeededSource::new(43)).unwrap();
        assert_ne!(a.rest_positions(), c.rest_positions());
    }

    #[test]
    fn test_starts_at_rest() {
        let layer = generate(&galaxy(), &mut SeededSource::new(3)).unwrap();
        assert_eq!(layer.positions(), layer.rest_positions());
        assert!(layer.velocities().iter().all(|v| *v == Vec3::ZERO));
        assert!(layer.is_dirty());
    }

    #[test]
    fn test_colors_and_sizes_within_bounds() {
        let layer = generate(&galaxy(), &mut SeededSource::new(8)).unwrap();
        for c in layer.colors() {
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
        }
        for s in layer.sizes() {
            assert!((0.5..=2.5).contains(s));
        }
    }

    #[test]
    fn test_draw_order_per_particle() {
        let recipe = LayerRecipe::new(
            "cloud",
            Layout::Cloud {
                half_extents: Vec3::ONE,
            },
            2,
        )
        .with_twinkle(TwinkleConfig::default());
        let mut source = ScriptedSource::new(vec![0.5]);
        generate(&recipe, &mut source).unwrap();
        // 3 layout + pick + brightness + size + frequency + phase
        assert_eq!(source.drawn(), 16);
    }

    #[test]
    fn test_invalid_recipes_are_rejected() {
        let empty = LayerRecipe::new("empty", Layout::Points(vec![]), 0);
        assert_eq!(
            generate(&empty, &mut SeededSource::new(0)).unwrap_err(),
            RecipeError::EmptyLayer
        );

        let bad_palette = galaxy().with_palette(Palette::new(vec![]));
        assert_eq!(
            generate(&bad_palette, &mut SeededSource::new(0)).unwrap_err(),
            RecipeError::EmptyPalette
        );

        let bad_twinkle = galaxy().with_twinkle(TwinkleConfig::new(0.9, 0.2));
        assert!(matches!(
            generate(&bad_twinkle, &mut SeededSource::new(0)),
            Err(RecipeError::TwinkleOutOfRange { .. })
        ));
    }

    #[test]
    fn test_rain_needs_rain_layout() {
        let recipe = galaxy().with_rain(RainConfig::default());
        assert_eq!(
            generate(&recipe, &mut SeededSource::new(0)).unwrap_err(),
            RecipeError::RainWithoutGrid
        );
    }

    #[test]
    fn test_rain_layer_draws_seed_after_particles() {
        let recipe = LayerRecipe::new("rain", Layout::Rain(crate::rain::RainGrid::new(4, 8, 1.0)), 4)
            .with_rain(RainConfig::default());
        let mut source = ScriptedSource::new(vec![0.5]);
        let layer = generate(&recipe, &mut source).unwrap();
        // 1 layout + pick + brightness + size per particle, then 2 seed draws.
        assert_eq!(source.drawn(), 4 * 4 + 2);
        assert!(layer.is_raining());
        assert_eq!(layer.rain(), Some(&RainConfig::default()));
    }

    #[test]
    fn test_twinkle_layer_starts_modulated() {
        let recipe = LayerRecipe::new(
            "sky",
            Layout::SphereShell {
                min_radius: 1.0,
                max_radius: 2.0,
            },
            32,
        )
        .with_twinkle(TwinkleConfig::new(0.5, 0.2));
        let layer = generate(&recipe, &mut SeededSource::new(2)).unwrap();
        for c in layer.colors() {
            assert!(c.x <= 0.7 + 1e-5 && c.x >= 0.3 - 1e-5);
        }
    }
}
