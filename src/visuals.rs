//! Visual configuration for particle layers.
//!
//! Colors come from a small weighted [`Palette`]; brightness and size are
//! jittered per particle so no two stars of the same entry look identical.
//!
//! ```ignore
//! let palette = Palette::new(vec![
//!     PaletteEntry::from_hex(0x008f11, 90.0),
//!     PaletteEntry::from_hex(0x00ff41, 8.0),
//! ])
//! .with_flash(Vec3::ONE, 0.02);
//! ```

use glam::Vec3;

use crate::error::RecipeError;

/// How a layer's particles combine with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha blending (default).
    #[default]
    Alpha,

    /// Colors add up, so dense regions glow. The usual choice for stars.
    Additive,

    /// Colors multiply, darkening what is underneath. Useful for dust lanes.
    Multiply,
}

/// One weighted color of a palette.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: Vec3,
    pub weight: f32,
}

impl PaletteEntry {
    pub fn new(color: Vec3, weight: f32) -> Self {
        Self { color, weight }
    }

    /// Build an entry from a `0xRRGGBB` literal.
    pub fn from_hex(rgb: u32, weight: f32) -> Self {
        Self::new(hex_color(rgb), weight)
    }
}

/// Convert a `0xRRGGBB` literal to an RGB triple in `[0, 1]`.
pub fn hex_color(rgb: u32) -> Vec3 {
    let r = ((rgb >> 16) & 0xff) as f32 / 255.0;
    let g = ((rgb >> 8) & 0xff) as f32 / 255.0;
    let b = (rgb & 0xff) as f32 / 255.0;
    Vec3::new(r, g, b)
}

/// Rare override color picked before the weighted entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub color: Vec3,
    /// Chance in `[0, 1]` that a particle takes the flash color.
    pub probability: f32,
}

/// A discrete weighted palette with an optional flash color.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    flash: Option<Flash>,
    brightness: (f32, f32),
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self {
            entries,
            flash: None,
            brightness: (1.0, 1.0),
        }
    }

    /// A palette of one color.
    pub fn single(color: Vec3) -> Self {
        Self::new(vec![PaletteEntry::new(color, 1.0)])
    }

    /// Give each particle a `probability` chance of taking `color` instead.
    pub fn with_flash(mut self, color: Vec3, probability: f32) -> Self {
        self.flash = Some(Flash { color, probability });
        self
    }

    /// Multiply each picked color by a factor drawn from `[min, max]`.
    pub fn with_brightness(mut self, min: f32, max: f32) -> Self {
        self.brightness = (min, max);
        self
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash
    }

    pub fn brightness(&self) -> (f32, f32) {
        self.brightness
    }

    /// Reject palettes that cannot produce a color in `[0, 1]`.
    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.entries.is_empty() {
            return Err(RecipeError::EmptyPalette);
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(RecipeError::InvalidWeight {
                    index,
                    weight: entry.weight,
                });
            }
            if !color_in_range(entry.color) {
                return Err(RecipeError::ColorOutOfRange {
                    index,
                    color: entry.color,
                });
            }
        }
        if self.entries.iter().map(|e| e.weight).sum::<f32>() <= 0.0 {
            return Err(RecipeError::ZeroTotalWeight);
        }
        if let Some(flash) = self.flash {
            if !(0.0..=1.0).contains(&flash.probability) {
                return Err(RecipeError::InvalidFlashProbability(flash.probability));
            }
            if !color_in_range(flash.color) {
                return Err(RecipeError::ColorOutOfRange {
                    index: self.entries.len(),
                    color: flash.color,
                });
            }
        }
        let (min, max) = self.brightness;
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(RecipeError::InvalidBrightness { min, max });
        }
        Ok(())
    }

    /// Pick a base color from one uniform draw `pick`.
    ///
    /// Draws below the flash probability take the flash color; the rest are
    /// rescaled over the cumulative entry weights.
    pub fn pick(&self, pick: f32) -> Vec3 {
        let mut u = pick;
        if let Some(flash) = self.flash {
            if u < flash.probability {
                return flash.color;
            }
            let rest = 1.0 - flash.probability;
            u = if rest > 0.0 {
                (u - flash.probability) / rest
            } else {
                0.0
            };
        }

        let total: f32 = self.entries.iter().map(|e| e.weight).sum();
        let target = u * total;
        let mut cumulative = 0.0;
        let mut last = Vec3::ONE;
        for entry in self.entries.iter().filter(|e| e.weight > 0.0) {
            cumulative += entry.weight;
            last = entry.color;
            if target < cumulative {
                return entry.color;
            }
        }
        last
    }

    /// Pick a color and apply brightness jitter; two draws.
    pub fn sample(&self, pick: f32, brightness: f32) -> Vec3 {
        let (min, max) = self.brightness;
        let factor = min + (max - min) * brightness;
        (self.pick(pick) * factor).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::single(Vec3::ONE)
    }
}

fn color_in_range(color: Vec3) -> bool {
    color.is_finite() && color.min_element() >= 0.0 && color.max_element() <= 1.0
}

/// Bounded uniform range for per-particle sizes, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Every particle gets the same size.
    pub fn fixed(size: f32) -> Self {
        Self::new(size, size)
    }

    pub fn sample(&self, u: f32) -> f32 {
        self.min + (self.max - self.min) * u
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min > self.max
        {
            return Err(RecipeError::InvalidSizeRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        Self::new(1.0, 2.0)
    }
}

/// Rendering hints for a layer. Immutable once the layer exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualConfig {
    pub blend_mode: BlendMode,
    pub opacity: f32,
    pub sizes: SizeRange,
}

impl VisualConfig {
    pub fn validate(&self) -> Result<(), RecipeError> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(RecipeError::InvalidOpacity(self.opacity));
        }
        self.sizes.validate()
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Additive,
            opacity: 0.8,
            sizes: SizeRange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rain() -> Palette {
        Palette::new(vec![
            PaletteEntry::from_hex(0x008f11, 90.0),
            PaletteEntry::from_hex(0x00ff41, 8.0),
        ])
        .with_flash(Vec3::ONE, 0.02)
    }

    #[test]
    fn test_hex_color() {
        let c = hex_color(0xff8000);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_flash_wins_below_probability() {
        assert_eq!(rain().pick(0.01), Vec3::ONE);
    }

    #[test]
    fn test_weighted_pick_follows_cumulative_weights() {
        let palette = rain();
        // (0.5 - 0.02) / 0.98 of 98 total weight lands in the 90-weight entry.
        assert_eq!(palette.pick(0.5), hex_color(0x008f11));
        assert_eq!(palette.pick(0.99), hex_color(0x00ff41));
    }

    #[test]
    fn test_zero_weight_entries_never_picked() {
        let palette = Palette::new(vec![
            PaletteEntry::new(Vec3::X, 0.0),
            PaletteEntry::new(Vec3::Y, 1.0),
        ]);
        for i in 0..10 {
            assert_eq!(palette.pick(i as f32 / 10.0), Vec3::Y);
        }
    }

    #[test]
    fn test_sample_applies_brightness_and_clamps() {
        let palette = Palette::single(Vec3::new(0.5, 0.8, 1.0)).with_brightness(0.5, 1.5);
        let dim = palette.sample(0.0, 0.0);
        assert!((dim - Vec3::new(0.25, 0.4, 0.5)).length() < 1e-6);
        let bright = palette.sample(0.0, 0.999);
        assert!(bright.max_element() <= 1.0);
    }

    #[test]
    fn test_validate_rejects_bad_palettes() {
        assert_eq!(Palette::new(vec![]).validate(), Err(RecipeError::EmptyPalette));
        assert_eq!(
            Palette::new(vec![PaletteEntry::new(Vec3::ONE, 0.0)]).validate(),
            Err(RecipeError::ZeroTotalWeight)
        );
        assert!(matches!(
            Palette::new(vec![PaletteEntry::new(Vec3::ONE, -1.0)]).validate(),
            Err(RecipeError::InvalidWeight { index: 0, .. })
        ));
        assert!(matches!(
            Palette::single(Vec3::new(2.0, 0.0, 0.0)).validate(),
            Err(RecipeError::ColorOutOfRange { .. })
        ));
        assert_eq!(
            Palette::single(Vec3::ONE).with_flash(Vec3::ONE, 1.5).validate(),
            Err(RecipeError::InvalidFlashProbability(1.5))
        );
        assert!(rain().validate().is_ok());
    }

    #[test]
    fn test_size_range_validation() {
        assert!(SizeRange::new(2.0, 1.0).validate().is_err());
        assert!(SizeRange::fixed(1.5).validate().is_ok());
        assert_eq!(SizeRange::new(1.0, 3.0).sample(0.5), 2.0);
    }

    #[test]
    fn test_opacity_validation() {
        let visuals = VisualConfig {
            opacity: 1.2,
            ..Default::default()
        };
        assert_eq!(visuals.validate(), Err(RecipeError::InvalidOpacity(1.2)));
    }
}
