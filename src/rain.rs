//! Digital rain: glyph drops falling down screen-aligned columns.
//!
//! [`Layout::Rain`](crate::layout::Layout::Rain) places drops on a
//! [`RainGrid`]; a [`RainConfig`] on the recipe makes them fall. Every
//! `ticks_per_row` ticks each drop, in particle order:
//!
//! 1. re-picks its glyph color from the layer palette (one draw),
//! 2. if it is already below the bottom row, returns to the top with
//!    probability `reset_chance` (one draw),
//! 3. moves down one row.
//!
//! Drops below the grid linger until their reset draw succeeds, so columns
//! drift out of step with each other. The move shifts both the rest position
//! and the live position, which keeps any scatter offset from an impulse.

use glam::Vec3;

use crate::error::RecipeError;
use crate::layer::Layer;
use crate::spawn::{RandomSource, SeededSource};
use crate::visuals::Palette;

/// Columns of square cells centered on the origin in the XY plane.
///
/// Row 0 is the top edge; row `rows` is the bottom edge and anything larger
/// lies below the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainGrid {
    pub columns: u32,
    pub rows: u32,
    /// Cell size in scene units.
    pub cell: f32,
}

impl RainGrid {
    pub fn new(columns: u32, rows: u32, cell: f32) -> Self {
        Self {
            columns,
            rows,
            cell,
        }
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.columns == 0 || self.rows == 0 || !(self.cell.is_finite() && self.cell > 0.0) {
            return Err(RecipeError::InvalidRainGrid {
                columns: self.columns,
                rows: self.rows,
                cell: self.cell,
            });
        }
        Ok(())
    }

    /// X of the center of `column`.
    #[inline]
    pub fn column_x(&self, column: u32) -> f32 {
        (column as f32 + 0.5 - self.columns as f32 * 0.5) * self.cell
    }

    #[inline]
    pub fn row_y(&self, row: u32) -> f32 {
        (self.rows as f32 * 0.5 - row as f32) * self.cell
    }

    /// Nearest row to height `y`, clamped at the top edge.
    #[inline]
    pub fn row_at(&self, y: f32) -> u32 {
        (self.rows as f32 * 0.5 - y / self.cell).round().max(0.0) as u32
    }
}

/// Falling motion for a rain layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainConfig {
    /// Ticks between row advances; 3 ticks at 60 Hz is one row every 50 ms.
    pub ticks_per_row: u32,
    /// Chance per advance that a drop below the grid returns to the top.
    pub reset_chance: f32,
}

impl RainConfig {
    pub fn new(ticks_per_row: u32, reset_chance: f32) -> Self {
        Self {
            ticks_per_row,
            reset_chance,
        }
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if self.ticks_per_row == 0 {
            return Err(RecipeError::ZeroRainInterval);
        }
        if !(0.0..=1.0).contains(&self.reset_chance) {
            return Err(RecipeError::InvalidResetChance(self.reset_chance));
        }
        Ok(())
    }
}

impl Default for RainConfig {
    fn default() -> Self {
        Self::new(3, 0.025)
    }
}

/// Per-drop rows plus the layer's own random stream.
#[derive(Debug, Clone)]
pub(crate) struct RainState {
    pub(crate) drops: Drops,
    source: SeededSource,
}

#[derive(Debug, Clone)]
pub(crate) struct Drops {
    pub(crate) config: RainConfig,
    grid: RainGrid,
    palette: Palette,
    rows: Vec<u32>,
    /// Ticks left until the next advance.
    countdown: u32,
}

impl RainState {
    /// Takes two draws from `source` to seed the falling stream.
    pub(crate) fn new(
        config: RainConfig,
        grid: RainGrid,
        palette: Palette,
        rest_positions: &[Vec3],
        source: &mut dyn RandomSource,
    ) -> Self {
        let seed = (0..2).fold(0u64, |seed, _| {
            (seed << 24) | (source.next_f32() * 16_777_216.0) as u64
        });
        Self {
            drops: Drops {
                config,
                grid,
                palette,
                rows: rest_positions.iter().map(|p| grid.row_at(p.y)).collect(),
                countdown: config.ticks_per_row,
            },
            source: SeededSource::new(seed),
        }
    }
}

impl Drops {
    fn fall(&mut self, layer: &mut Layer, source: &mut dyn RandomSource) -> usize {
        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return 0;
        }
        self.countdown = self.config.ticks_per_row;

        let mut resets = 0;
        for (i, row) in self.rows.iter_mut().enumerate() {
            let glyph = self.palette.pick(source.next_f32());

            let mut next = *row;
            if next > self.grid.rows && source.next_f32() < self.config.reset_chance {
                next = 0;
                resets += 1;
            }
            next = next.saturating_add(1);

            let shift = Vec3::new(0.0, self.grid.row_y(next) - self.grid.row_y(*row), 0.0);
            layer.rest_positions[i] += shift;
            layer.positions[i] += shift;
            layer.tints[i] = glyph;
            layer.colors[i] = glyph;
            *row = next;
        }
        layer.dirty = true;
        resets
    }
}

/// Advance a rain layer by one tick using its own seeded stream.
///
/// Returns how many drops went back to the top. Layers without falling
/// motion are left untouched.
pub fn advance(layer: &mut Layer) -> usize {
    let Some(mut rain) = layer.rain.take() else {
        return 0;
    };
    let resets = rain.drops.fall(layer, &mut rain.source);
    layer.rain = Some(rain);
    resets
}

/// Like [`advance`], but draws from `source` instead of the layer's stream.
pub fn advance_with(layer: &mut Layer, source: &mut dyn RandomSource) -> usize {
    let Some(mut rain) = layer.rain.take() else {
        return 0;
    };
    let resets = rain.drops.fall(layer, source);
    layer.rain = Some(rain);
    resets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{generate, LayerRecipe};
    use crate::layout::Layout;
    use crate::physics::PhysicsConfig;
    use crate::presets::digital_rain_palette;
    use crate::spawn::ScriptedSource;

    const DARK: Vec3 = Vec3::new(0.0, 143.0 / 255.0, 17.0 / 255.0);

    fn rain_layer(grid: RainGrid, count: usize, config: RainConfig) -> Layer {
        let recipe = LayerRecipe::new("rain", Layout::Rain(grid), count)
            .with_palette(digital_rain_palette())
            .with_rain(config);
        generate(&recipe, &mut ScriptedSource::new(vec![0.0])).unwrap()
    }

    #[test]
    fn test_grid_geometry() {
        let grid = RainGrid::new(4, 10, 2.0);
        assert_eq!(grid.column_x(0), -3.0);
        assert_eq!(grid.column_x(3), 3.0);
        assert_eq!(grid.row_y(0), 10.0);
        assert_eq!(grid.row_y(10), -10.0);
        for row in 0..14 {
            assert_eq!(grid.row_at(grid.row_y(row)), row);
        }
    }

    #[test]
    fn test_drops_move_down_one_row_per_advance() {
        let grid = RainGrid::new(2, 10, 1.0);
        let mut layer = rain_layer(grid, 2, RainConfig::new(1, 0.025));
        // Scripted zeros start every drop on row 1.
        assert!(layer.rest_positions().iter().all(|p| p.y == grid.row_y(1)));

        let mut source = ScriptedSource::new(vec![0.5]);
        for tick in 2..=5 {
            assert_eq!(advance_with(&mut layer, &mut source), 0);
            for p in layer.rest_positions() {
                assert_eq!(p.y, grid.row_y(tick));
            }
        }
        assert_eq!(layer.positions(), layer.rest_positions());
        assert!(layer.is_dirty());
    }

    #[test]
    fn test_ticks_per_row_spaces_advances() {
        let grid = RainGrid::new(1, 10, 1.0);
        let mut layer = rain_layer(grid, 1, RainConfig::new(3, 0.025));
        let mut source = ScriptedSource::new(vec![0.5]);
        let start = layer.rest_positions()[0].y;

        advance_with(&mut layer, &mut source);
        advance_with(&mut layer, &mut source);
        assert_eq!(layer.rest_positions()[0].y, start);
        advance_with(&mut layer, &mut source);
        assert_eq!(layer.rest_positions()[0].y, start - 1.0);
        assert_eq!(source.drawn(), 1);
    }

    #[test]
    fn test_drop_lingers_below_grid_until_reset_draw() {
        let grid = RainGrid::new(1, 3, 1.0);
        let mut layer = rain_layer(grid, 1, RainConfig::new(1, 0.025));
        let mut calm = ScriptedSource::new(vec![0.5]);

        // Rows 1 -> 4 without any reset draw while inside the grid.
        for _ in 0..3 {
            assert_eq!(advance_with(&mut layer, &mut calm), 0);
        }
        assert_eq!(calm.drawn(), 3);
        assert_eq!(layer.rest_positions()[0].y, grid.row_y(4));

        // Below the bottom: a failed reset draw keeps it falling.
        assert_eq!(advance_with(&mut layer, &mut calm), 0);
        assert_eq!(calm.drawn(), 5);
        assert_eq!(layer.rest_positions()[0].y, grid.row_y(5));

        // A draw under the reset chance sends it back to row 1.
        let mut lucky = ScriptedSource::new(vec![0.5, 0.01]);
        assert_eq!(advance_with(&mut layer, &mut lucky), 1);
        assert_eq!(layer.rest_positions()[0].y, grid.row_y(1));
    }

    #[test]
    fn test_reset_keeps_scatter_offset() {
        let grid = RainGrid::new(1, 1, 1.0);
        let recipe = LayerRecipe::new("rain", Layout::Rain(grid), 1)
            .with_physics(PhysicsConfig::default())
            .with_rain(RainConfig::new(1, 1.0));
        let mut layer = generate(&recipe, &mut ScriptedSource::new(vec![0.0])).unwrap();
        layer.positions[0].x += 0.5;

        let mut source = ScriptedSource::new(vec![0.0]);
        advance_with(&mut layer, &mut source);
        assert_eq!(advance_with(&mut layer, &mut source), 1);
        let offset = layer.positions()[0] - layer.rest_positions()[0];
        assert_eq!(offset, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_glyph_colors_repicked_each_advance() {
        let grid = RainGrid::new(3, 10, 1.0);
        let mut layer = rain_layer(grid, 3, RainConfig::new(1, 0.025));
        // White flash at generation from the scripted zero.
        assert!(layer.colors().iter().all(|c| *c == Vec3::ONE));

        advance_with(&mut layer, &mut ScriptedSource::new(vec![0.5]));
        assert!(layer.colors().iter().all(|c| *c == DARK));
    }

    #[test]
    fn test_every_column_eventually_restarts() {
        let grid = RainGrid::new(8, 6, 1.0);
        let recipe = LayerRecipe::new("rain", Layout::Rain(grid), 8)
            .with_palette(digital_rain_palette())
            .with_rain(RainConfig::new(1, 0.025))
            .with_seed(3);
        let mut layer = generate(&recipe, &mut SeededSource::new(3)).unwrap();

        let mut resets = 0;
        for _ in 0..2000 {
            resets += advance(&mut layer);
        }
        assert!(resets >= 8);
        for p in layer.rest_positions() {
            assert!(p.y < grid.row_y(0));
        }
    }

    #[test]
    fn test_same_seed_falls_identically() {
        let recipe = LayerRecipe::new("rain", Layout::Rain(RainGrid::new(16, 12, 1.0)), 64)
            .with_palette(digital_rain_palette())
            .with_rain(RainConfig::new(1, 0.1));
        let mut a = generate(&recipe, &mut SeededSource::new(9)).unwrap();
        let mut b = generate(&recipe, &mut SeededSource::new(9)).unwrap();
        for _ in 0..200 {
            assert_eq!(advance(&mut a), advance(&mut b));
        }
        assert_eq!(a.rest_positions(), b.rest_positions());
        assert_eq!(a.colors(), b.colors());
    }

    #[test]
    fn test_validate() {
        assert!(RainGrid::new(0, 10, 1.0).validate().is_err());
        assert!(RainGrid::new(4, 0, 1.0).validate().is_err());
        assert!(RainGrid::new(4, 10, f32::NAN).validate().is_err());
        assert_eq!(
            RainConfig::new(0, 0.5).validate(),
            Err(RecipeError::ZeroRainInterval)
        );
        assert_eq!(
            RainConfig::new(1, 1.5).validate(),
            Err(RecipeError::InvalidResetChance(1.5))
        );
        assert!(RainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_layers_without_rain_are_untouched() {
        let recipe = LayerRecipe::new("still", Layout::Points(vec![Vec3::ONE]), 1);
        let mut layer = generate(&recipe, &mut ScriptedSource::new(vec![0.0])).unwrap();
        assert_eq!(advance(&mut layer), 0);
        assert_eq!(layer.rest_positions()[0], Vec3::ONE);
    }
}
