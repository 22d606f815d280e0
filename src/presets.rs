//! Ready-made layer recipes.
//!
//! Each function returns recipes that can be passed straight to
//! [`FieldBuilder::with_layer`](crate::scene::FieldBuilder::with_layer) or
//! tweaked with the usual `with_*` methods first.

use std::f32::consts::FRAC_PI_3;

use glam::Vec3;

use crate::impulse::ImpulseConfig;
use crate::layer::LayerRecipe;
use crate::layout::Layout;
use crate::physics::{Attraction, PhysicsConfig};
use crate::rain::{RainConfig, RainGrid};
use crate::twinkle::TwinkleConfig;
use crate::visuals::{BlendMode, Palette, PaletteEntry, SizeRange};

/// 2% white flash, 8% bright green, 90% dark green.
pub fn digital_rain_palette() -> Palette {
    Palette::new(vec![
        PaletteEntry::from_hex(0x00ff41, 8.0),
        PaletteEntry::from_hex(0x008f11, 90.0),
    ])
    .with_flash(Vec3::ONE, 0.02)
}

/// Pale blue-white star colors with a warm minority.
pub fn star_palette() -> Palette {
    Palette::new(vec![
        PaletteEntry::from_hex(0xffffff, 5.0),
        PaletteEntry::from_hex(0xaaccff, 3.0),
        PaletteEntry::from_hex(0xffe4b5, 2.0),
    ])
    .with_brightness(0.5, 1.0)
}

/// Interactive physics shared by the pointer-reactive presets.
pub fn reactive_physics() -> PhysicsConfig {
    PhysicsConfig::new(0.96, 0.015).with_attraction(Attraction::new(10.0, 0.002))
}

/// A diagonal band of stars with a dense core, drifting toward the pointer.
pub fn milky_way(count: usize) -> LayerRecipe {
    LayerRecipe::new(
        "milky-way",
        Layout::Band {
            half_width: 60.0,
            vertical_scale: 12.0,
            band_width: 1.5,
            y_offset: 0.0,
            depth: 20.0,
            samples: 3,
        },
        count,
    )
    .with_palette(
        Palette::new(vec![
            PaletteEntry::from_hex(0xffffff, 6.0),
            PaletteEntry::from_hex(0xc8d8ff, 3.0),
            PaletteEntry::from_hex(0xffd9a0, 1.0),
        ])
        .with_brightness(0.4, 1.0),
    )
    .with_blend_mode(BlendMode::Additive)
    .with_opacity(0.8)
    .with_sizes(SizeRange::new(0.8, 2.0))
    .with_physics(reactive_physics())
    .with_impulse(ImpulseConfig::new(8.0, 0.5))
}

/// A four-armed spiral galaxy seen slightly from above.
pub fn spiral_galaxy(count: usize) -> LayerRecipe {
    LayerRecipe::new(
        "spiral-galaxy",
        Layout::SpiralDisc {
            branches: 4,
            min_radius: 0.5,
            max_radius: 18.0,
            spin: 0.35,
            randomness: 0.25,
            power: 3.0,
            thickness: 0.3,
        },
        count,
    )
    .with_palette(
        Palette::new(vec![
            PaletteEntry::from_hex(0xff6030, 2.0),
            PaletteEntry::from_hex(0xffb070, 3.0),
            PaletteEntry::from_hex(0x6a8cff, 5.0),
        ])
        .with_flash(Vec3::ONE, 0.2)
        .with_brightness(0.6, 1.0),
    )
    .with_blend_mode(BlendMode::Additive)
    .with_opacity(0.9)
    .with_sizes(SizeRange::new(1.0, 2.5))
    .with_physics(PhysicsConfig::new(0.95, 0.02).with_attraction(Attraction::new(8.0, 0.003)))
    .with_impulse(ImpulseConfig::new(10.0, 0.8))
}

/// A faint static shell of background dust.
pub fn dust_shell(count: usize) -> LayerRecipe {
    LayerRecipe::new(
        "dust-shell",
        Layout::SphereShell {
            min_radius: 60.0,
            max_radius: 120.0,
        },
        count,
    )
    .with_palette(Palette::single(Vec3::new(0.55, 0.5, 0.65)).with_brightness(0.3, 0.7))
    .with_blend_mode(BlendMode::Alpha)
    .with_opacity(0.35)
    .with_sizes(SizeRange::new(0.5, 1.2))
}

/// A dome of independently twinkling stars overhead.
pub fn twinkling_sky(count: usize) -> LayerRecipe {
    LayerRecipe::new(
        "twinkling-sky",
        Layout::HemisphereField {
            min_radius: 80.0,
            max_radius: 100.0,
            max_polar: FRAC_PI_3,
        },
        count,
    )
    .with_palette(star_palette())
    .with_blend_mode(BlendMode::Additive)
    .with_opacity(1.0)
    .with_sizes(SizeRange::new(1.0, 3.0))
    .with_twinkle(TwinkleConfig::new(0.6, 0.4).with_frequency(0.5, 2.0))
}

/// Grid matching the default camera's view of the origin plane.
pub fn terminal_grid() -> RainGrid {
    RainGrid::new(80, 48, 1.0)
}

/// Terminal-green digital rain: drops fall one row every 50 ms at 60 Hz,
/// flicker through the rain palette and scatter on click.
pub fn terminal_field(count: usize) -> LayerRecipe {
    LayerRecipe::new("terminal", Layout::Rain(terminal_grid()), count)
        .with_palette(digital_rain_palette())
        .with_blend_mode(BlendMode::Additive)
        .with_opacity(0.9)
        .with_sizes(SizeRange::new(1.5, 2.5))
        .with_physics(reactive_physics())
        .with_impulse(ImpulseConfig::new(8.0, 0.5))
        .with_rain(RainConfig::default())
}

/// The default night sky: dust, twinkling dome, then the band on top.
pub fn night_sky() -> Vec<LayerRecipe> {
    vec![dust_shell(1500), twinkling_sky(800), milky_way(6000)]
}
