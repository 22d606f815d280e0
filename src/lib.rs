//! # Ambient Field
//!
//! Procedural particle backdrops: starfields, galaxy bands, dust shells and
//! twinkling sky domes that drift toward the pointer and scatter on click.
//!
//! A field is a [`Scene`] of independent particle [`Layer`]s. Each layer is
//! generated once from a [`LayerRecipe`], then animated every frame by a
//! small damped spring simulation and, optionally, per-particle twinkle.
//!
//! ## Quick Start
//!
//! ```ignore
//! use ambient_field::prelude::*;
//!
//! let mut field = FieldBuilder::new(1280.0, 720.0)
//!     .with_device_pixel_ratio(2.0)
//!     .with_layer(presets::dust_shell(1500))
//!     .with_layer(presets::milky_way(6000))
//!     .mount(Some(backend), scheduler);
//!
//! // from the host's event handlers
//! field.pointer_moved(640.0, 360.0);
//! field.trigger(640.0, 360.0);
//! field.resize(1920.0, 1080.0);
//!
//! // when the scheduled frame fires
//! field.on_frame(request, elapsed);
//!
//! // on unmount
//! field.teardown();
//! ```
//!
//! ## Core Concepts
//!
//! ### Layers
//!
//! A layer is a fixed-size arena: positions, rest positions, velocities,
//! colors and sizes all have exactly `count` entries for the layer's whole
//! life. Nothing outside the crate writes to them; the only mutations are
//! [`physics::step`], [`impulse::inject`], [`twinkle::modulate`] and
//! [`rain::advance`].
//!
//! ### Layouts
//!
//! | Layout | Shape |
//! |--------|-------|
//! | [`Layout::Band`] | Diagonal band with a bell-curve cross-section |
//! | [`Layout::SpiralDisc`] | Spiral arms that fray outward |
//! | [`Layout::SphereShell`] | Uniform shell between two radii |
//! | [`Layout::HemisphereField`] | Cap of a shell overhead |
//! | [`Layout::Cloud`] | Uniform box |
//! | [`Layout::Rain`] | Falling columns on a grid (with [`RainConfig`]) |
//! | [`Layout::Points`] | Explicit positions |
//!
//! ### Driving
//!
//! [`FieldDriver`] is Idle or Running with exactly one frame scheduled on a
//! host-supplied [`FrameScheduler`]. Rendering goes through the
//! [`RenderBackend`] trait: [`headless::HeadlessBackend`] for tests and
//! display-less hosts, and `gpu::WgpuBackend` behind the `gpu` feature.
//!
//! ### Determinism
//!
//! Generation draws every random value from a [`RandomSource`]. The same
//! field seed always builds the same field, and [`spawn::ScriptedSource`]
//! replays exact values in tests.

pub mod driver;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod headless;
pub mod impulse;
pub mod input;
pub mod layer;
pub mod layout;
pub mod physics;
pub mod presets;
pub mod rain;
pub mod scene;
pub mod shader;
pub mod spawn;
pub mod time;
pub mod twinkle;
pub mod viewport;
pub mod visuals;

pub use bytemuck;
pub use driver::{DriverState, FieldDriver, FrameRequest, FrameScheduler, RenderBackend};
pub use error::{FieldError, RecipeError};
#[cfg(feature = "gpu")]
pub use error::GpuError;
pub use glam::{Vec2, Vec3};
pub use impulse::ImpulseConfig;
pub use layer::{generate, Layer, LayerRecipe};
pub use layout::Layout;
pub use physics::{Attraction, Falloff, PhysicsConfig};
pub use rain::{RainConfig, RainGrid};
pub use scene::{FieldBuilder, FieldConfig, Scene};
pub use spawn::{RandomSource, SeededSource, SpawnContext};
pub use twinkle::TwinkleConfig;
pub use viewport::{Camera, Viewport};
pub use visuals::{BlendMode, Palette, PaletteEntry, SizeRange, VisualConfig};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use ambient_field::prelude::*;
/// ```
pub mod prelude {
    pub use crate::driver::{DriverState, FieldDriver, FrameRequest, FrameScheduler, RenderBackend};
    pub use crate::error::{FieldError, RecipeError};
    pub use crate::headless::{HeadlessBackend, ManualScheduler};
    pub use crate::impulse::ImpulseConfig;
    pub use crate::layer::{Layer, LayerRecipe};
    pub use crate::layout::Layout;
    pub use crate::physics::{Attraction, Falloff, PhysicsConfig};
    pub use crate::presets;
    pub use crate::rain::{RainConfig, RainGrid};
    pub use crate::scene::{FieldBuilder, FieldConfig, Scene};
    pub use crate::time::Time;
    pub use crate::twinkle::TwinkleConfig;
    pub use crate::viewport::{Camera, Viewport};
    pub use crate::visuals::{BlendMode, Palette, PaletteEntry, SizeRange, VisualConfig};
    pub use crate::{Vec2, Vec3};
}
