//! Per-frame particle physics.
//!
//! Integration is frame-based: one [`step`] call is one animation tick and
//! every constant is expressed per tick. For each particle, in order:
//!
//! 1. Advect: `position += velocity` when any velocity component exceeds [`VELOCITY_EPSILON`].
//! 2. Damp: `velocity *= damping`.
//! 3. Relax: `position += (rest - position) * relax_rate`.
//! 4. Attract: when the pointer is within `radius` (measured in the XY plane)
//!    and farther than [`MIN_ATTRACTION_DISTANCE`],
//!    `velocity += delta * strength * falloff(distance)`.
//!
//! Attraction feeds velocity rather than nudging position, so it composes with
//! impulses and is damped the same way.

use glam::Vec3;

use crate::error::RecipeError;
use crate::layer::Layer;

/// Velocity components below this are treated as rest.
pub const VELOCITY_EPSILON: f32 = 0.001;

/// Pointer attraction is ignored closer than this, avoiding degenerate directions.
pub const MIN_ATTRACTION_DISTANCE: f32 = 0.1;

/// Distance falloff for pointer-driven forces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Falloff {
    /// `1 - distance / radius`: full strength at the center, zero at the edge.
    #[default]
    Linear,

    /// `1 - smoothstep(0, radius, distance)`: same endpoints, softer edge.
    Smooth,
}

impl Falloff {
    /// Strength factor in `[0, 1]`; zero at or beyond `radius`.
    pub fn factor(&self, distance: f32, radius: f32) -> f32 {
        if radius <= 0.0 || distance >= radius {
            return 0.0;
        }
        let x = (distance / radius).max(0.0);
        match self {
            Falloff::Linear => 1.0 - x,
            Falloff::Smooth => 1.0 - x * x * (3.0 - 2.0 * x),
        }
    }
}

/// Pull toward the smoothed pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attraction {
    pub radius: f32,
    pub strength: f32,
    pub falloff: Falloff,
}

impl Attraction {
    pub fn new(radius: f32, strength: f32) -> Self {
        Self {
            radius,
            strength,
            falloff: Falloff::Linear,
        }
    }

    pub fn with_falloff(mut self, falloff: Falloff) -> Self {
        self.falloff = falloff;
        self
    }
}

/// Physics constants for a position-animated layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Multiplicative velocity decay per tick, in `(0, 1)`.
    pub damping: f32,
    /// Fraction of the gap to the rest position closed per tick, in `(0, 1)`.
    pub relax_rate: f32,
    pub attraction: Option<Attraction>,
}

impl PhysicsConfig {
    pub fn new(damping: f32, relax_rate: f32) -> Self {
        Self {
            damping,
            relax_rate,
            attraction: None,
        }
    }

    pub fn with_attraction(mut self, attraction: Attraction) -> Self {
        self.attraction = Some(attraction);
        self
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(RecipeError::InvalidDamping(self.damping));
        }
        if !(self.relax_rate > 0.0 && self.relax_rate < 1.0) {
            return Err(RecipeError::InvalidRelaxRate(self.relax_rate));
        }
        if let Some(attraction) = self.attraction {
            if !(attraction.radius.is_finite() && attraction.radius > 0.0) {
                return Err(RecipeError::InvalidForceRadius(attraction.radius));
            }
            if !attraction.strength.is_finite() {
                return Err(RecipeError::NonFinite {
                    field: "attraction.strength",
                    value: attraction.strength,
                });
            }
        }
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new(0.96, 0.015)
    }
}

/// Advance a layer by one tick. `pointer` is the attraction target in scene space.
///
/// Static layers (no physics config) are left untouched.
pub fn step(layer: &mut Layer, pointer: Option<Vec3>) {
    let Some(config) = layer.physics else {
        return;
    };
    let attraction = config.attraction.zip(pointer);

    let positions = layer.positions.iter_mut();
    let velocities = layer.velocities.iter_mut();
    for ((position, velocity), rest) in positions.zip(velocities).zip(&layer.rest_positions) {
        if velocity.abs().max_element() > VELOCITY_EPSILON {
            *position += *velocity;
        }

        *velocity *= config.damping;

        *position += (*rest - *position) * config.relax_rate;

        if let Some((attraction, target)) = attraction {
            let delta = Vec3::new(target.x - position.x, target.y - position.y, 0.0);
            let distance = delta.length();
            if distance > MIN_ATTRACTION_DISTANCE && distance < attraction.radius {
                let falloff = attraction.falloff.factor(distance, attraction.radius);
                *velocity += delta * attraction.strength * falloff;
            }
        }
    }
    layer.dirty = true;
}
