//! Radial velocity impulses from discrete input events.

use glam::Vec3;

use crate::error::RecipeError;
use crate::layer::Layer;
use crate::physics::Falloff;

/// Impulses are ignored for particles closer than this to the event point.
pub const MIN_IMPULSE_DISTANCE: f32 = 1e-4;

/// How strongly a layer scatters when the field is clicked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseConfig {
    pub radius: f32,
    pub force: f32,
}

impl ImpulseConfig {
    pub fn new(radius: f32, force: f32) -> Self {
        Self { radius, force }
    }

    pub fn validate(&self) -> Result<(), RecipeError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(RecipeError::InvalidForceRadius(self.radius));
        }
        if !self.force.is_finite() {
            return Err(RecipeError::NonFinite {
                field: "impulse.force",
                value: self.force,
            });
        }
        Ok(())
    }
}

impl Default for ImpulseConfig {
    fn default() -> Self {
        Self::new(8.0, 0.5)
    }
}

/// Push every particle within `radius` of `point` away from it.
///
/// Distance is measured in the XY plane. The added velocity has magnitude
/// `force * (1 - distance / radius)`. Impulses accumulate; damping in
/// [`step`](crate::physics::step) bounds them over time.
///
/// Returns how many particles were affected; a non-positive or non-finite
/// `radius` affects none.
pub fn inject(layer: &mut Layer, point: Vec3, radius: f32, force: f32) -> usize {
    if !(radius.is_finite() && radius > 0.0) {
        return 0;
    }
    let mut affected = 0;
    for (position, velocity) in layer.positions.iter().zip(layer.velocities.iter_mut()) {
        let away = Vec3::new(position.x - point.x, position.y - point.y, 0.0);
        let distance = away.length();
        if distance < MIN_IMPULSE_DISTANCE || distance >= radius {
            continue;
        }
        let strength = force * Falloff::Linear.factor(distance, radius);
        *velocity += away / distance * strength;
        affected += 1;
    }
    if affected > 0 {
        layer.dirty = true;
    }
    affected
}
