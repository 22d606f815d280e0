//! Scene: the layers, camera, viewport, pointer and clock of one field.
//!
//! The scene is the only owner of its layers. Input handlers call
//! [`Scene::pointer_moved`], [`Scene::trigger`] and [`Scene::resize`]; the
//! driver calls [`Scene::tick`] once per frame.

use std::time::Duration;

use glam::{Vec2, Vec3};
use log::{debug, error, info};

use crate::driver::{FieldDriver, FrameScheduler, RenderBackend};
use crate::error::FieldError;
use crate::impulse;
use crate::input::{Pointer, CURSOR_SMOOTHING, PARALLAX_SMOOTHING};
use crate::layer::{generate, Layer, LayerRecipe};
use crate::physics;
use crate::rain;
use crate::spawn::SeededSource;
use crate::time::Time;
use crate::twinkle;
use crate::viewport::{Camera, Viewport};

/// Field-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Logical surface width in pixels.
    pub width: f32,
    /// Logical surface height in pixels.
    pub height: f32,
    pub device_pixel_ratio: f32,
    pub camera: Camera,
    pub cursor_smoothing: f32,
    pub parallax_smoothing: f32,
    /// Camera sway in scene units at the edge of the viewport.
    pub parallax_strength: f32,
    /// Depth of the plane the pointer is projected onto.
    pub pointer_plane: f32,
    pub background: Vec3,
    /// Field seed; each layer derives its own from this. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            device_pixel_ratio: 1.0,
            camera: Camera::default(),
            cursor_smoothing: CURSOR_SMOOTHING,
            parallax_smoothing: PARALLAX_SMOOTHING,
            parallax_strength: 2.0,
            pointer_plane: 0.0,
            background: Vec3::new(0.02, 0.02, 0.05),
            seed: None,
        }
    }
}

/// Builder for a [`Scene`].
///
/// ```ignore
/// let scene = FieldBuilder::new(1280.0, 720.0)
///     .with_device_pixel_ratio(2.0)
///     .with_seed(7)
///     .with_layers(presets::night_sky())
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldBuilder {
    config: FieldConfig,
    recipes: Vec<LayerRecipe>,
}

impl FieldBuilder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            config: FieldConfig {
                width,
                height,
                ..Default::default()
            },
            recipes: Vec::new(),
        }
    }

    pub fn from_config(config: FieldConfig) -> Self {
        Self {
            config,
            recipes: Vec::new(),
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.config.device_pixel_ratio = ratio;
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.config.camera = camera;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the cursor (attraction) and parallax smoothing rates.
    pub fn with_smoothing(mut self, cursor: f32, parallax: f32) -> Self {
        self.config.cursor_smoothing = cursor;
        self.config.parallax_smoothing = parallax;
        self
    }

    pub fn with_parallax(mut self, strength: f32) -> Self {
        self.config.parallax_strength = strength;
        self
    }

    pub fn with_background(mut self, color: Vec3) -> Self {
        self.config.background = color;
        self
    }

    /// Add a layer. Layers draw in insertion order, back to front.
    pub fn with_layer(mut self, recipe: LayerRecipe) -> Self {
        self.recipes.push(recipe);
        self
    }

    pub fn with_layers(mut self, recipes: impl IntoIterator<Item = LayerRecipe>) -> Self {
        self.recipes.extend(recipes);
        self
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Generate every layer, failing on the first invalid recipe.
    pub fn build(self) -> Result<Scene, FieldError> {
        let seed = self.field_seed();
        let mut scene = Scene::new(self.config);
        for (index, recipe) in self.recipes.iter().enumerate() {
            let mut source = SeededSource::new(layer_seed(seed, index, recipe));
            let layer = generate(recipe, &mut source).map_err(|source| {
                FieldError::InvalidRecipe {
                    layer: recipe.name.clone(),
                    source,
                }
            })?;
            scene.add_layer(layer);
        }
        Ok(scene)
    }

    /// Generate every valid layer, logging and skipping the rest.
    ///
    /// The field is decorative: a bad recipe must not take the host down.
    pub fn build_lenient(self) -> Scene {
        let seed = self.field_seed();
        let mut scene = Scene::new(self.config);
        for (index, recipe) in self.recipes.iter().enumerate() {
            let mut source = SeededSource::new(layer_seed(seed, index, recipe));
            match generate(recipe, &mut source) {
                Ok(layer) => {
                    scene.add_layer(layer);
                }
                Err(e) => error!("Skipping layer '{}': {}", recipe.name, e),
            }
        }
        scene
    }

    /// Build leniently and start driving the field.
    pub fn mount<B, S>(self, backend: Option<B>, scheduler: S) -> FieldDriver<B, S>
    where
        B: RenderBackend,
        S: FrameScheduler,
    {
        FieldDriver::mount(self.build_lenient(), backend, scheduler)
    }

    fn field_seed(&self) -> u64 {
        match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed = SeededSource::from_clock().seed();
                info!("Seeded field with {}", seed);
                seed
            }
        }
    }
}

fn layer_seed(field_seed: u64, index: usize, recipe: &LayerRecipe) -> u64 {
    recipe
        .seed
        .unwrap_or_else(|| field_seed ^ (index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Everything one field owns.
#[derive(Debug, Clone)]
pub struct Scene {
    layers: Vec<Layer>,
    camera: Camera,
    /// Camera position before parallax sway.
    camera_home: Vec3,
    viewport: Viewport,
    pointer: Pointer,
    time: Time,
    parallax_strength: f32,
    pointer_plane: f32,
    background: Vec3,
}

impl Scene {
    /// An empty scene.
    pub fn new(config: FieldConfig) -> Self {
        let viewport = Viewport::new(config.width, config.height, config.device_pixel_ratio);
        let camera = Camera {
            aspect_ratio: viewport.aspect_ratio(),
            ..config.camera
        };
        Self {
            layers: Vec::new(),
            camera_home: camera.position,
            camera,
            viewport,
            pointer: Pointer::new(config.cursor_smoothing, config.parallax_smoothing),
            time: Time::new(),
            parallax_strength: config.parallax_strength,
            pointer_plane: config.pointer_plane,
            background: config.background,
        }
    }

    /// Append a layer on top of the existing ones; returns its index.
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn particle_count(&self) -> usize {
        self.layers.iter().map(Layer::count).sum()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Clock controls: pause, resume and time scale.
    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    pub fn background(&self) -> Vec3 {
        self.background
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.moved(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.pointer.left();
    }

    /// Project logical pixels onto the pointer plane.
    pub fn screen_to_scene(&self, pixel: Vec2) -> Option<Vec3> {
        let ndc = self.viewport.to_ndc(pixel);
        self.camera.ndc_to_plane(ndc, self.pointer_plane)
    }

    /// Smoothed cursor in scene space, `None` while the pointer is away.
    pub fn pointer_target(&self) -> Option<Vec3> {
        self.pointer
            .cursor()
            .and_then(|cursor| self.screen_to_scene(cursor))
    }

    /// Scatter particles around a click at logical pixel `(x, y)`.
    ///
    /// Only layers with both physics and an impulse config react. Returns the
    /// number of particles pushed.
    pub fn trigger(&mut self, x: f32, y: f32) -> usize {
        let Some(point) = self.screen_to_scene(Vec2::new(x, y)) else {
            return 0;
        };
        let mut affected = 0;
        for layer in self.layers.iter_mut().filter(|l| l.is_animated()) {
            if let Some(config) = layer.impulse {
                affected += impulse::inject(layer, point, config.radius, config.force);
            }
        }
        debug!("Impulse at {:?} pushed {} particles", point, affected);
        affected
    }

    /// React to a new logical size. Returns the physical surface size.
    ///
    /// Only the viewport and camera change; particle buffers are untouched.
    pub fn resize(&mut self, width: f32, height: f32) -> (u32, u32) {
        let size = self.viewport.resize(width, height);
        self.camera.aspect_ratio = self.viewport.aspect_ratio();
        size
    }

    /// Returns the physical surface size under the new ratio.
    pub fn set_device_pixel_ratio(&mut self, ratio: f32) -> (u32, u32) {
        self.viewport.set_device_pixel_ratio(ratio);
        self.viewport.physical_size()
    }

    /// Advance one frame to the host timestamp `now`.
    ///
    /// Per layer: rain, then physics, then twinkle. A paused clock freezes
    /// every layer. Physics uses the cursor smoothed up to the previous frame;
    /// the pointer followers and camera sway are updated afterwards.
    pub fn tick(&mut self, now: Duration) {
        let (elapsed, _) = self.time.advance(now);
        let target = self.pointer_target();

        if !self.time.is_paused() {
            for layer in &mut self.layers {
                if layer.is_raining() {
                    rain::advance(layer);
                }
                if layer.is_animated() {
                    physics::step(layer, target);
                }
                if layer.is_twinkling() {
                    twinkle::modulate(layer, elapsed);
                }
            }
        }

        self.pointer.update();
        if let Some(parallax) = self.pointer.parallax() {
            let sway = self.viewport.to_ndc(parallax) * self.parallax_strength;
            self.camera.position = self.camera_home + Vec3::new(sway.x, sway.y, 0.0);
        }
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }
}
