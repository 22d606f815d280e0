//! Render driver: the per-frame loop and its teardown handle.
//!
//! The driver never owns a real event loop. A host supplies a
//! [`FrameScheduler`] (a window's redraw request, a display link, or the
//! [`ManualScheduler`](crate::headless::ManualScheduler) in tests) and calls
//! [`FieldDriver::on_frame`] when the scheduled frame fires. Each frame
//! reschedules exactly one more until [`FieldDriver::teardown`].
//!
//! ```ignore
//! let mut driver = FieldDriver::mount(scene, Some(backend), scheduler);
//! // host loop
//! driver.on_frame(request, now);
//! // on unmount
//! driver.teardown();
//! ```

use std::time::Duration;

use log::{debug, info, warn};

use crate::layer::Layer;
use crate::scene::Scene;

/// Something that can draw a [`Scene`].
pub trait RenderBackend {
    /// Replace the buffers of layer `index` with its current state.
    fn upload(&mut self, index: usize, layer: &Layer);

    /// Resize the surface to physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw every layer, back to front.
    fn draw(&mut self, scene: &Scene);

    /// Free surface and buffers. Called once, on teardown.
    fn release(&mut self);
}

/// Handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Source of frame callbacks, one in flight at a time.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameRequest;
    fn cancel_frame(&mut self, request: FrameRequest);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No frame scheduled.
    Idle,
    /// Exactly one frame scheduled.
    Running { pending: FrameRequest },
}

/// Drives a [`Scene`] into a [`RenderBackend`] once per scheduled frame.
pub struct FieldDriver<B: RenderBackend, S: FrameScheduler> {
    scene: Scene,
    backend: Option<B>,
    scheduler: S,
    state: DriverState,
    frames: u64,
}

impl<B: RenderBackend, S: FrameScheduler> FieldDriver<B, S> {
    /// Hand the scene to the backend and schedule the first frame.
    ///
    /// Without a backend the field logs a warning and stays idle; the host
    /// keeps running, it just has no background.
    pub fn mount(mut scene: Scene, backend: Option<B>, mut scheduler: S) -> Self {
        let Some(mut backend) = backend else {
            warn!("No render backend available, particle field disabled");
            return Self {
                scene,
                backend: None,
                scheduler,
                state: DriverState::Idle,
                frames: 0,
            };
        };

        let (width, height) = scene.viewport().physical_size();
        backend.resize(width, height);
        upload_dirty(&mut backend, scene.layers_mut(), true);

        let pending = scheduler.request_frame();
        info!(
            "Mounted particle field: {} layers, {} particles, {}x{}",
            scene.layers().len(),
            scene.particle_count(),
            width,
            height
        );

        Self {
            scene,
            backend: Some(backend),
            scheduler,
            state: DriverState::Running { pending },
            frames: 0,
        }
    }

    /// Run one frame at host timestamp `now`.
    ///
    /// Returns `false` and does nothing when `request` is not the pending
    /// frame, including every call after teardown.
    pub fn on_frame(&mut self, request: FrameRequest, now: Duration) -> bool {
        match self.state {
            DriverState::Running { pending } if pending == request => {}
            _ => {
                debug!("Ignoring stale frame {:?}", request);
                return false;
            }
        }

        self.scene.tick(now);
        if let Some(backend) = self.backend.as_mut() {
            upload_dirty(backend, self.scene.layers_mut(), false);
            backend.draw(&self.scene);
        }
        self.frames += 1;

        let pending = self.scheduler.request_frame();
        self.state = DriverState::Running { pending };
        true
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.scene.pointer_moved(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.scene.pointer_left();
    }

    /// Scatter particles around logical pixel `(x, y)`. Returns the number pushed.
    pub fn trigger(&mut self, x: f32, y: f32) -> usize {
        self.scene.trigger(x, y)
    }

    /// New logical size. Particle buffers are left alone.
    pub fn resize(&mut self, width: f32, height: f32) {
        let (w, h) = self.scene.resize(width, height);
        self.resize_surface(w, h);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        let (w, h) = self.scene.set_device_pixel_ratio(ratio);
        self.resize_surface(w, h);
    }

    fn resize_surface(&mut self, width: u32, height: u32) {
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
            info!("Resized particle field surface to {}x{}", width, height);
        }
    }

    /// Stop the loop and release the backend. Safe to call more than once.
    pub fn teardown(&mut self) {
        if let DriverState::Running { pending } = self.state {
            self.scheduler.cancel_frame(pending);
        }
        self.state = DriverState::Idle;

        if let Some(mut backend) = self.backend.take() {
            backend.release();
            info!("Tore down particle field after {} frames", self.frames);
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running { .. })
    }

    /// The frame the driver is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        match self.state {
            DriverState::Running { pending } => Some(pending),
            DriverState::Idle => None,
        }
    }

    /// Frames rendered since mount.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<B: RenderBackend, S: FrameScheduler> Drop for FieldDriver<B, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn upload_dirty<B: RenderBackend>(backend: &mut B, layers: &mut [Layer], all: bool) {
    for (index, layer) in layers.iter_mut().enumerate() {
        if all || layer.is_dirty() {
            backend.upload(index, layer);
            layer.mark_clean();
        }
    }
}
