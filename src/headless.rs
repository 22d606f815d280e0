//! Display-less backend and scheduler.
//!
//! [`HeadlessBackend`] packs instances exactly like the GPU backend but keeps
//! them in memory and counts what the driver asked of it. [`ManualScheduler`]
//! hands out frames only when the caller pumps them, so tests and benches run
//! the loop deterministically.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::driver::{FieldDriver, FrameRequest, FrameScheduler, RenderBackend};
use crate::layer::Layer;
use crate::scene::Scene;
use crate::shader::{pack_instances, Instance, Uniforms};

/// What a [`HeadlessBackend`] has been asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessStats {
    pub uploads: usize,
    pub draws: usize,
    /// Every surface size, in order.
    pub resizes: Vec<(u32, u32)>,
    pub releases: usize,
    pub released: bool,
    /// Instances submitted by the most recent draw.
    pub last_draw_instances: usize,
}

/// Shared view of a backend's stats that outlives the backend.
#[derive(Debug, Clone, Default)]
pub struct StatsHandle(Rc<RefCell<HeadlessStats>>);

impl StatsHandle {
    pub fn snapshot(&self) -> HeadlessStats {
        self.0.borrow().clone()
    }
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    stats: StatsHandle,
    buffers: Vec<Vec<Instance>>,
    uniforms: Option<Uniforms>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> StatsHandle {
        self.stats.clone()
    }

    pub fn stats(&self) -> HeadlessStats {
        self.stats.snapshot()
    }

    /// Last uploaded instances of layer `index`.
    pub fn instances(&self, index: usize) -> Option<&[Instance]> {
        self.buffers.get(index).map(Vec::as_slice)
    }

    /// Uniforms written by the most recent draw.
    pub fn uniforms(&self) -> Option<&Uniforms> {
        self.uniforms.as_ref()
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload(&mut self, index: usize, layer: &Layer) {
        if self.buffers.len() <= index {
            self.buffers.resize_with(index + 1, Vec::new);
        }
        self.buffers[index] = pack_instances(layer);
        self.stats.0.borrow_mut().uploads += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.stats.0.borrow_mut().resizes.push((width, height));
    }

    fn draw(&mut self, scene: &Scene) {
        self.uniforms = Some(Uniforms::from_scene(scene));
        let mut stats = self.stats.0.borrow_mut();
        stats.draws += 1;
        stats.last_draw_instances = self.buffers.iter().map(Vec::len).sum();
    }

    fn release(&mut self) {
        self.buffers.clear();
        self.uniforms = None;
        let mut stats = self.stats.0.borrow_mut();
        stats.releases += 1;
        stats.released = true;
    }
}

/// Scheduler whose frames fire only when pumped.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
    now: Duration,
    interval: Duration,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    /// 60 Hz virtual clock starting at zero.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_micros(16_667))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            next_id: 0,
            pending: None,
            requested: 0,
            cancelled: 0,
            now: Duration::ZERO,
            interval,
        }
    }

    /// Take the scheduled frame and the virtual timestamp it fires at.
    pub fn take_due(&mut self) -> Option<(FrameRequest, Duration)> {
        let request = self.pending.take()?;
        let now = self.now;
        self.now += self.interval;
        Some((request, now))
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest::new(self.next_id);
        self.pending = Some(request);
        self.requested += 1;
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

impl<B: RenderBackend> FieldDriver<B, ManualScheduler> {
    /// Pump up to `frames` scheduled frames. Returns how many ran.
    pub fn run_frames(&mut self, frames: usize) -> usize {
        let mut ran = 0;
        for _ in 0..frames {
            let Some((request, now)) = self.scheduler_mut().take_due() else {
                break;
            };
            if self.on_frame(request, now) {
                ran += 1;
            }
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerRecipe;
    use crate::layout::Layout;
    use crate::scene::FieldBuilder;
    use glam::Vec3;

    #[test]
    fn test_scheduler_keeps_one_pending_frame() {
        let mut scheduler = ManualScheduler::new();
        assert_eq!(scheduler.take_due(), None);
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        assert_ne!(first, second);
        assert_eq!(scheduler.pending(), Some(second));

        scheduler.cancel_frame(first);
        assert_eq!(scheduler.cancelled(), 0);
        scheduler.cancel_frame(second);
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn test_virtual_clock_advances_per_frame() {
        let mut scheduler = ManualScheduler::with_interval(Duration::from_millis(10));
        scheduler.request_frame();
        assert_eq!(scheduler.take_due().unwrap().1, Duration::ZERO);
        scheduler.request_frame();
        assert_eq!(scheduler.take_due().unwrap().1, Duration::from_millis(10));
    }

    #[test]
    fn test_run_frames_draws_every_layer() {
        let recipe = LayerRecipe::new(
            "dust",
            Layout::Cloud {
                half_extents: Vec3::splat(4.0),
            },
            25,
        );
        let mut driver = FieldBuilder::new(320.0, 240.0)
            .with_seed(5)
            .with_layer(recipe.clone())
            .with_layer(recipe)
            .mount(Some(HeadlessBackend::new()), ManualScheduler::new());

        assert_eq!(driver.run_frames(10), 10);
        let backend = driver.backend().unwrap();
        assert_eq!(backend.stats().draws, 10);
        assert_eq!(backend.stats().last_draw_instances, 50);
        assert_eq!(backend.instances(1).map(<[Instance]>::len), Some(25));
        assert!(backend.uniforms().is_some());
    }

    #[test]
    fn test_release_clears_buffers() {
        let mut backend = HeadlessBackend::new();
        backend.buffers.push(Vec::new());
        backend.release();
        assert!(backend.instances(0).is_none());
        assert!(backend.stats().released);
    }
}
