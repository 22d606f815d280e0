//! Windowed demo: a night sky that follows the pointer and scatters on click.
//!
//! Run with `cargo run --features gpu`. Space pauses, `1`/`2`/`3` pick a scene
//! (`3` is the digital rain). The title bar shows the frame rate.
//! Set `RUST_LOG=info` for mount and resize logs.

use std::sync::Arc;
use std::time::Instant;

use ambient_field::gpu::WgpuBackend;
use ambient_field::prelude::*;
use log::error;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

/// Schedules frames through the window's redraw requests.
struct RedrawScheduler {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl RedrawScheduler {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    fn take(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest::new(self.next_id);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

type Driver = FieldDriver<WgpuBackend, RedrawScheduler>;

#[derive(Clone, Copy)]
enum Showcase {
    NightSky,
    Galaxy,
    Terminal,
}

impl Showcase {
    fn layers(self) -> Vec<LayerRecipe> {
        match self {
            Showcase::NightSky => presets::night_sky(),
            Showcase::Galaxy => vec![presets::dust_shell(1200), presets::spiral_galaxy(12000)],
            Showcase::Terminal => vec![presets::terminal_field(2400)],
        }
    }

    fn background(self) -> Vec3 {
        match self {
            Showcase::Terminal => Vec3::new(0.0, 0.02, 0.0),
            _ => Vec3::new(0.02, 0.02, 0.05),
        }
    }
}

struct App {
    window: Option<Arc<Window>>,
    field: Option<Driver>,
    started: Instant,
    cursor: Option<Vec2>,
}

impl App {
    fn new() -> Self {
        Self {
            window: None,
            field: None,
            started: Instant::now(),
            cursor: None,
        }
    }

    fn mount(&mut self, showcase: Showcase) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if let Some(mut old) = self.field.take() {
            old.teardown();
        }

        let scale = window.scale_factor() as f32;
        let size = window.inner_size();
        let logical = Vec2::new(size.width as f32, size.height as f32) / scale;

        let builder = FieldBuilder::new(logical.x, logical.y)
            .with_device_pixel_ratio(scale)
            .with_background(showcase.background())
            .with_layers(showcase.layers());

        let (width, height) = Viewport::new(logical.x, logical.y, scale).physical_size();
        let backend = match pollster::block_on(WgpuBackend::new(
            window.clone(),
            width,
            height,
            showcase.background(),
        )) {
            Ok(backend) => Some(backend),
            Err(e) => {
                error!("GPU backend unavailable: {}", e);
                None
            }
        };

        self.field = Some(builder.mount(backend, RedrawScheduler::new(window)));
    }

    fn to_logical(&self, x: f64, y: f64) -> Vec2 {
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        Vec2::new((x / scale) as f32, (y / scale) as f32)
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title("Ambient Field")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        match event_loop.create_window(window_attrs) {
            Ok(window) => {
                self.window = Some(Arc::new(window));
                self.mount(Showcase::NightSky);
            }
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(field) = &mut self.field {
                    field.teardown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let logical = self.to_logical(size.width as f64, size.height as f64);
                if let Some(field) = &mut self.field {
                    field.resize(logical.x, logical.y);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(field) = &mut self.field {
                    field.set_device_pixel_ratio(scale_factor as f32);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = self.to_logical(position.x, position.y);
                self.cursor = Some(logical);
                if let Some(field) = &mut self.field {
                    field.pointer_moved(logical.x, logical.y);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                if let Some(field) = &mut self.field {
                    field.pointer_left();
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                if let (Some(cursor), Some(field)) = (self.cursor, &mut self.field) {
                    field.trigger(cursor.x, cursor.y);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match logical_key.as_ref() {
                Key::Named(NamedKey::Space) => {
                    if let Some(field) = &mut self.field {
                        field.scene_mut().time_mut().toggle_pause();
                    }
                }
                Key::Character("1") => self.mount(Showcase::NightSky),
                Key::Character("2") => self.mount(Showcase::Galaxy),
                Key::Character("3") => self.mount(Showcase::Terminal),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                let now = self.started.elapsed();
                if let Some(field) = &mut self.field {
                    if let Some(request) = field.scheduler_mut().take() {
                        field.on_frame(request, now);
                    }
                    let time = field.scene().time();
                    if time.frame() % 30 == 0 && time.fps() > 0.0 {
                        if let Some(window) = &self.window {
                            window.set_title(&format!("Ambient Field ({:.0} fps)", time.fps()));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)
}
