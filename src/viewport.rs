//! Viewport and camera.
//!
//! The viewport tracks the surface size in CSS-style logical pixels plus the
//! device pixel ratio. The backend surface is sized in physical pixels with
//! the ratio capped at [`MAX_PIXEL_RATIO`].

use glam::{Mat4, Vec2, Vec3};

/// Upper bound on the pixel ratio used for the backend surface.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Drawing surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        let mut viewport = Self {
            width: 1.0,
            height: 1.0,
            device_pixel_ratio: 1.0,
        };
        viewport.resize(width, height);
        viewport.set_device_pixel_ratio(device_pixel_ratio);
        viewport
    }

    /// Apply a new logical size. Returns the physical surface size.
    pub fn resize(&mut self, width: f32, height: f32) -> (u32, u32) {
        self.width = sanitize(width, 1.0);
        self.height = sanitize(height, 1.0);
        self.physical_size()
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = sanitize(ratio, 1.0);
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    /// Device pixel ratio capped at [`MAX_PIXEL_RATIO`].
    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Backend surface size in physical pixels, never zero.
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        let w = (self.width * ratio).round().max(1.0) as u32;
        let h = (self.height * ratio).round().max(1.0) as u32;
        (w, h)
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Map logical pixels (origin top-left, y down) to NDC (y up).
    pub fn to_ndc(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            pixel.x / self.width * 2.0 - 1.0,
            1.0 - pixel.y / self.height * 2.0,
        )
    }
}

fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Perspective camera looking at the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect_ratio, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Cast a ray through `ndc` and intersect it with the plane `z = plane_z`.
    ///
    /// Returns `None` when the ray is parallel to the plane or the plane is
    /// behind the camera.
    pub fn ndc_to_plane(&self, ndc: Vec2, plane_z: f32) -> Option<Vec3> {
        let forward = (self.target - self.position).try_normalize()?;
        let right = forward.cross(Vec3::Y).try_normalize()?;
        let up = right.cross(forward);
        let tan_half = (self.fov.to_radians() * 0.5).tan();

        let direction =
            forward + right * (ndc.x * tan_half * self.aspect_ratio) + up * (ndc.y * tan_half);
        if direction.z.abs() < 1e-6 {
            return None;
        }
        let t = (plane_z - self.position.z) / direction.z;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        Some(self.position + direction * t)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 30.0),
            target: Vec3::ZERO,
            fov: 75.0,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}
