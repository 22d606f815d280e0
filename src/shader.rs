//! Point-sprite shader and the GPU-side data layouts it reads.
//!
//! Every layer is drawn as instanced quads: six vertices per particle, one
//! [`Instance`] per particle in a vertex buffer stepped per instance.

use bytemuck::{Pod, Zeroable};

use crate::layer::Layer;
use crate::scene::Scene;

/// WGSL source with `vs_main` and `fs_main`.
pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

/// Vertices per sprite quad.
pub const VERTICES_PER_SPRITE: u32 = 6;

/// Per-particle vertex data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Instance {
    pub position: [f32; 3],
    pub size: f32,
    /// Straight (non-premultiplied) color; alpha is the layer opacity.
    pub color: [f32; 4],
}

impl Instance {
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Physical surface size.
    pub viewport: [f32; 2],
    pub pixel_ratio: f32,
    /// Distance at which a sprite is drawn at its nominal size.
    pub attenuation: f32,
}

impl Uniforms {
    pub fn from_scene(scene: &Scene) -> Self {
        let camera = scene.camera();
        let viewport = scene.viewport();
        let (width, height) = viewport.physical_size();
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            viewport: [width as f32, height as f32],
            pixel_ratio: viewport.pixel_ratio(),
            attenuation: camera.position.distance(camera.target).max(1.0),
        }
    }
}

/// Flatten a layer into one [`Instance`] per particle.
pub fn pack_instances(layer: &Layer) -> Vec<Instance> {
    let opacity = layer.opacity();
    layer
        .positions()
        .iter()
        .zip(layer.sizes())
        .zip(layer.colors())
        .map(|((position, size), color)| Instance {
            position: position.to_array(),
            size: *size,
            color: [color.x, color.y, color.z, opacity],
        })
        .collect()
}
