//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in surface pixels with color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for chart elements
pub mod colors {
    pub const GRID: [f32; 4] = [0.83, 0.83, 0.83, 1.0];
    pub const AXES: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const LIVE_POINT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const LOADED_POINT: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    /// Light canvas, dark axes
    pub const BACKGROUND: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
