//! Triangle geometry for chart primitives
//!
//! Everything is emitted as a triangle list in surface pixels.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

/// Segments used for plotted dots
pub const DOT_SEGMENTS: u32 = 12;

/// Filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Straight line of the given width as a quad
pub fn line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let a = from + perp;
    let b = from - perp;
    let c = to + perp;
    let d = to - perp;

    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}

/// Short stroke centered on `center`, oriented along `direction`.
/// Falls back to horizontal when there is no direction yet (first point).
pub fn dash(center: Vec2, direction: Vec2, length: f32, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = if direction.length_squared() > f32::EPSILON {
        direction.normalize()
    } else {
        Vec2::X
    };
    let half = dir * (length / 2.0);
    line(center - half, center + half, width, color)
}
