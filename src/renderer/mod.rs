//! Chart rendering
//!
//! `mapper` builds the chart as triangles plus text labels in surface pixels;
//! `pipeline` draws those triangles with WebGPU.

pub mod mapper;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use mapper::{CoordinateMapper, Frame, Label, LineStyle, PlottedPoint, PointKind};
pub use pipeline::RenderState;
pub use vertex::Vertex;
