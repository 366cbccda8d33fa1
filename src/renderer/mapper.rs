//! Simulation space to surface space mapping
//!
//! The mapper owns the chart: scaling bounds, decoration (grid, axes, labels),
//! and every plotted point. It produces a [`Frame`] of triangles and text
//! labels that the GPU pipeline (and the host, for text) presents.
//!
//! Surface coordinates are pixels with the origin at the top-left corner and y
//! growing downward; simulation y grows upward, so the y axis is inverted.

use glam::{DVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::round_hundredths;
use crate::sim::TrajectoryPoint;

const GRID_LINE_WIDTH: f32 = 1.0;
const AXIS_LINE_WIDTH: f32 = 2.0;
const STROKE_WIDTH: f32 = 2.0;
const DASH_LENGTH: f32 = 8.0;

/// How plotted points are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LineStyle {
    #[default]
    Dots,
    Dashes,
    Solid,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStyle::Dots => "Dots",
            LineStyle::Dashes => "Dashes",
            LineStyle::Solid => "Solid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dots" | "dot" => Some(LineStyle::Dots),
            "dashes" | "dash" => Some(LineStyle::Dashes),
            "solid" | "line" => Some(LineStyle::Solid),
            _ => None,
        }
    }

    /// Next style in the toggle cycle
    pub fn next(&self) -> Self {
        match self {
            LineStyle::Dots => LineStyle::Dashes,
            LineStyle::Dashes => LineStyle::Solid,
            LineStyle::Solid => LineStyle::Dots,
        }
    }
}

/// Where a plotted point came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// Produced by the running simulation
    Live,
    /// Replayed from a saved graph
    Loaded,
}

impl PointKind {
    fn color(&self) -> [f32; 4] {
        match self {
            PointKind::Live => colors::LIVE_POINT,
            PointKind::Loaded => colors::LOADED_POINT,
        }
    }

    fn index(&self) -> usize {
        match self {
            PointKind::Live => 0,
            PointKind::Loaded => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlottedPoint {
    pub point: TrajectoryPoint,
    pub kind: PointKind,
}

/// Axis tick label, positioned in surface pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub pos: Vec2,
}

/// Everything needed to present the chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
}

impl Frame {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.labels.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.labels.is_empty()
    }
}

/// Chart state and renderer
#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    width: f64,
    height: f64,
    max_x: f64,
    max_y: f64,
    x_scale: f64,
    y_scale: f64,
    show_grid: bool,
    show_axes: bool,
    show_tooltips: bool,
    line_style: LineStyle,
    points: Vec<PlottedPoint>,
    /// Last drawn screen position per point kind, for dashes and solid lines
    stroke_heads: [Option<Vec2>; 2],
    frame: Frame,
}

impl CoordinateMapper {
    pub fn new(width: u32, height: u32) -> Self {
        let mut mapper = Self {
            width: width as f64,
            height: height as f64,
            max_x: DEFAULT_VIEWPORT,
            max_y: DEFAULT_VIEWPORT,
            x_scale: 1.0,
            y_scale: 1.0,
            show_grid: true,
            show_axes: true,
            show_tooltips: true,
            line_style: LineStyle::default(),
            points: Vec::new(),
            stroke_heads: [None; 2],
            frame: Frame::default(),
        };
        mapper.rescale();
        mapper.redraw();
        mapper
    }

    /// Apply visual preferences in one go (single redraw)
    pub fn set_visuals(&mut self, grid: bool, axes: bool, tooltips: bool, style: LineStyle) {
        self.show_grid = grid;
        self.show_axes = axes;
        self.show_tooltips = tooltips;
        self.line_style = style;
        self.redraw();
    }

    /// Grow bounds to fit a trajectory of the given extent, with headroom.
    /// Bounds never shrink until [`Self::reset_bounds`].
    pub fn set_bounds(&mut self, range_x: f64, range_y: f64) {
        self.ensure_bounds(range_x * BOUNDS_HEADROOM, range_y * BOUNDS_HEADROOM);
    }

    /// Grow bounds to at least the given extent, without headroom
    pub fn ensure_bounds(&mut self, max_x: f64, max_y: f64) {
        if max_x.is_finite() {
            self.max_x = self.max_x.max(max_x);
        }
        if max_y.is_finite() {
            self.max_y = self.max_y.max(max_y);
        }
        self.rescale();
        self.redraw();
    }

    pub fn reset_bounds(&mut self) {
        self.max_x = DEFAULT_VIEWPORT;
        self.max_y = DEFAULT_VIEWPORT;
        self.rescale();
        self.redraw();
    }

    fn rescale(&mut self) {
        self.x_scale = self.width / self.max_x;
        self.y_scale = self.height / self.max_y;
    }

    /// Current (max_x, max_y) in meters
    pub fn bounds(&self) -> DVec2 {
        DVec2::new(self.max_x, self.max_y)
    }

    /// Pixels per meter on each axis
    pub fn scale(&self) -> DVec2 {
        DVec2::new(self.x_scale, self.y_scale)
    }

    pub fn surface_size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    /// Map a simulation point to surface pixels (no bounds check)
    pub fn transform(&self, point: &TrajectoryPoint) -> DVec2 {
        DVec2::new(
            round_hundredths(point.x * self.x_scale),
            round_hundredths(self.height - point.y * self.y_scale),
        )
    }

    /// Map a point that lies inside the current bounds; `None` otherwise
    pub fn project(&self, point: &TrajectoryPoint) -> Option<DVec2> {
        let in_bounds = point.x.is_finite()
            && point.y.is_finite()
            && (0.0..=self.max_x).contains(&point.x)
            && (0.0..=self.max_y).contains(&point.y);
        in_bounds.then(|| self.transform(point))
    }

    /// Grid lines at `width / GRID_DIVISIONS` spacing
    pub fn draw_grid(&mut self) {
        let (w, h) = (self.width as f32, self.height as f32);
        let divisions = GRID_DIVISIONS as f32;
        for i in 0..=GRID_DIVISIONS {
            let x = i as f32 * w / divisions;
            let y = i as f32 * h / divisions;
            self.frame.vertices.extend(shapes::line(
                Vec2::new(x, 0.0),
                Vec2::new(x, h),
                GRID_LINE_WIDTH,
                colors::GRID,
            ));
            self.frame.vertices.extend(shapes::line(
                Vec2::new(0.0, y),
                Vec2::new(w, y),
                GRID_LINE_WIDTH,
                colors::GRID,
            ));
        }
    }

    /// X axis along the bottom edge, Y axis along the left edge
    pub fn draw_axes(&mut self) {
        let (w, h) = (self.width as f32, self.height as f32);
        self.frame.vertices.extend(shapes::line(
            Vec2::new(0.0, h),
            Vec2::new(w, h),
            AXIS_LINE_WIDTH,
            colors::AXES,
        ));
        self.frame.vertices.extend(shapes::line(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, h),
            AXIS_LINE_WIDTH,
            colors::AXES,
        ));
    }

    /// Tick values along both axes, `GRID_DIVISIONS + 1` per axis
    pub fn draw_axis_labels(&mut self) {
        let divisions = GRID_DIVISIONS as f64;
        let x_step = self.max_x / divisions;
        let y_step = self.max_y / divisions;
        let x_spacing = self.width / divisions;
        let y_spacing = self.height / divisions;

        for i in 0..=GRID_DIVISIONS {
            let i = i as f64;
            self.frame.labels.push(Label {
                text: format!("{:.1}", i * x_step),
                pos: Vec2::new((i * x_spacing) as f32, (self.height - 5.0) as f32),
            });
            self.frame.labels.push(Label {
                text: format!("{:.1}", i * y_step),
                pos: Vec2::new(5.0, (self.height - i * y_spacing) as f32),
            });
        }
    }

    /// Record and draw a simulation point
    pub fn plot(&mut self, point: TrajectoryPoint) {
        self.plot_kind(point, PointKind::Live);
    }

    /// Record and draw a point replayed from a saved graph
    pub fn plot_loaded(&mut self, point: TrajectoryPoint) {
        self.plot_kind(point, PointKind::Loaded);
    }

    fn plot_kind(&mut self, point: TrajectoryPoint, kind: PointKind) {
        let plotted = PlottedPoint { point, kind };
        self.points.push(plotted);
        self.draw_point(&plotted);
    }

    fn draw_point(&mut self, plotted: &PlottedPoint) {
        let Some(screen) = self.project(&plotted.point) else {
            log::debug!(
                "Skipping out-of-bounds point ({:.2}, {:.2})",
                plotted.point.x,
                plotted.point.y
            );
            return;
        };
        let screen = screen.as_vec2();
        let color = plotted.kind.color();
        let head = &mut self.stroke_heads[plotted.kind.index()];
        let previous = head.replace(screen);

        let vertices = match (self.line_style, previous) {
            (LineStyle::Dots, _) => shapes::circle(screen, POINT_RADIUS, color, shapes::DOT_SEGMENTS),
            (LineStyle::Dashes, prev) => {
                let direction = prev.map(|p| screen - p).unwrap_or(Vec2::ZERO);
                shapes::dash(screen, direction, DASH_LENGTH, STROKE_WIDTH, color)
            }
            (LineStyle::Solid, Some(prev)) => shapes::line(prev, screen, STROKE_WIDTH, color),
            (LineStyle::Solid, None) => {
                shapes::circle(screen, STROKE_WIDTH, color, shapes::DOT_SEGMENTS)
            }
        };
        self.frame.vertices.extend(vertices);
    }

    /// Replace every live point, keeping loaded ones
    pub fn replace_live(&mut self, points: &[TrajectoryPoint]) {
        self.points.retain(|p| p.kind == PointKind::Loaded);
        self.points.extend(points.iter().map(|&point| PlottedPoint {
            point,
            kind: PointKind::Live,
        }));
        self.redraw();
    }

    /// Erase drawn content and stored points; bounds are kept
    pub fn clear(&mut self) {
        self.points.clear();
        self.clear_frame();
    }

    fn clear_frame(&mut self) {
        self.frame.clear();
        self.stroke_heads = [None; 2];
    }

    /// Rebuild the frame from scratch: decoration then every stored point
    pub fn redraw(&mut self) {
        self.clear_frame();
        if self.show_grid {
            self.draw_grid();
        }
        if self.show_axes {
            self.draw_axes();
            self.draw_axis_labels();
        }
        let points = std::mem::take(&mut self.points);
        for plotted in &points {
            self.draw_point(plotted);
        }
        self.points = points;
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
        self.redraw();
    }

    pub fn toggle_axes(&mut self) {
        self.show_axes = !self.show_axes;
        self.redraw();
    }

    pub fn toggle_line_style(&mut self) {
        self.line_style = self.line_style.next();
        self.redraw();
    }

    pub fn toggle_tooltips(&mut self) {
        self.show_tooltips = !self.show_tooltips;
        log::info!(
            "Tooltips {}",
            if self.show_tooltips { "enabled" } else { "disabled" }
        );
        self.redraw();
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn show_axes(&self) -> bool {
        self.show_axes
    }

    pub fn show_tooltips(&self) -> bool {
        self.show_tooltips
    }

    pub fn line_style(&self) -> LineStyle {
        self.line_style
    }

    /// Point under the cursor (within the dot radius), if tooltips are on
    pub fn hover(&self, screen: DVec2) -> Option<&TrajectoryPoint> {
        if !self.show_tooltips {
            return None;
        }
        let radius = POINT_RADIUS as f64;
        self.points
            .iter()
            .filter_map(|p| {
                let pos = self.project(&p.point)?;
                let dist = pos.distance(screen);
                (dist <= radius).then_some((dist, &p.point))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, point)| point)
    }

    pub fn points(&self) -> &[PlottedPoint] {
        &self.points
    }

    /// Live points in plotting order
    pub fn live_points(&self) -> Vec<TrajectoryPoint> {
        self.points
            .iter()
            .filter(|p| p.kind == PointKind::Live)
            .map(|p| p.point)
            .collect()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(x: f64, y: f64) -> TrajectoryPoint {
        TrajectoryPoint::new(x, y, 0.0, 0.0)
    }

    #[test]
    fn test_default_viewport() {
        let mapper = CoordinateMapper::new(850, 500);
        assert_eq!(mapper.bounds(), DVec2::new(100.0, 100.0));
        assert_eq!(mapper.scale(), DVec2::new(8.5, 5.0));
    }

    #[test]
    fn test_bounds_only_grow() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.set_bounds(500.0, 200.0);
        let grown = mapper.bounds();
        assert!((grown.x - 550.0).abs() < 1e-9);
        assert!((grown.y - 220.0).abs() < 1e-9);

        mapper.set_bounds(10.0, 10.0);
        assert_eq!(mapper.bounds(), grown);

        mapper.reset_bounds();
        assert_eq!(mapper.bounds(), DVec2::new(100.0, 100.0));
    }

    #[test]
    fn test_small_bounds_keep_default_viewport() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.set_bounds(50.0, 50.0);
        mapper.set_bounds(10.0, 10.0);
        assert_eq!(mapper.bounds(), DVec2::new(100.0, 100.0));
    }

    #[test]
    fn test_transform_inverts_y() {
        let mapper = CoordinateMapper::new(850, 500);
        assert_eq!(mapper.transform(&point(0.0, 0.0)), DVec2::new(0.0, 500.0));
        assert_eq!(mapper.transform(&point(100.0, 100.0)), DVec2::new(850.0, 0.0));
        assert_eq!(mapper.transform(&point(50.0, 20.0)), DVec2::new(425.0, 400.0));
    }

    #[test]
    fn test_out_of_bounds_point_is_skipped_not_lost() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.toggle_grid();
        mapper.toggle_axes();
        assert!(mapper.frame().is_empty());

        mapper.plot(point(150.0, 10.0));
        assert!(mapper.project(&point(150.0, 10.0)).is_none());
        assert!(mapper.frame().vertices.is_empty());
        assert_eq!(mapper.points().len(), 1);

        // Growing the bounds brings it back on redraw
        mapper.set_bounds(150.0, 10.0);
        assert!(!mapper.frame().vertices.is_empty());
    }

    #[test]
    fn test_plot_appends() {
        let mut mapper = CoordinateMapper::new(850, 500);
        let base = mapper.frame().vertices.len();
        mapper.plot(point(10.0, 10.0));
        let one = mapper.frame().vertices.len();
        mapper.plot(point(20.0, 15.0));
        let two = mapper.frame().vertices.len();
        assert_eq!(one - base, (shapes::DOT_SEGMENTS * 3) as usize);
        assert_eq!(two - one, one - base);
    }

    #[test]
    fn test_clear_keeps_bounds() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.set_bounds(300.0, 80.0);
        mapper.plot(point(10.0, 10.0));
        mapper.clear();
        assert!(mapper.points().is_empty());
        assert!(mapper.frame().is_empty());
        assert!((mapper.bounds().x - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.toggle_line_style();
        for i in 0..10 {
            mapper.plot(point(i as f64 * 5.0, i as f64 * 2.0));
        }
        mapper.redraw();
        let first = mapper.frame().clone();
        mapper.redraw();
        assert_eq!(mapper.frame(), &first);
    }

    #[test]
    fn test_toggles_redraw() {
        let mut mapper = CoordinateMapper::new(850, 500);
        let labels = (GRID_DIVISIONS as usize + 1) * 2;
        assert_eq!(mapper.frame().labels.len(), labels);

        mapper.toggle_axes();
        assert!(mapper.frame().labels.is_empty());
        assert!(!mapper.show_axes());

        mapper.toggle_axes();
        assert_eq!(mapper.frame().labels.len(), labels);
        assert_eq!(mapper.frame().labels[0].text, "0.0");
        assert_eq!(mapper.frame().labels.last().map(|l| l.text.as_str()), Some("100.0"));
    }

    #[test]
    fn test_line_style_cycles() {
        let mut mapper = CoordinateMapper::new(850, 500);
        assert_eq!(mapper.line_style(), LineStyle::Dots);
        mapper.toggle_line_style();
        assert_eq!(mapper.line_style(), LineStyle::Dashes);
        mapper.toggle_line_style();
        assert_eq!(mapper.line_style(), LineStyle::Solid);
        mapper.toggle_line_style();
        assert_eq!(mapper.line_style(), LineStyle::Dots);
        assert_eq!(LineStyle::from_str("DASH"), Some(LineStyle::Dashes));
    }

    #[test]
    fn test_solid_connects_points() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.set_visuals(false, false, true, LineStyle::Solid);
        mapper.plot(point(10.0, 10.0));
        let first = mapper.frame().vertices.len();
        mapper.plot(point(20.0, 20.0));
        assert_eq!(mapper.frame().vertices.len() - first, 6);
    }

    #[test]
    fn test_hover_finds_nearest_point() {
        let mut mapper = CoordinateMapper::new(850, 500);
        let p = TrajectoryPoint::new(50.0, 20.0, 1.25, 30.0);
        mapper.plot(p);
        mapper.plot(point(60.0, 20.0));

        assert_eq!(mapper.hover(DVec2::new(426.0, 401.0)), Some(&p));
        assert_eq!(mapper.hover(DVec2::new(300.0, 100.0)), None);

        mapper.toggle_tooltips();
        assert_eq!(mapper.hover(DVec2::new(425.0, 400.0)), None);
    }

    #[test]
    fn test_replace_live_keeps_loaded() {
        let mut mapper = CoordinateMapper::new(850, 500);
        mapper.plot_loaded(point(1.0, 1.0));
        mapper.plot(point(2.0, 2.0));
        mapper.replace_live(&[point(3.0, 3.0), point(4.0, 4.0)]);
        assert_eq!(mapper.points().len(), 3);
        assert_eq!(mapper.live_points(), vec![point(3.0, 3.0), point(4.0, 4.0)]);
    }

    proptest! {
        #[test]
        fn prop_bounds_monotonic(extents in proptest::collection::vec((0.0f64..1e4, 0.0f64..1e4), 1..20)) {
            let mut mapper = CoordinateMapper::new(850, 500);
            let mut previous = mapper.bounds();
            for (x, y) in extents {
                mapper.set_bounds(x, y);
                let current = mapper.bounds();
                prop_assert!(current.x >= previous.x && current.y >= previous.y);
                prop_assert!(current.x >= x * BOUNDS_HEADROOM - 1e-9);
                prop_assert!(current.y >= y * BOUNDS_HEADROOM - 1e-9);
                previous = current;
            }
        }
    }
}
