use super::{BBox2D, PaintContext, Render2D, Style2D, SvgElement};
use crate::style::StrokeStyle;
use crate::view::Surface;
use glam::Vec2;
use resvg::tiny_skia;
use std::any::Any;

/// Bezier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// One segment of a `<path>`, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// A path vertex where markers may be placed. `angle` is in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Vec2,
    pub angle: f32,
}

trait Geometry {
    fn path(&self) -> Option<tiny_skia::Path>;

    /// Segments for kinds that take markers.
    fn marker_commands(&self) -> Option<Vec<PathCommand>> {
        None
    }
}

macro_rules! shape_element {
    ($ty:ident, $name:literal) => {
        impl Style2D for $ty {}

        impl Render2D for $ty {
            fn paint(&self, ctx: &PaintContext<'_>, surface: &mut Surface) {
                let Some(path) = self.path() else {
                    return;
                };
                draw_path(ctx, surface, &path);
                if let Some(commands) = self.marker_commands() {
                    draw_markers(ctx, surface, &vertices(&commands));
                }
            }
        }

        impl BBox2D for $ty {}

        impl SvgElement for $ty {
            fn type_name(&self) -> &'static str {
                $name
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Corner radii; a zero radius takes the other one.
    pub rx: f32,
    pub ry: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rx: 0.0,
            ry: 0.0,
        }
    }

    pub fn rounded(mut self, rx: f32, ry: f32) -> Self {
        self.rx = rx;
        self.ry = ry;
        self
    }
}

impl Geometry for Rect {
    fn path(&self) -> Option<tiny_skia::Path> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let (mut rx, mut ry) = (self.rx.max(0.0), self.ry.max(0.0));
        if rx == 0.0 {
            rx = ry;
        }
        if ry == 0.0 {
            ry = rx;
        }
        let rx = rx.min(self.width * 0.5);
        let ry = ry.min(self.height * 0.5);
        if rx == 0.0 || ry == 0.0 {
            let rect = tiny_skia::Rect::from_xywh(self.x, self.y, self.width, self.height)?;
            return Some(tiny_skia::PathBuilder::from_rect(rect));
        }

        let (l, t) = (self.x, self.y);
        let (r, b) = (self.x + self.width, self.y + self.height);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(l + rx, t);
        pb.line_to(r - rx, t);
        pb.cubic_to(r - rx + kx, t, r, t + ry - ky, r, t + ry);
        pb.line_to(r, b - ry);
        pb.cubic_to(r, b - ry + ky, r - rx + kx, b, r - rx, b);
        pb.line_to(l + rx, b);
        pb.cubic_to(l + rx - kx, b, l, b - ry + ky, l, b - ry);
        pb.line_to(l, t + ry);
        pb.cubic_to(l, t + ry - ky, l + rx - kx, t, l + rx, t);
        pb.close();
        pb.finish()
    }
}

shape_element!(Rect, "Rect");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(cx: f32, cy: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(cx, cy),
            radius,
        }
    }
}

impl Geometry for Circle {
    fn path(&self) -> Option<tiny_skia::Path> {
        if self.radius <= 0.0 {
            return None;
        }
        tiny_skia::PathBuilder::from_circle(self.center.x, self.center.y, self.radius)
    }
}

shape_element!(Circle, "Circle");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ellipse {
    pub center: Vec2,
    pub radii: Vec2,
}

impl Ellipse {
    pub fn new(cx: f32, cy: f32, rx: f32, ry: f32) -> Self {
        Self {
            center: Vec2::new(cx, cy),
            radii: Vec2::new(rx, ry),
        }
    }
}

impl Geometry for Ellipse {
    fn path(&self) -> Option<tiny_skia::Path> {
        if self.radii.x <= 0.0 || self.radii.y <= 0.0 {
            return None;
        }
        let min = self.center - self.radii;
        let size = self.radii * 2.0;
        let oval = tiny_skia::Rect::from_xywh(min.x, min.y, size.x, size.y)?;
        tiny_skia::PathBuilder::from_oval(oval)
    }
}

shape_element!(Ellipse, "Ellipse");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line {
    pub start: Vec2,
    pub end: Vec2,
}

impl Line {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            start: Vec2::new(x1, y1),
            end: Vec2::new(x2, y2),
        }
    }
}

impl Geometry for Line {
    fn path(&self) -> Option<tiny_skia::Path> {
        build_path(&self.commands())
    }

    fn marker_commands(&self) -> Option<Vec<PathCommand>> {
        Some(self.commands())
    }
}

impl Line {
    fn commands(&self) -> Vec<PathCommand> {
        vec![PathCommand::MoveTo(self.start), PathCommand::LineTo(self.end)]
    }
}

shape_element!(Line, "Line");

/// Open run of straight segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec2>,
}

impl Polyline {
    pub fn new(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }
}

impl Geometry for Polyline {
    fn path(&self) -> Option<tiny_skia::Path> {
        build_path(&point_commands(&self.points, false))
    }

    fn marker_commands(&self) -> Option<Vec<PathCommand>> {
        Some(point_commands(&self.points, false))
    }
}

shape_element!(Polyline, "Polyline");

/// Closed polyline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }
}

impl Geometry for Polygon {
    fn path(&self) -> Option<tiny_skia::Path> {
        build_path(&point_commands(&self.points, true))
    }

    fn marker_commands(&self) -> Option<Vec<PathCommand>> {
        Some(point_commands(&self.points, true))
    }
}

shape_element!(Polygon, "Polygon");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub commands: Vec<PathCommand>,
}

impl Path {
    pub fn new(commands: impl IntoIterator<Item = PathCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

impl Geometry for Path {
    fn path(&self) -> Option<tiny_skia::Path> {
        build_path(&self.commands)
    }

    fn marker_commands(&self) -> Option<Vec<PathCommand>> {
        Some(self.commands.clone())
    }
}

shape_element!(Path, "Path");

fn point_commands(points: &[Vec2], closed: bool) -> Vec<PathCommand> {
    let mut commands: Vec<PathCommand> = points
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 {
                PathCommand::MoveTo(p)
            } else {
                PathCommand::LineTo(p)
            }
        })
        .collect();
    if closed && points.len() > 2 {
        commands.push(PathCommand::Close);
    }
    commands
}

fn build_path(commands: &[PathCommand]) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => pb.move_to(p.x, p.y),
            PathCommand::LineTo(p) => pb.line_to(p.x, p.y),
            PathCommand::QuadTo(c, p) => pb.quad_to(c.x, c.y, p.x, p.y),
            PathCommand::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathCommand::Close => pb.close(),
        }
    }
    pb.finish()
}

/// Position, incoming tangent, outgoing tangent.
type RawVertex = (Vec2, Option<Vec2>, Option<Vec2>);

fn push_segment(raw: &mut Vec<RawVertex>, from: Vec2, out: Vec2, to: Vec2, incoming: Vec2) {
    if let Some(last) = raw.last_mut() {
        if last.2.is_none() && last.0 == from {
            last.2 = Some(out);
        }
    }
    raw.push((to, Some(incoming), None));
}

/// Marker positions of a segment list: every segment end point, with the
/// direction bisected at interior vertices.
pub fn vertices(commands: &[PathCommand]) -> Vec<Vertex> {
    let mut raw: Vec<RawVertex> = Vec::new();
    let mut current = Vec2::ZERO;
    let mut start = Vec2::ZERO;

    for command in commands {
        match *command {
            PathCommand::MoveTo(p) => {
                raw.push((p, None, None));
                current = p;
                start = p;
            }
            PathCommand::LineTo(p) => {
                push_segment(&mut raw, current, p - current, p, p - current);
                current = p;
            }
            PathCommand::QuadTo(c, p) => {
                push_segment(&mut raw, current, c - current, p, p - c);
                current = p;
            }
            PathCommand::CubicTo(c1, c2, p) => {
                push_segment(&mut raw, current, c1 - current, p, p - c2);
                current = p;
            }
            PathCommand::Close => {
                if current != start {
                    push_segment(&mut raw, current, start - current, start, start - current);
                }
                current = start;
            }
        }
    }

    raw.into_iter()
        .map(|(pos, incoming, outgoing)| {
            let direction = match (incoming, outgoing) {
                (Some(a), Some(b)) => {
                    let sum = a.normalize_or_zero() + b.normalize_or_zero();
                    if sum == Vec2::ZERO { a } else { sum }
                }
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => Vec2::X,
            };
            Vertex {
                pos,
                angle: direction.y.atan2(direction.x),
            }
        })
        .collect()
}

fn skia_stroke(style: &StrokeStyle) -> tiny_skia::Stroke {
    let mut stroke = tiny_skia::Stroke::default();
    stroke.width = style.width_dots;
    stroke.line_cap = style.cap.to_skia();
    stroke.line_join = style.join.to_skia();
    stroke.miter_limit = style.miter_limit;
    if !style.dash_dots.is_empty() {
        let mut dashes = style.dash_dots.clone();
        if dashes.len() % 2 == 1 {
            dashes.extend_from_within(..);
        }
        stroke.dash = tiny_skia::StrokeDash::new(dashes, 0.0);
    }
    stroke
}

/// Fills then strokes `path` with the node's resolved paint.
pub(crate) fn draw_path(ctx: &PaintContext<'_>, surface: &mut Surface, path: &tiny_skia::Path) {
    let paint = ctx.paint();
    let bounds = path.bounds();
    if paint.has_fill() {
        if let Some(skia) = ctx.skia_paint(&paint.fill.server, paint.fill.opacity, bounds, surface) {
            surface.fill_path(path, &skia, paint.fill.rule.to_skia());
        }
    }
    if paint.has_stroke() && paint.stroke.width_dots > 0.0 {
        if let Some(skia) = ctx.skia_paint(&paint.stroke.server, paint.stroke.opacity, bounds, surface) {
            surface.stroke_path(path, &skia, &skia_stroke(&paint.stroke));
        }
    }
}

fn draw_markers(ctx: &PaintContext<'_>, surface: &mut Surface, vertices: &[Vertex]) {
    let Some(last) = vertices.len().checked_sub(1) else {
        return;
    };
    let width = ctx.paint().stroke.width_dots;
    let scene = ctx.scene;

    if let Some(marker) = scene.marker(ctx.id, "marker-start") {
        let v = vertices[0];
        scene.paint_marker(marker, v.pos, v.angle, width, surface);
    }
    if last > 1 {
        if let Some(marker) = scene.marker(ctx.id, "marker-mid") {
            for v in &vertices[1..last] {
                scene.paint_marker(marker, v.pos, v.angle, width, surface);
            }
        }
    }
    if last > 0 {
        if let Some(marker) = scene.marker(ctx.id, "marker-end") {
            let v = vertices[last];
            scene.paint_marker(marker, v.pos, v.angle, width, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn degenerate_shapes_have_no_path() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).path().is_none());
        assert!(Circle::new(1.0, 1.0, 0.0).path().is_none());
        assert!(Ellipse::new(1.0, 1.0, 2.0, -1.0).path().is_none());
    }

    #[test]
    fn rounded_rect_radius_is_clamped() {
        let path = Rect::new(0.0, 0.0, 10.0, 4.0).rounded(20.0, 0.0).path().expect("path");
        let bounds = path.bounds();
        assert_eq!((bounds.left(), bounds.top()), (0.0, 0.0));
        assert_eq!((bounds.right(), bounds.bottom()), (10.0, 4.0));
    }

    #[test]
    fn interior_vertices_bisect_the_corner() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let v = vertices(&point_commands(&points, false));
        assert_eq!(v.len(), 3);
        assert!(v[0].angle.abs() < 1e-5);
        assert!((v[1].angle - FRAC_PI_4).abs() < 1e-5);
        assert!((v[2].angle - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn closing_segment_adds_a_vertex() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0)];
        let v = vertices(&point_commands(&points, true));
        assert_eq!(v.len(), 4);
        assert_eq!(v[3].pos, Vec2::ZERO);
    }

    #[test]
    fn curve_tangents_come_from_control_points() {
        let v = vertices(&[
            PathCommand::MoveTo(Vec2::ZERO),
            PathCommand::CubicTo(Vec2::new(0.0, 5.0), Vec2::new(5.0, 10.0), Vec2::new(10.0, 10.0)),
        ]);
        assert!((v[0].angle - FRAC_PI_2).abs() < 1e-5);
        assert!(v[1].angle.abs() < 1e-5);
    }

    #[test]
    fn odd_dash_lists_are_repeated() {
        let mut style = StrokeStyle::default();
        style.dash_dots = vec![3.0, 1.0, 2.0];
        assert!(skia_stroke(&style).dash.is_some());
    }
}
