use super::{BBox2D, Render2D, Style2D, SvgElement};
use crate::style::{Color, affine_to_skia};
use glam::{Affine2, Vec2};
use resvg::tiny_skia;
use std::any::Any;

macro_rules! definition_element {
    ($ty:ident, $name:literal) => {
        impl Style2D for $ty {}

        impl Render2D for $ty {
            fn renders_in_place(&self) -> bool {
                false
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

/// `<defs>`: children are styled and registered but never drawn in place.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Defs;

definition_element!(Defs, "Defs");

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum MarkerOrient {
    /// Rotate along the path direction at the vertex.
    #[default]
    Auto,
    /// Fixed angle in degrees.
    Angle(f32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkerUnits {
    /// Marker content is scaled by the referencing stroke width.
    #[default]
    StrokeWidth,
    UserSpaceOnUse,
}

/// `<marker>`: its children are drawn at path vertices of shapes that
/// reference it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Marker {
    pub ref_x: f32,
    pub ref_y: f32,
    pub orient: MarkerOrient,
    pub units: MarkerUnits,
}

impl Marker {
    pub fn new(ref_x: f32, ref_y: f32) -> Self {
        Self {
            ref_x,
            ref_y,
            ..Self::default()
        }
    }

    pub fn with_orient(mut self, orient: MarkerOrient) -> Self {
        self.orient = orient;
        self
    }

    pub fn with_units(mut self, units: MarkerUnits) -> Self {
        self.units = units;
        self
    }

    /// Transform from marker content space to the user space of the
    /// referencing shape. `angle` is the path direction in radians.
    pub fn placement(&self, pos: Vec2, angle: f32, stroke_width: f32) -> Affine2 {
        let rotation = match self.orient {
            MarkerOrient::Auto => angle,
            MarkerOrient::Angle(deg) => deg.to_radians(),
        };
        let scale = match self.units {
            MarkerUnits::StrokeWidth => stroke_width,
            MarkerUnits::UserSpaceOnUse => 1.0,
        };
        Affine2::from_translation(pos)
            * Affine2::from_angle(rotation)
            * Affine2::from_scale(Vec2::splat(scale))
            * Affine2::from_translation(Vec2::new(-self.ref_x, -self.ref_y))
    }
}

definition_element!(Marker, "Marker");

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient, `0..=1`.
    pub offset: f32,
    pub color: Color,
    pub opacity: f32,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset,
            color,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GradientUnits {
    /// Coordinates are fractions of the painted shape's bounds.
    #[default]
    ObjectBoundingBox,
    UserSpaceOnUse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

impl SpreadMethod {
    fn to_skia(self) -> tiny_skia::SpreadMode {
        match self {
            Self::Pad => tiny_skia::SpreadMode::Pad,
            Self::Reflect => tiny_skia::SpreadMode::Reflect,
            Self::Repeat => tiny_skia::SpreadMode::Repeat,
        }
    }
}

/// Settings shared by both gradient kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBase {
    pub stops: Vec<GradientStop>,
    pub units: GradientUnits,
    pub spread: SpreadMethod,
    pub transform: Affine2,
}

impl Default for GradientBase {
    fn default() -> Self {
        Self {
            stops: Vec::new(),
            units: GradientUnits::default(),
            spread: SpreadMethod::default(),
            transform: Affine2::IDENTITY,
        }
    }
}

impl GradientBase {
    fn skia_stops(&self, alpha: f32) -> Vec<tiny_skia::GradientStop> {
        let mut last = 0.0f32;
        self.stops
            .iter()
            .map(|stop| {
                // offsets must be non-decreasing
                last = stop.offset.clamp(0.0, 1.0).max(last);
                let color = stop.color.with_opacity(stop.opacity * alpha);
                tiny_skia::GradientStop::new(last, color.to_skia())
            })
            .collect()
    }

    /// Gradient space to user space. `None` when an object-bounding-box
    /// gradient is applied to a degenerate shape.
    fn skia_transform(&self, bounds: tiny_skia::Rect) -> Option<tiny_skia::Transform> {
        let units = match self.units {
            GradientUnits::ObjectBoundingBox => {
                if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
                    return None;
                }
                Affine2::from_cols_array(&[
                    bounds.width(),
                    0.0,
                    0.0,
                    bounds.height(),
                    bounds.x(),
                    bounds.y(),
                ])
            }
            GradientUnits::UserSpaceOnUse => Affine2::IDENTITY,
        };
        Some(affine_to_skia(units * self.transform))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub base: GradientBase,
}

impl Default for LinearGradient {
    fn default() -> Self {
        Self {
            start: Vec2::ZERO,
            end: Vec2::X,
            base: GradientBase::default(),
        }
    }
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    pub fn with_stop(mut self, stop: GradientStop) -> Self {
        self.base.stops.push(stop);
        self
    }

    pub fn with_units(mut self, units: GradientUnits) -> Self {
        self.base.units = units;
        self
    }

    pub fn with_spread(mut self, spread: SpreadMethod) -> Self {
        self.base.spread = spread;
        self
    }

    pub fn with_transform(mut self, transform: Affine2) -> Self {
        self.base.transform = transform;
        self
    }

    /// Shader for a shape whose user-space bounds are `bounds`, with every
    /// stop alpha scaled by `alpha`.
    pub fn shader(&self, bounds: tiny_skia::Rect, alpha: f32) -> Option<tiny_skia::Shader<'static>> {
        tiny_skia::LinearGradient::new(
            tiny_skia::Point::from_xy(self.start.x, self.start.y),
            tiny_skia::Point::from_xy(self.end.x, self.end.y),
            self.base.skia_stops(alpha),
            self.base.spread.to_skia(),
            self.base.skia_transform(bounds)?,
        )
    }
}

definition_element!(LinearGradient, "LinearGradient");

#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub focal: Vec2,
    pub base: GradientBase,
}

impl Default for RadialGradient {
    fn default() -> Self {
        Self {
            center: Vec2::splat(0.5),
            radius: 0.5,
            focal: Vec2::splat(0.5),
            base: GradientBase::default(),
        }
    }
}

impl RadialGradient {
    /// Focal point defaults to the center.
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            focal: center,
            ..Self::default()
        }
    }

    pub fn with_focal(mut self, focal: Vec2) -> Self {
        self.focal = focal;
        self
    }

    pub fn with_stop(mut self, stop: GradientStop) -> Self {
        self.base.stops.push(stop);
        self
    }

    pub fn with_units(mut self, units: GradientUnits) -> Self {
        self.base.units = units;
        self
    }

    pub fn with_spread(mut self, spread: SpreadMethod) -> Self {
        self.base.spread = spread;
        self
    }

    pub fn shader(&self, bounds: tiny_skia::Rect, alpha: f32) -> Option<tiny_skia::Shader<'static>> {
        tiny_skia::RadialGradient::new(
            tiny_skia::Point::from_xy(self.focal.x, self.focal.y),
            tiny_skia::Point::from_xy(self.center.x, self.center.y),
            self.radius,
            self.base.skia_stops(alpha),
            self.base.spread.to_skia(),
            self.base.skia_transform(bounds)?,
        )
    }
}

definition_element!(RadialGradient, "RadialGradient");

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn auto_marker_rotates_and_scales_with_stroke() {
        let marker = Marker::new(1.0, 0.0);
        let placement = marker.placement(Vec2::new(10.0, 10.0), FRAC_PI_2, 2.0);
        let tip = placement.transform_point2(Vec2::new(2.0, 0.0));
        assert!((tip - Vec2::new(10.0, 12.0)).length() < 1e-4);
    }

    #[test]
    fn fixed_angle_marker_ignores_path_direction() {
        let marker = Marker::new(0.0, 0.0)
            .with_orient(MarkerOrient::Angle(0.0))
            .with_units(MarkerUnits::UserSpaceOnUse);
        let placement = marker.placement(Vec2::new(5.0, 5.0), FRAC_PI_2, 3.0);
        let p = placement.transform_point2(Vec2::new(1.0, 0.0));
        assert!((p - Vec2::new(6.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn bounding_box_gradient_needs_area() {
        let gradient = LinearGradient::default()
            .with_stop(GradientStop::new(0.0, Color::rgb(255, 0, 0)))
            .with_stop(GradientStop::new(1.0, Color::rgb(0, 0, 255)));
        let flat = tiny_skia::Rect::from_xywh(0.0, 0.0, 10.0, 0.0);
        let area = tiny_skia::Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        if let (Some(flat), Some(area)) = (flat, area) {
            assert!(gradient.shader(flat, 1.0).is_none());
            assert!(gradient.shader(area, 1.0).is_some());
        }
    }

    #[test]
    fn stop_offsets_are_monotonic() {
        let mut base = GradientBase::default();
        base.stops.push(GradientStop::new(0.6, Color::rgb(0, 0, 0)));
        base.stops.push(GradientStop::new(0.2, Color::rgb(0, 0, 0)));
        assert_eq!(base.skia_stops(1.0).len(), 2);
    }
}
