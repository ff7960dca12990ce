use crate::style::color::Color;
use crate::tree::NodeId;
use glam::{Affine2, Vec2};
use resvg::tiny_skia;
use smol_str::SmolStr;

/// Style keys understood by [`crate::Paint`]. Everything else in a property
/// bag (geometry, marker references, ...) is ignored by the cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Fill,
    FillOpacity,
    FillRule,
    Stroke,
    StrokeOpacity,
    StrokeWidth,
    StrokeLinecap,
    StrokeLinejoin,
    StrokeMiterlimit,
    StrokeDasharray,
    Opacity,
    Transform,
    Visibility,
    Display,
}

impl PropertyId {
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "fill" => Self::Fill,
            "fill-opacity" => Self::FillOpacity,
            "fill-rule" => Self::FillRule,
            "stroke" => Self::Stroke,
            "stroke-opacity" => Self::StrokeOpacity,
            "stroke-width" => Self::StrokeWidth,
            "stroke-linecap" => Self::StrokeLinecap,
            "stroke-linejoin" => Self::StrokeLinejoin,
            "stroke-miterlimit" => Self::StrokeMiterlimit,
            "stroke-dasharray" => Self::StrokeDasharray,
            "opacity" => Self::Opacity,
            "transform" => Self::Transform,
            "visibility" => Self::Visibility,
            "display" => Self::Display,
            _ => return None,
        })
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::FillOpacity => "fill-opacity",
            Self::FillRule => "fill-rule",
            Self::Stroke => "stroke",
            Self::StrokeOpacity => "stroke-opacity",
            Self::StrokeWidth => "stroke-width",
            Self::StrokeLinecap => "stroke-linecap",
            Self::StrokeLinejoin => "stroke-linejoin",
            Self::StrokeMiterlimit => "stroke-miterlimit",
            Self::StrokeDasharray => "stroke-dasharray",
            Self::Opacity => "opacity",
            Self::Transform => "transform",
            Self::Visibility => "visibility",
            Self::Display => "display",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Px(f32),
    Pt(f32),
    Mm(f32),
    In(f32),
    Em(f32),
    Percent(f32),
    Vw(f32),
    Vh(f32),
    Zero,
}

impl Length {
    pub const fn px(value: f32) -> Self {
        Self::Px(value)
    }

    pub const fn percent(value: f32) -> Self {
        Self::Percent(value)
    }

    /// Parses a number with an optional unit suffix. A bare number is px.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        let split = value
            .find(|c: char| c.is_ascii_alphabetic() || c == '%')
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let number: f32 = number.trim().parse().ok()?;
        Some(match unit.to_ascii_lowercase().as_str() {
            "" | "px" => Self::Px(number),
            "pt" => Self::Pt(number),
            "mm" => Self::Mm(number),
            "in" => Self::In(number),
            "em" => Self::Em(number),
            "%" => Self::Percent(number),
            "vw" => Self::Vw(number),
            "vh" => Self::Vh(number),
            _ => return None,
        })
    }

    /// Resolves to device dots. Percentages resolve against `percent_base`.
    pub fn to_dots(self, units: &UnitContext, percent_base: f32) -> f32 {
        match self {
            Self::Px(v) => v,
            Self::Pt(v) => v * units.dpi / 72.0,
            Self::Mm(v) => v * units.dpi / 25.4,
            Self::In(v) => v * units.dpi,
            Self::Em(v) => v * units.font_size,
            Self::Percent(v) => percent_base.max(0.0) * v * 0.01,
            Self::Vw(v) => units.viewport.x.max(0.0) * v * 0.01,
            Self::Vh(v) => units.viewport.y.max(0.0) * v * 0.01,
            Self::Zero => 0.0,
        }
    }
}

/// Device-unit context, established at a document root and inherited below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitContext {
    pub dpi: f32,
    /// Dots per em.
    pub font_size: f32,
    pub viewport: Vec2,
}

impl UnitContext {
    pub fn new(dpi: f32, font_size: f32, viewport: Vec2) -> Self {
        Self {
            dpi,
            font_size,
            viewport,
        }
    }

    /// Base for percentages that are neither horizontal nor vertical, such as
    /// stroke widths: the normalized viewport diagonal.
    pub fn diagonal(&self) -> f32 {
        ((self.viewport.x * self.viewport.x + self.viewport.y * self.viewport.y) * 0.5).sqrt()
    }
}

impl Default for UnitContext {
    fn default() -> Self {
        // 12pt at 96 dpi
        Self {
            dpi: 96.0,
            font_size: 16.0,
            viewport: Vec2::ZERO,
        }
    }
}

/// What a fill or stroke is painted with.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintServer {
    None,
    Color(Color),
    /// Unresolved `url(#name)` reference, looked up at paint time.
    Url(SmolStr),
    Node(NodeId),
}

impl PaintServer {
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("none") {
            return Some(Self::None);
        }
        if value.starts_with("url(") {
            return Some(Self::Url(SmolStr::new(value)));
        }
        Color::parse(value).map(Self::Color)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "butt" => Some(Self::Butt),
            "round" => Some(Self::Round),
            "square" => Some(Self::Square),
            _ => None,
        }
    }

    pub fn to_skia(self) -> tiny_skia::LineCap {
        match self {
            Self::Butt => tiny_skia::LineCap::Butt,
            Self::Round => tiny_skia::LineCap::Round,
            Self::Square => tiny_skia::LineCap::Square,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "miter" => Some(Self::Miter),
            "round" => Some(Self::Round),
            "bevel" => Some(Self::Bevel),
            _ => None,
        }
    }

    pub fn to_skia(self) -> tiny_skia::LineJoin {
        match self {
            Self::Miter => tiny_skia::LineJoin::Miter,
            Self::Round => tiny_skia::LineJoin::Round,
            Self::Bevel => tiny_skia::LineJoin::Bevel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "nonzero" => Some(Self::NonZero),
            "evenodd" => Some(Self::EvenOdd),
            _ => None,
        }
    }

    pub fn to_skia(self) -> tiny_skia::FillRule {
        match self {
            Self::NonZero => tiny_skia::FillRule::Winding,
            Self::EvenOdd => tiny_skia::FillRule::EvenOdd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "visible" => Some(Self::Visible),
            "hidden" | "collapse" => Some(Self::Hidden),
            _ => None,
        }
    }
}

/// Parses an opacity given as a fraction or a percentage.
pub fn parse_opacity(raw: &str) -> Option<f32> {
    let value = raw.trim();
    let v = match value.strip_suffix('%') {
        Some(percent) => percent.trim().parse::<f32>().ok()? * 0.01,
        None => value.parse::<f32>().ok()?,
    };
    Some(v.clamp(0.0, 1.0))
}

pub fn parse_number_list(raw: &str) -> Option<Vec<f32>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f32>().ok())
        .collect()
}

pub fn parse_length_list(raw: &str) -> Option<Vec<Length>> {
    let value = raw.trim();
    if value == "none" {
        return Some(Vec::new());
    }
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(Length::parse)
        .collect()
}

/// Parses an SVG transform list. Items compose left to right.
pub fn parse_transform(raw: &str) -> Option<Affine2> {
    let mut result = Affine2::IDENTITY;
    let mut rest = raw.trim();
    if rest == "none" {
        return Some(result);
    }
    while !rest.is_empty() {
        let open = rest.find('(')?;
        let close = open + rest[open..].find(')')?;
        let name = rest[..open].trim_matches(|c: char| c == ',' || c.is_whitespace());
        let args = parse_number_list(&rest[open + 1..close])?;
        let item = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine2::from_cols_array(&[a, b, c, d, e, f]),
            ("translate", &[tx]) => Affine2::from_translation(Vec2::new(tx, 0.0)),
            ("translate", &[tx, ty]) => Affine2::from_translation(Vec2::new(tx, ty)),
            ("scale", &[s]) => Affine2::from_scale(Vec2::splat(s)),
            ("scale", &[sx, sy]) => Affine2::from_scale(Vec2::new(sx, sy)),
            ("rotate", &[angle]) => Affine2::from_angle(angle.to_radians()),
            ("rotate", &[angle, cx, cy]) => {
                let center = Vec2::new(cx, cy);
                Affine2::from_translation(center)
                    * Affine2::from_angle(angle.to_radians())
                    * Affine2::from_translation(-center)
            }
            ("skewX", &[angle]) => {
                Affine2::from_cols_array(&[1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0])
            }
            ("skewY", &[angle]) => {
                Affine2::from_cols_array(&[1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0])
            }
            _ => return None,
        };
        result = result * item;
        rest = rest[close + 1..].trim_start();
    }
    Some(result)
}

pub fn affine_to_skia(xform: Affine2) -> tiny_skia::Transform {
    let m = xform.matrix2;
    tiny_skia::Transform::from_row(
        m.x_axis.x,
        m.x_axis.y,
        m.y_axis.x,
        m.y_axis.y,
        xform.translation.x,
        xform.translation.y,
    )
}

#[cfg(test)]
mod tests {
    use super::{Length, PaintServer, UnitContext, parse_length_list, parse_transform};
    use crate::style::Color;
    use glam::{Affine2, Vec2};

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn lengths_parse_units_and_resolve_to_dots() {
        let units = UnitContext::new(96.0, 16.0, Vec2::new(200.0, 100.0));
        assert_eq!(Length::parse("3").map(|l| l.to_dots(&units, 0.0)), Some(3.0));
        assert_eq!(Length::parse("72pt").map(|l| l.to_dots(&units, 0.0)), Some(96.0));
        assert_eq!(Length::parse("2em").map(|l| l.to_dots(&units, 0.0)), Some(32.0));
        assert_eq!(Length::parse("50%").map(|l| l.to_dots(&units, 40.0)), Some(20.0));
        assert_eq!(Length::parse("10vw").map(|l| l.to_dots(&units, 0.0)), Some(20.0));
        assert_eq!(Length::parse("1parsec"), None);
        assert_eq!(Length::parse(""), None);
    }

    #[test]
    fn transform_list_composes_left_to_right() {
        let xform = parse_transform("translate(10, 20) scale(2)").expect("valid transform");
        assert!(approx(xform.transform_point2(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 22.0)));

        let rotate = parse_transform("rotate(90)").expect("valid transform");
        assert!(approx(rotate.transform_point2(Vec2::new(1.0, 0.0)), Vec2::new(0.0, 1.0)));

        let about = parse_transform("rotate(180 5 5)").expect("valid transform");
        assert!(approx(about.transform_point2(Vec2::new(0.0, 0.0)), Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn transform_rejects_garbage_and_accepts_none() {
        assert_eq!(parse_transform("none"), Some(Affine2::IDENTITY));
        assert_eq!(parse_transform("wobble(3)"), None);
        assert_eq!(parse_transform("translate(1,2,3)"), None);
    }

    #[test]
    fn paint_server_distinguishes_none_url_and_color() {
        assert_eq!(PaintServer::parse("none"), Some(PaintServer::None));
        assert_eq!(
            PaintServer::parse("url(#grad)"),
            Some(PaintServer::Url("url(#grad)".into()))
        );
        assert_eq!(
            PaintServer::parse("blue"),
            Some(PaintServer::Color(Color::rgb(0, 0, 255)))
        );
        assert_eq!(PaintServer::parse("not-a-color"), None);
    }

    #[test]
    fn dash_lists_parse_lengths() {
        assert_eq!(
            parse_length_list("4, 2px"),
            Some(vec![Length::Px(4.0), Length::Px(2.0)])
        );
        assert_eq!(parse_length_list("none"), Some(Vec::new()));
    }
}
