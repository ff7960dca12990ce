use crate::style::parsed_style::{
    FillRule, Length, LineCap, LineJoin, PaintServer, PropertyId, UnitContext, Visibility,
    parse_length_list, parse_opacity, parse_transform,
};
use crate::tree::{PropValue, Props, StyleContext};
use glam::Affine2;

#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    pub server: PaintServer,
    pub opacity: f32,
    pub rule: FillRule,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            server: PaintServer::Color(crate::style::Color::rgb(0, 0, 0)),
            opacity: 1.0,
            rule: FillRule::NonZero,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub server: PaintServer,
    pub opacity: f32,
    pub width: Length,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    pub dashes: Vec<Length>,
    /// `width` in device dots, valid after [`Paint::to_dots`].
    pub width_dots: f32,
    pub dash_dots: Vec<f32>,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            server: PaintServer::None,
            opacity: 1.0,
            width: Length::Px(1.0),
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dashes: Vec::new(),
            width_dots: 1.0,
            dash_dots: Vec::new(),
        }
    }
}

/// The resolved paint record of one node.
///
/// `fill`, `stroke`, `visibility` and `units` are inherited from the parent;
/// `opacity`, `display` and `xform` belong to the node alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    /// Nothing to stroke and nothing to fill.
    pub off: bool,
    /// At least one style property was applied during the current pass.
    pub style_set: bool,
    pub fill: FillStyle,
    pub stroke: StrokeStyle,
    pub visibility: Visibility,
    pub units: UnitContext,
    pub opacity: f32,
    pub display: bool,
    pub xform: Affine2,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            off: false,
            style_set: false,
            fill: FillStyle::default(),
            stroke: StrokeStyle::default(),
            visibility: Visibility::Visible,
            units: UnitContext::default(),
            opacity: 1.0,
            display: true,
            xform: Affine2::IDENTITY,
        }
    }
}

impl Paint {
    pub fn defaults(&mut self) {
        *self = Self::default();
    }

    pub fn copy_style_from(&mut self, parent: &Paint) {
        self.fill = parent.fill.clone();
        self.stroke = parent.stroke.clone();
        self.visibility = parent.visibility;
        self.units = parent.units;
    }

    /// Drops the per-node fields so a new pass starts from the same base.
    pub(crate) fn reset_local(&mut self) {
        self.style_set = false;
        self.opacity = 1.0;
        self.display = true;
        self.xform = Affine2::IDENTITY;
    }

    /// Applies every style key of `props`. `inherit` copies the value from
    /// `parent` (or keeps the current one at a root), `initial` restores the
    /// default. Unparseable values are reported and leave the slot unchanged.
    pub fn set_style_props(&mut self, parent: Option<&Paint>, props: &Props, ctx: &StyleContext<'_>) {
        for (key, value) in props.iter() {
            let Some(id) = PropertyId::from_key(key) else {
                continue;
            };
            if let Some(keyword) = value.as_str().map(str::trim) {
                if keyword == "inherit" {
                    if let Some(parent) = parent {
                        self.inherit_property(id, parent);
                    }
                    self.style_set = true;
                    continue;
                }
                if keyword == "initial" {
                    self.inherit_property(id, &Paint::default());
                    self.style_set = true;
                    continue;
                }
            }
            if self.set_property(id, value) {
                self.style_set = true;
            } else {
                ctx.report_property_type(key, expected_kind(id), value);
            }
        }
    }

    fn set_property(&mut self, id: PropertyId, value: &PropValue) -> bool {
        match id {
            PropertyId::Fill => match parse_paint_server(value) {
                Some(server) => {
                    self.fill.server = server;
                    true
                }
                None => false,
            },
            PropertyId::Stroke => match parse_paint_server(value) {
                Some(server) => {
                    self.stroke.server = server;
                    true
                }
                None => false,
            },
            PropertyId::FillOpacity => {
                assign(&mut self.fill.opacity, parse_fraction(value))
            }
            PropertyId::StrokeOpacity => {
                assign(&mut self.stroke.opacity, parse_fraction(value))
            }
            PropertyId::Opacity => assign(&mut self.opacity, parse_fraction(value)),
            PropertyId::FillRule => assign(
                &mut self.fill.rule,
                value.as_str().and_then(FillRule::parse),
            ),
            PropertyId::StrokeWidth => assign(&mut self.stroke.width, parse_length(value)),
            PropertyId::StrokeLinecap => assign(
                &mut self.stroke.cap,
                value.as_str().and_then(LineCap::parse),
            ),
            PropertyId::StrokeLinejoin => assign(
                &mut self.stroke.join,
                value.as_str().and_then(LineJoin::parse),
            ),
            PropertyId::StrokeMiterlimit => assign(
                &mut self.stroke.miter_limit,
                parse_number(value).map(|v| v.max(1.0)),
            ),
            PropertyId::StrokeDasharray => assign(
                &mut self.stroke.dashes,
                value.as_str().and_then(parse_length_list),
            ),
            PropertyId::Transform => {
                assign(&mut self.xform, value.as_str().and_then(parse_transform))
            }
            PropertyId::Visibility => assign(
                &mut self.visibility,
                value.as_str().and_then(Visibility::parse),
            ),
            PropertyId::Display => assign(
                &mut self.display,
                value.as_str().map(|v| v.trim() != "none"),
            ),
        }
    }

    fn inherit_property(&mut self, id: PropertyId, from: &Paint) {
        match id {
            PropertyId::Fill => self.fill.server = from.fill.server.clone(),
            PropertyId::FillOpacity => self.fill.opacity = from.fill.opacity,
            PropertyId::FillRule => self.fill.rule = from.fill.rule,
            PropertyId::Stroke => self.stroke.server = from.stroke.server.clone(),
            PropertyId::StrokeOpacity => self.stroke.opacity = from.stroke.opacity,
            PropertyId::StrokeWidth => self.stroke.width = from.stroke.width,
            PropertyId::StrokeLinecap => self.stroke.cap = from.stroke.cap,
            PropertyId::StrokeLinejoin => self.stroke.join = from.stroke.join,
            PropertyId::StrokeMiterlimit => self.stroke.miter_limit = from.stroke.miter_limit,
            PropertyId::StrokeDasharray => self.stroke.dashes = from.stroke.dashes.clone(),
            PropertyId::Opacity => self.opacity = from.opacity,
            PropertyId::Transform => self.xform = from.xform,
            PropertyId::Visibility => self.visibility = from.visibility,
            PropertyId::Display => self.display = from.display,
        }
    }

    /// Resolves lengths against the current unit context.
    pub fn to_dots(&mut self) {
        let base = self.units.diagonal();
        self.stroke.width_dots = self.stroke.width.to_dots(&self.units, base).max(0.0);
        self.stroke.dash_dots = self
            .stroke
            .dashes
            .iter()
            .map(|dash| dash.to_dots(&self.units, base).max(0.0))
            .collect();
    }

    pub fn has_fill(&self) -> bool {
        !self.fill.server.is_none()
    }

    pub fn has_stroke(&self) -> bool {
        !self.stroke.server.is_none()
    }

    pub fn has_no_stroke_or_fill(&self) -> bool {
        !self.has_fill() && !self.has_stroke()
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) => {
            *slot = value;
            true
        }
        None => false,
    }
}

fn expected_kind(id: PropertyId) -> &'static str {
    match id {
        PropertyId::Fill | PropertyId::Stroke => "a color, `none` or url reference",
        PropertyId::FillOpacity | PropertyId::StrokeOpacity | PropertyId::Opacity => {
            "a number between 0 and 1"
        }
        PropertyId::StrokeWidth => "a length",
        PropertyId::StrokeDasharray => "a list of lengths",
        PropertyId::StrokeMiterlimit => "a number",
        PropertyId::Transform => "a transform list",
        PropertyId::FillRule
        | PropertyId::StrokeLinecap
        | PropertyId::StrokeLinejoin
        | PropertyId::Visibility
        | PropertyId::Display => "a keyword",
    }
}

fn parse_paint_server(value: &PropValue) -> Option<PaintServer> {
    match value {
        PropValue::String(raw) => PaintServer::parse(raw),
        PropValue::Color(color) => Some(PaintServer::Color(*color)),
        PropValue::Node(id) => Some(PaintServer::Node(*id)),
        PropValue::Number(_) | PropValue::Length(_) | PropValue::Group(_) => None,
    }
}

fn parse_fraction(value: &PropValue) -> Option<f32> {
    match value {
        PropValue::Number(v) => Some((*v as f32).clamp(0.0, 1.0)),
        PropValue::String(raw) => parse_opacity(raw),
        _ => None,
    }
}

fn parse_number(value: &PropValue) -> Option<f32> {
    match value {
        PropValue::Number(v) => Some(*v as f32),
        PropValue::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn parse_length(value: &PropValue) -> Option<Length> {
    match value {
        PropValue::Length(length) => Some(*length),
        PropValue::Number(v) => Some(Length::Px(*v as f32)),
        PropValue::String(raw) => Length::parse(raw),
        _ => None,
    }
}
