use super::{BBox2D, NodeCore, Render2D, Style2D, SvgElement};
use crate::style::UnitContext;
use crate::view::{BBox, Surface};
use glam::{Affine2, Vec2};
use std::any::Any;

/// Document root and rendering viewport. Nested `Svg` nodes open a new
/// name scope and a new unit context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Svg {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub dpi: f32,
    /// Dots per em.
    pub font_size: f32,
}

impl Svg {
    pub fn new(width: f32, height: f32) -> Self {
        let units = UnitContext::default();
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            dpi: units.dpi,
            font_size: units.font_size,
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }
}

impl Style2D for Svg {
    fn is_document_root(&self) -> bool {
        true
    }

    fn unit_context(&self) -> Option<UnitContext> {
        Some(UnitContext::new(
            self.dpi,
            self.font_size,
            Vec2::new(self.width, self.height),
        ))
    }
}

impl Render2D for Svg {
    fn local_xform(&self) -> Affine2 {
        Affine2::from_translation(Vec2::new(self.x, self.y))
    }

    fn clip_rect(&self) -> Option<(Vec2, Vec2)> {
        Some((Vec2::ZERO, Vec2::new(self.width, self.height)))
    }
}

impl BBox2D for Svg {
    fn own_bbox(&self, _core: &NodeCore, surface: &Surface) -> BBox {
        surface.device_bbox(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

impl SvgElement for Svg {
    fn type_name(&self) -> &'static str {
        "Svg"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
