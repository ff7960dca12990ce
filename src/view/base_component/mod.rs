use crate::error::Diagnostic;
use crate::style::{Paint, PaintServer, UnitContext};
use crate::tree::{NodeId, Scene};
use crate::view::{BBox, Surface};
use glam::{Affine2, Vec2};
use resvg::tiny_skia;
use std::any::Any;

mod core;
mod defs;
mod group;
mod shape;
mod svg;

pub use self::core::*;
pub use defs::*;
pub use group::*;
pub use shape::*;
pub use svg::*;

/// Style-pass capabilities.
pub trait Style2D {
    /// Document roots scope name lookups and establish the unit context.
    fn is_document_root(&self) -> bool {
        false
    }

    fn unit_context(&self) -> Option<UnitContext> {
        None
    }
}

/// Render-pass capabilities.
pub trait Render2D {
    /// Definitions (markers, gradients, `defs`) are only drawn by reference.
    fn renders_in_place(&self) -> bool {
        true
    }

    /// Extra transform applied after the node's `transform` property.
    fn local_xform(&self) -> Affine2 {
        Affine2::IDENTITY
    }

    /// User-space rectangle that clips the node's content, if any.
    fn clip_rect(&self) -> Option<(Vec2, Vec2)> {
        None
    }

    fn paint(&self, _ctx: &PaintContext<'_>, _surface: &mut Surface) {}
}

/// Bounding-box capabilities.
pub trait BBox2D {
    fn own_bbox(&self, _core: &NodeCore, surface: &Surface) -> BBox {
        surface.last_render_bbox()
    }

    /// Clip region handed to the children.
    fn children_bbox(&self, core: &NodeCore, _clip: BBox) -> BBox {
        core.vp_bbox
    }

    /// Containers grow their object box to cover their children.
    fn encloses_children(&self) -> bool {
        false
    }
}

pub trait SvgElement: Style2D + Render2D + BBox2D + Any {
    /// Type tag used by type selectors (compared lower-cased).
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// What a node sees while it paints itself.
pub struct PaintContext<'a> {
    pub scene: &'a Scene,
    pub id: NodeId,
    pub core: &'a NodeCore,
}

impl<'a> PaintContext<'a> {
    pub fn new(scene: &'a Scene, id: NodeId, core: &'a NodeCore) -> Self {
        Self { scene, id, core }
    }

    pub fn paint(&self) -> &Paint {
        &self.core.paint
    }

    /// Builds the tiny-skia paint for a fill or stroke. Gradients are looked
    /// up lazily; unresolvable references yield `None` and nothing is drawn.
    pub fn skia_paint(
        &self,
        server: &PaintServer,
        opacity: f32,
        bounds: tiny_skia::Rect,
        surface: &Surface,
    ) -> Option<tiny_skia::Paint<'static>> {
        let alpha = opacity * surface.current_opacity();
        let shader = match server {
            PaintServer::None => return None,
            PaintServer::Color(color) => {
                tiny_skia::Shader::SolidColor(color.with_opacity(alpha).to_skia())
            }
            PaintServer::Url(url) => {
                let target = self.scene.find_svg_url(self.id, url)?;
                self.gradient_shader(target, bounds, alpha)?
            }
            PaintServer::Node(target) => self.gradient_shader(*target, bounds, alpha)?,
        };
        Some(tiny_skia::Paint {
            shader,
            anti_alias: surface.anti_alias(),
            ..tiny_skia::Paint::default()
        })
    }

    fn gradient_shader(
        &self,
        target: NodeId,
        bounds: tiny_skia::Rect,
        alpha: f32,
    ) -> Option<tiny_skia::Shader<'static>> {
        let node = self.scene.node(target)?;
        if let Some(gradient) = node.kind_as::<LinearGradient>() {
            return gradient.shader(bounds, alpha);
        }
        if let Some(gradient) = node.kind_as::<RadialGradient>() {
            return gradient.shader(bounds, alpha);
        }
        self.scene.diagnostics().report(Diagnostic::ReferenceType {
            name: node.core.name.clone(),
            expected: "gradient",
            found: node.type_name(),
            path: self.scene.path_unique(self.id),
        });
        None
    }
}
