use super::{BBox2D, NodeCore, Render2D, Style2D, SvgElement};
use crate::view::{BBox, Surface};
use std::any::Any;

/// `<g>`: no geometry of its own, covers its children.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Group;

impl Style2D for Group {}

impl Render2D for Group {}

impl BBox2D for Group {
    fn own_bbox(&self, _core: &NodeCore, _surface: &Surface) -> BBox {
        BBox::EMPTY
    }

    // the group's own box is only known after its children, so they are
    // clipped by what the group itself received
    fn children_bbox(&self, _core: &NodeCore, clip: BBox) -> BBox {
        clip
    }

    fn encloses_children(&self) -> bool {
        true
    }
}

impl SvgElement for Group {
    fn type_name(&self) -> &'static str {
        "Group"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
