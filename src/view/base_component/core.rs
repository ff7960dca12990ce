use crate::style::Paint;
use crate::tree::{NodeFlags, NodeId, Props};
use crate::view::BBox;
use glam::IVec2;
use smol_str::SmolStr;

/// State shared by every element kind: identity, style inputs, the resolved
/// paint record and the boxes of the last render pass.
#[derive(Debug, Clone, Default)]
pub struct NodeCore {
    pub(crate) name: SmolStr,
    pub(crate) class: SmolStr,
    pub(crate) props: Props,
    pub(crate) css: Props,
    pub(crate) css_agg: Props,
    pub(crate) paint: Paint,
    pub(crate) bbox: BBox,
    pub(crate) obj_bbox: BBox,
    pub(crate) vp_bbox: BBox,
    pub(crate) win_bbox: BBox,
    pub(crate) flags: NodeFlags,
    /// Document root this node renders into; `None` until the first style pass.
    pub(crate) viewport: Option<NodeId>,
}

impl NodeCore {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            flags: NodeFlags::STYLE_DIRTY,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn css(&self) -> &Props {
        &self.css
    }

    pub fn css_agg(&self) -> &Props {
        &self.css_agg
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn viewport(&self) -> Option<NodeId> {
        self.viewport
    }

    /// Own box from the last render pass.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn obj_bbox(&self) -> BBox {
        self.obj_bbox
    }

    /// Visible part of the object box: clipped by every ancestor.
    pub fn vp_bbox(&self) -> BBox {
        self.vp_bbox
    }

    pub fn win_bbox(&self) -> BBox {
        self.win_bbox
    }

    /// Runs at render time, once the node's transform is on the stack and its
    /// own paint is done. `clip` is the parent's children box.
    pub fn compute_bbox(&mut self, own: BBox, clip: BBox, window_offset: IVec2) {
        self.bbox = own;
        self.obj_bbox = self.bbox;
        self.vp_bbox = clip.intersect(self.obj_bbox);
        self.win_bbox = self.vp_bbox.translate(window_offset);
    }

    /// Empties every box, for nodes the last render pass did not reach.
    pub fn clear_bbox(&mut self) {
        self.bbox = BBox::EMPTY;
        self.obj_bbox = BBox::EMPTY;
        self.vp_bbox = BBox::EMPTY;
        self.win_bbox = BBox::EMPTY;
    }

    /// Grows the object box of a container by its children's boxes and clips
    /// again with the same `clip`.
    pub fn extend_bbox(&mut self, children: BBox, clip: BBox, window_offset: IVec2) {
        self.obj_bbox = self.obj_bbox.union(children);
        self.vp_bbox = clip.intersect(self.obj_bbox);
        self.win_bbox = self.vp_bbox.translate(window_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::NodeCore;
    use crate::view::BBox;
    use glam::IVec2;

    #[test]
    fn viewport_box_is_clipped_by_parent_region() {
        let mut core = NodeCore::new("r");
        let clip = BBox::from_xywh(0, 0, 100, 100);
        core.compute_bbox(BBox::from_xywh(90, 90, 20, 20), clip, IVec2::new(5, 7));

        assert_eq!(core.bbox(), BBox::from_xywh(90, 90, 20, 20));
        assert_eq!(core.obj_bbox(), core.bbox());
        assert_eq!(core.vp_bbox(), BBox::from_xywh(90, 90, 10, 10));
        assert_eq!(core.win_bbox(), BBox::from_xywh(95, 97, 10, 10));
        assert!(clip.contains(core.vp_bbox()));
    }

    #[test]
    fn extension_never_escapes_clip() {
        let mut core = NodeCore::new("g");
        let clip = BBox::from_xywh(10, 10, 50, 50);
        core.compute_bbox(BBox::EMPTY, clip, IVec2::ZERO);
        core.extend_bbox(BBox::from_xywh(0, 0, 30, 30), clip, IVec2::ZERO);

        assert_eq!(core.obj_bbox(), BBox::from_xywh(0, 0, 30, 30));
        assert_eq!(core.vp_bbox(), BBox::from_xywh(10, 10, 20, 20));
    }

    #[test]
    fn clear_empties_all_boxes() {
        let mut core = NodeCore::new("r");
        core.compute_bbox(BBox::from_xywh(1, 1, 5, 5), BBox::from_xywh(0, 0, 10, 10), IVec2::ONE);
        core.clear_bbox();
        assert!(core.bbox().is_empty());
        assert!(core.obj_bbox().is_empty());
        assert!(core.vp_bbox().is_empty());
        assert!(core.win_bbox().is_empty());
    }
}
