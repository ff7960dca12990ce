use crate::style::Visibility;
use crate::tree::{NodeId, Scene};
use crate::view::base_component::{Marker, PaintContext};
use crate::view::{BBox, Surface};
use glam::Vec2;
use std::sync::OnceLock;

fn trace_render_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("RFGUI_SVG_TRACE_RENDER").is_ok())
}

impl Scene {
    /// Renders the tree under `root` into `surface`, refreshing dirty styles
    /// first. Boxes of every rendered node are recomputed along the way.
    pub fn render(&mut self, root: NodeId, surface: &mut Surface) {
        if !self.contains(root) {
            return;
        }
        self.update_styles();
        let clip = surface.bounds();
        self.render_node(root, surface, clip);
    }

    fn render_node(&mut self, id: NodeId, surface: &mut Surface, clip: BBox) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.kind.renders_in_place() || !node.core.paint.display {
            self.clear_boxes(id);
            return;
        }
        let xform = node.core.paint.xform * node.kind.local_xform();
        let clip_rect = node.kind.clip_rect();
        let mut surface = surface.scoped_xform(xform, node.core.paint.opacity);
        if let Some((min, max)) = clip_rect {
            surface.clip_to(min, max);
        }
        surface.reset_last_render_bbox();

        let own = {
            let node = &self.nodes[id];
            let paint = &node.core.paint;
            if !paint.off && paint.visibility == Visibility::Visible {
                let ctx = PaintContext::new(self, id, &node.core);
                node.kind.paint(&ctx, &mut surface);
            }
            node.kind.own_bbox(&node.core, &surface)
        };

        let offset = surface.window_offset();
        let node = &mut self.nodes[id];
        node.core.compute_bbox(own, clip, offset);
        let children_clip = node.kind.children_bbox(&node.core, clip);
        let encloses = node.kind.encloses_children();
        let children = node.children.clone();

        for child in &children {
            self.render_node(*child, &mut surface, children_clip);
        }

        if encloses {
            let extent = children
                .iter()
                .filter_map(|child| self.nodes.get(*child))
                .filter(|child| child.kind.renders_in_place() && child.core.paint.display)
                .fold(BBox::EMPTY, |acc, child| acc.union(child.core.obj_bbox));
            self.nodes[id].core.extend_bbox(extent, clip, offset);
        }

        if trace_render_enabled() {
            let core = &self.nodes[id].core;
            log::debug!(
                target: "rfgui_svg",
                "[render] {} depth={} bbox={:?} vp={:?}",
                self.path_unique(id),
                surface.depth(),
                core.bbox,
                core.vp_bbox,
            );
        }
    }

    fn clear_boxes(&mut self, id: NodeId) {
        for id in self.subtree(id) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.core.clear_bbox();
            }
        }
    }

    /// Paints the content of `marker` at `pos`, rotated to `angle` (radians)
    /// when the marker orients automatically. Boxes are left untouched.
    pub fn paint_marker(
        &self,
        marker: NodeId,
        pos: Vec2,
        angle: f32,
        stroke_width: f32,
        surface: &mut Surface,
    ) {
        let Some(node) = self.nodes.get(marker) else {
            return;
        };
        let Some(settings) = node.kind_as::<Marker>() else {
            return;
        };
        let placement = settings.placement(pos, angle, stroke_width);
        surface.untracked(|surface| {
            let mut surface = surface.scoped_xform(placement, 1.0);
            for child in &node.children {
                self.paint_subtree(*child, &mut surface);
            }
        });
    }

    fn paint_subtree(&self, id: NodeId, surface: &mut Surface) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if !node.kind.renders_in_place() || !node.core.paint.display {
            return;
        }
        let paint = &node.core.paint;
        let mut surface = surface.scoped_xform(paint.xform * node.kind.local_xform(), paint.opacity);
        if let Some((min, max)) = node.kind.clip_rect() {
            surface.clip_to(min, max);
        }
        if !paint.off && paint.visibility == Visibility::Visible {
            node.kind.paint(&PaintContext::new(self, id, &node.core), &mut surface);
        }
        for child in &node.children {
            self.paint_subtree(*child, &mut surface);
        }
    }

    /// Top-most rendered node under `point` (surface coordinates), as of the
    /// last render pass. Later siblings are searched first.
    pub fn hit_test(&self, root: NodeId, point: Vec2) -> Option<NodeId> {
        let node = self.nodes.get(root)?;
        if !node.kind.renders_in_place() || !node.core.paint.display {
            return None;
        }
        if !node.core.vp_bbox.contains_point(point) {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|child| self.hit_test(*child, point))
            .or(Some(root))
    }
}

#[cfg(test)]
mod tests {
    use crate::style::Color;
    use crate::tree::{Props, Scene};
    use crate::view::base_component::{Defs, Group, Rect, Svg};
    use crate::view::{BBox, Surface, SurfaceOptions};
    use glam::Vec2;

    fn surface() -> Surface {
        Surface::new(SurfaceOptions::sized(100, 100)).expect("surface")
    }

    #[test]
    fn transform_stack_is_balanced() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(100.0, 100.0));
        let g = scene.add_child(root, "g", Group).expect("g");
        scene.set_prop(g, "transform", "translate(10 10) scale(2)");
        let inner = scene.add_child(g, "inner", Group).expect("inner");
        scene.set_prop(inner, "display", "none");
        scene.add_child(g, "r", Rect::new(0.0, 0.0, 5.0, 5.0)).expect("r");

        let mut surface = surface();
        scene.render(root, &mut surface);
        assert_eq!(surface.depth(), 0);
    }

    #[test]
    fn transformed_rect_box_is_in_device_space() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(100.0, 100.0));
        let g = scene.add_child(root, "g", Group).expect("g");
        scene.set_prop(g, "transform", "translate(10 20) scale(2)");
        let r = scene.add_child(g, "r", Rect::new(0.0, 0.0, 5.0, 5.0)).expect("r");
        scene.set_prop(r, "fill", "red");

        let mut surface = surface();
        scene.render(root, &mut surface);
        let core = scene.core(r).expect("r");
        assert_eq!(core.bbox(), BBox::from_xywh(10, 20, 10, 10));
        assert_eq!(scene.core(g).expect("g").obj_bbox(), core.obj_bbox());
        assert_eq!(surface.pixel(15, 25), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn hidden_node_paints_nothing_but_children_do() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(100.0, 100.0));
        let g = scene.add_child(root, "g", Group).expect("g");
        scene.set_prop(g, "visibility", "hidden");
        let hidden = scene.add_child(g, "hidden", Rect::new(0.0, 0.0, 10.0, 10.0)).expect("hidden");
        let shown = scene.add_child(g, "shown", Rect::new(20.0, 0.0, 10.0, 10.0)).expect("shown");
        scene.set_prop(shown, "visibility", "visible");

        let mut surface = surface();
        scene.render(root, &mut surface);
        assert_eq!(surface.pixel(5, 5), Some(Color::transparent()));
        assert_eq!(surface.pixel(25, 5), Some(Color::rgb(0, 0, 0)));
        assert!(scene.core(hidden).expect("hidden").bbox().is_empty());
    }

    #[test]
    fn definitions_are_not_drawn_in_place() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(100.0, 100.0));
        let defs = scene.add_child(root, "", Defs).expect("defs");
        scene.add_child(defs, "r", Rect::new(0.0, 0.0, 50.0, 50.0)).expect("r");

        let mut surface = surface();
        scene.render(root, &mut surface);
        assert_eq!(surface.pixel(10, 10), Some(Color::transparent()));
    }

    #[test]
    fn hit_test_prefers_later_siblings() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(100.0, 100.0));
        let below = scene.add_child(root, "below", Rect::new(0.0, 0.0, 50.0, 50.0)).expect("below");
        let above = scene.add_child(root, "above", Rect::new(25.0, 25.0, 50.0, 50.0)).expect("above");
        scene.set_css(root, Props::new().with("rect", Props::new().with("fill", "blue")));

        let mut surface = surface();
        scene.render(root, &mut surface);
        assert_eq!(scene.hit_test(root, Vec2::new(30.0, 30.0)), Some(above));
        assert_eq!(scene.hit_test(root, Vec2::new(10.0, 10.0)), Some(below));
        assert_eq!(scene.hit_test(root, Vec2::new(90.0, 90.0)), Some(root));
        assert_eq!(scene.hit_test(root, Vec2::new(150.0, 10.0)), None);
    }
}
