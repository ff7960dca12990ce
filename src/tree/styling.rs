use super::{NodeFlags, NodeId, PropValue, Props, Scene};
use crate::error::Diagnostic;
use crate::style::{Paint, SelectorTarget, agg_css, style_css};
use smol_str::SmolStr;

/// The node whose properties are being applied, for diagnostics raised while
/// parsing them.
#[derive(Clone, Copy)]
pub struct StyleContext<'a> {
    scene: &'a Scene,
    node: NodeId,
}

impl<'a> StyleContext<'a> {
    pub fn new(scene: &'a Scene, node: NodeId) -> Self {
        Self { scene, node }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn report_property_type(&self, key: &str, expected: &'static str, value: &PropValue) {
        self.scene.diagnostics().report(Diagnostic::PropertyType {
            key: SmolStr::new(key),
            expected,
            found: value.describe(),
            path: self.scene.path_unique(self.node),
        });
    }
}

impl Scene {
    /// Resolves the paint record of `id` from its parent's record, its own
    /// properties and the aggregated stylesheet. The parent must have been
    /// resolved first.
    pub fn resolve_style(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let first_pass = node.core.viewport.is_none();
        let parent = node.parent.and_then(|parent| self.nodes.get(parent));
        let parent_paint = parent.map(|parent| &parent.core.paint);
        let ctx = StyleContext::new(self, id);

        let mut paint = if first_pass {
            Paint::default()
        } else {
            node.core.paint.clone()
        };
        paint.reset_local();
        match parent_paint {
            Some(parent_paint) => paint.copy_style_from(parent_paint),
            None => paint.copy_style_from(&Paint::default()),
        }
        paint.set_style_props(parent_paint, &node.core.props, &ctx);
        if let Some(units) = node.kind.unit_context() {
            paint.units = units;
        }

        let mut css_agg = parent
            .map(|parent| parent.core.css_agg.clone())
            .unwrap_or_else(Props::new);
        agg_css(&mut css_agg, &node.core.css);
        let target = SelectorTarget {
            type_name: node.type_name(),
            class: &node.core.class,
            name: &node.core.name,
        };
        style_css(&mut paint, parent_paint, target, &css_agg, &ctx);

        paint.to_dots();
        paint.off = paint.has_no_stroke_or_fill();

        let viewport = if first_pass { self.document_root(id) } else { None };
        let core = &mut self.nodes[id].core;
        core.paint = paint;
        core.css_agg = css_agg;
        if first_pass {
            core.viewport = viewport;
            core.flags.insert(NodeFlags::NO_LAYOUT);
        }
        core.flags.remove(NodeFlags::STYLE_DIRTY);
    }

    /// Resolves `root` and everything below it, parents before children.
    pub fn style_tree(&mut self, root: NodeId) {
        for id in self.subtree(root) {
            self.resolve_style(id);
        }
    }

    /// Re-resolves every subtree whose top node changed since the last pass.
    pub fn update_styles(&mut self) {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if node.core.flags.contains(NodeFlags::STYLE_DIRTY) {
                self.style_tree(id);
            } else {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
}
