use crate::error::{Diagnostic, Diagnostics, Result, SvgError};
use crate::view::base_component::{NodeCore, SvgElement};
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use smol_str::SmolStr;

mod props;
mod reference;
mod styling;

pub use props::*;
pub use styling::StyleContext;

new_key_type! {
    pub struct NodeId;
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u32 {
        /// Styled at least once and bound to a viewport.
        const NO_LAYOUT = 1 << 0;
        /// Style inputs changed since the last style pass.
        const STYLE_DIRTY = 1 << 1;
    }
}

pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) core: NodeCore,
    pub(crate) kind: Box<dyn SvgElement>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    pub fn kind(&self) -> &dyn SvgElement {
        self.kind.as_ref()
    }

    pub fn kind_as<T: SvgElement>(&self) -> Option<&T> {
        self.kind.as_any().downcast_ref::<T>()
    }

    pub fn kind_as_mut<T: SvgElement>(&mut self) -> Option<&mut T> {
        self.kind.as_any_mut().downcast_mut::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Names registered under one document root. When a name is taken more than
/// once the earliest live registration wins.
#[derive(Debug, Default)]
pub(crate) struct NameRegistry {
    names: FxHashMap<SmolStr, Vec<NodeId>>,
}

impl NameRegistry {
    fn insert(&mut self, name: &SmolStr, id: NodeId) {
        let ids = self.names.entry(name.clone()).or_default();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    fn remove(&mut self, name: &str, id: NodeId) {
        if let Some(ids) = self.names.get_mut(name) {
            ids.retain(|entry| *entry != id);
            if ids.is_empty() {
                self.names.remove(name);
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).and_then(|ids| ids.first().copied())
    }
}

/// Arena holding every node of one or more SVG documents.
#[derive(Default)]
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    roots: Vec<NodeId>,
    registries: SecondaryMap<NodeId, NameRegistry>,
    diagnostics: Diagnostics,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, name: impl Into<SmolStr>, kind: impl SvgElement) -> NodeId {
        let id = self.nodes.insert(Node {
            parent: None,
            children: Vec::new(),
            core: NodeCore::new(name),
            kind: Box::new(kind),
        });
        self.roots.push(id);
        self.register(id);
        id
    }

    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<SmolStr>,
        kind: impl SvgElement,
    ) -> Result<NodeId> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, name, kind)
    }

    /// Inserts at `index` among the parent's children, clamped to the end.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        name: impl Into<SmolStr>,
        kind: impl SvgElement,
    ) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(SvgError::UnknownNode(format!("{parent:?}")));
        }
        let id = self.nodes.insert(Node {
            parent: Some(parent),
            children: Vec::new(),
            core: NodeCore::new(name),
            kind: Box::new(kind),
        });
        let children = &mut self.nodes[parent].children;
        let index = index.min(children.len());
        children.insert(index, id);
        self.register(id);
        Ok(id)
    }

    /// Removes `id` and its whole subtree. Unknown ids are ignored.
    pub fn remove(&mut self, id: NodeId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        let subtree = self.subtree(id);
        // names go first, while every ancestor link is still intact
        for current in &subtree {
            self.unregister(*current);
        }

        match self.parent(id) {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        for current in subtree {
            self.nodes.remove(current);
            self.registries.remove(current);
        }
    }

    /// `id` and all of its descendants, pre-order.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn core(&self, id: NodeId) -> Option<&NodeCore> {
        self.nodes.get(id).map(|node| &node.core)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    pub fn set_prop(&mut self, id: NodeId, key: impl Into<SmolStr>, value: impl Into<PropValue>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.core.props.set(key, value);
            node.core.flags.insert(NodeFlags::STYLE_DIRTY);
        }
    }

    pub fn remove_prop(&mut self, id: NodeId, key: &str) -> Option<PropValue> {
        let node = self.nodes.get_mut(id)?;
        let removed = node.core.props.remove(key);
        node.core.flags.insert(NodeFlags::STYLE_DIRTY);
        removed
    }

    pub fn set_class(&mut self, id: NodeId, class: impl Into<SmolStr>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.core.class = class.into();
            node.core.flags.insert(NodeFlags::STYLE_DIRTY);
        }
    }

    /// Replaces the node's own stylesheet: selector keys mapping to groups
    /// of style properties.
    pub fn set_css(&mut self, id: NodeId, css: Props) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.core.css = css;
            node.core.flags.insert(NodeFlags::STYLE_DIRTY);
        }
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<SmolStr>) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.unregister(id);
        let node = &mut self.nodes[id];
        node.core.name = name.into();
        node.core.flags.insert(NodeFlags::STYLE_DIRTY);
        self.register(id);
    }

    /// Nearest strict ancestor that is a document root, or the node itself
    /// when it is a top-level root.
    pub fn document_root(&self, id: NodeId) -> Option<NodeId> {
        let found = self
            .ancestors(id)
            .find(|ancestor| {
                self.nodes
                    .get(*ancestor)
                    .is_some_and(|node| node.kind.is_document_root())
            });
        match found {
            Some(root) => Some(root),
            None if self.parent(id).is_none() && self.contains(id) => Some(id),
            None => None,
        }
    }

    /// Slash-separated path of names from the top-level root. Unnamed nodes
    /// are written as their type and sibling index.
    pub fn path_unique(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.nodes.get(node_id) else {
                break;
            };
            if node.core.name.is_empty() {
                let index = match node.parent {
                    Some(parent) => self
                        .children(parent)
                        .iter()
                        .position(|child| *child == node_id)
                        .unwrap_or(0),
                    None => self.roots.iter().position(|root| *root == node_id).unwrap_or(0),
                };
                segments.push(format!("{}{}", node.type_name(), index));
            } else {
                segments.push(node.core.name.to_string());
            }
            current = node.parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }

    pub(crate) fn registry(&self, root: NodeId) -> Option<&NameRegistry> {
        self.registries.get(root)
    }

    fn register(&mut self, id: NodeId) {
        let name = self.nodes[id].core.name.clone();
        if name.is_empty() {
            return;
        }
        let Some(root) = self.document_root(id) else {
            return;
        };
        if !self.registries.contains_key(root) {
            self.registries.insert(root, NameRegistry::default());
        }
        if let Some(registry) = self.registries.get_mut(root) {
            registry.insert(&name, id);
        }
    }

    fn unregister(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.core.name.is_empty() {
            return;
        }
        let name = node.core.name.clone();
        if let Some(root) = self.document_root(id) {
            if let Some(registry) = self.registries.get_mut(root) {
                registry.remove(&name, id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::base_component::{Group, Rect, Svg};

    fn document() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(100.0, 100.0));
        (scene, root)
    }

    #[test]
    fn children_keep_insertion_order() {
        let (mut scene, root) = document();
        let a = scene.add_child(root, "a", Group).expect("a");
        let c = scene.add_child(root, "c", Group).expect("c");
        let b = scene.insert_child(root, 1, "b", Group).expect("b");
        assert_eq!(scene.children(root), &[a, b, c]);
        assert_eq!(scene.parent(b), Some(root));
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let (mut scene, root) = document();
        scene.remove(root);
        assert!(matches!(
            scene.add_child(root, "x", Group),
            Err(SvgError::UnknownNode(_))
        ));
    }

    #[test]
    fn remove_drops_subtree_and_names() {
        let (mut scene, root) = document();
        let g = scene.add_child(root, "g", Group).expect("g");
        let leaf = scene.add_child(g, "leaf", Rect::new(0.0, 0.0, 1.0, 1.0)).expect("leaf");
        scene.remove(g);

        assert!(!scene.contains(leaf));
        assert_eq!(scene.children(root), &[] as &[NodeId]);
        assert_eq!(scene.registry(root).and_then(|r| r.get("leaf")), None);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn rename_moves_registry_entry() {
        let (mut scene, root) = document();
        let g = scene.add_child(root, "old", Group).expect("g");
        scene.set_name(g, "new");
        let registry = scene.registry(root).expect("registry");
        assert_eq!(registry.get("old"), None);
        assert_eq!(registry.get("new"), Some(g));
    }

    #[test]
    fn setters_mark_style_dirty() {
        let (mut scene, root) = document();
        let g = scene.add_child(root, "g", Group).expect("g");
        scene.nodes[g].core.flags.remove(NodeFlags::STYLE_DIRTY);
        scene.set_prop(g, "fill", "red");
        assert!(scene.nodes[g].core.flags.contains(NodeFlags::STYLE_DIRTY));
    }

    #[test]
    fn path_uses_type_and_index_for_unnamed_nodes() {
        let (mut scene, root) = document();
        let _first = scene.add_child(root, "first", Group).expect("first");
        let unnamed = scene.add_child(root, "", Group).expect("unnamed");
        let leaf = scene.add_child(unnamed, "leaf", Group).expect("leaf");
        assert_eq!(scene.path_unique(leaf), "/doc/Group1/leaf");
    }

    #[test]
    fn nested_svg_scopes_its_children() {
        let (mut scene, root) = document();
        let inner = scene.add_child(root, "inner", Svg::new(10.0, 10.0)).expect("inner");
        let leaf = scene.add_child(inner, "leaf", Group).expect("leaf");
        assert_eq!(scene.document_root(leaf), Some(inner));
        assert_eq!(scene.document_root(inner), Some(root));
        assert_eq!(scene.document_root(root), Some(root));
    }
}
