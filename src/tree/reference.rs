use super::{NodeId, PropValue, Scene};
use crate::error::Diagnostic;
use crate::view::base_component::{Marker, SvgElement};
use smol_str::SmolStr;

/// Strips `url(...)` and a leading `#`.
fn reference_name(url: &str) -> &str {
    let mut name = url.trim();
    if let Some(inner) = name.strip_prefix("url(").and_then(|rest| rest.strip_suffix(')')) {
        name = inner.trim().trim_matches(|c| c == '\'' || c == '"');
    }
    name.strip_prefix('#').unwrap_or(name)
}

impl Scene {
    /// Looks `name` up in the registry of the document enclosing `id`.
    pub fn find_named_element(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let root = self.document_root(id)?;
        self.registry(root)?
            .get(name)
            .filter(|found| self.contains(*found))
    }

    /// Resolves `name`, `#name` or `url(#name)`. `none` and the empty string
    /// resolve to nothing without a diagnostic.
    pub fn find_svg_url(&self, id: NodeId, url: &str) -> Option<NodeId> {
        let trimmed = url.trim();
        if trimmed.is_empty() || trimmed == "none" {
            return None;
        }
        let name = reference_name(trimmed);
        if name.is_empty() {
            return None;
        }
        let found = self.find_named_element(id, name);
        if found.is_none() {
            self.diagnostics().report(Diagnostic::ReferenceNotFound {
                url: SmolStr::new(trimmed),
                path: self.path_unique(id),
            });
        }
        found
    }

    /// Marker referenced by `key` (or the generic `marker` key) on `id`.
    pub fn marker(&self, id: NodeId, key: &str) -> Option<NodeId> {
        let props = &self.node(id)?.core.props;
        let (key, value) = match props.get(key) {
            Some(value) => (key, value),
            None => ("marker", props.get("marker")?),
        };
        let target = match value {
            PropValue::Node(target) => *target,
            PropValue::String(url) => self.find_svg_url(id, url)?,
            other => {
                self.diagnostics().report(Diagnostic::PropertyType {
                    key: SmolStr::new(key),
                    expected: "marker reference",
                    found: other.describe(),
                    path: self.path_unique(id),
                });
                return None;
            }
        };
        self.expect_kind::<Marker>(id, target, "Marker")
    }

    /// Type-checks a resolved reference, reporting a mismatch.
    pub(crate) fn expect_kind<T: SvgElement>(
        &self,
        from: NodeId,
        target: NodeId,
        expected: &'static str,
    ) -> Option<NodeId> {
        let node = self.node(target)?;
        if node.kind_as::<T>().is_some() {
            return Some(target);
        }
        self.diagnostics().report(Diagnostic::ReferenceType {
            name: node.core.name.clone(),
            expected,
            found: node.type_name(),
            path: self.path_unique(from),
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::reference_name;
    use crate::error::Diagnostic;
    use crate::tree::Scene;
    use crate::view::base_component::{Defs, Group, Line, Marker, Svg};

    #[test]
    fn wrapper_syntax_is_stripped() {
        assert_eq!(reference_name("url(#arrow)"), "arrow");
        assert_eq!(reference_name("url( 'arrow' )"), "arrow");
        assert_eq!(reference_name("#arrow"), "arrow");
        assert_eq!(reference_name("arrow"), "arrow");
    }

    #[test]
    fn none_short_circuits_without_diagnostic() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(10.0, 10.0));
        assert_eq!(scene.find_svg_url(root, "none"), None);
        assert_eq!(scene.find_svg_url(root, "  "), None);
        assert!(scene.diagnostics().is_empty());
    }

    #[test]
    fn miss_reports_url_and_path() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(10.0, 10.0));
        let g = scene.add_child(root, "g", Group).expect("g");
        assert_eq!(scene.find_svg_url(g, "url(#nope)"), None);
        assert_eq!(
            scene.take_diagnostics(),
            vec![Diagnostic::ReferenceNotFound {
                url: "url(#nope)".into(),
                path: "/doc/g".to_string(),
            }]
        );
    }

    #[test]
    fn lookup_stays_inside_the_document() {
        let mut scene = Scene::new();
        let left = scene.add_root("left", Svg::new(10.0, 10.0));
        let right = scene.add_root("right", Svg::new(10.0, 10.0));
        let shared = scene.add_child(left, "shared", Group).expect("shared");
        let asker = scene.add_child(right, "asker", Group).expect("asker");

        assert_eq!(scene.find_svg_url(left, "#shared"), Some(shared));
        assert_eq!(scene.find_svg_url(asker, "#shared"), None);
        assert_eq!(scene.diagnostics().len(), 1);
    }

    #[test]
    fn first_live_registration_wins() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(10.0, 10.0));
        let first = scene.add_child(root, "dup", Group).expect("first");
        let second = scene.add_child(root, "dup", Group).expect("second");
        assert_eq!(scene.find_named_element(root, "dup"), Some(first));
        scene.remove(first);
        assert_eq!(scene.find_named_element(root, "dup"), Some(second));
    }

    #[test]
    fn marker_falls_back_to_generic_key() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(10.0, 10.0));
        let defs = scene.add_child(root, "", Defs).expect("defs");
        let arrow = scene.add_child(defs, "arrow", Marker::default()).expect("arrow");
        let line = scene.add_child(root, "l", Line::new(0.0, 0.0, 5.0, 5.0)).expect("line");
        scene.set_prop(line, "marker", "url(#arrow)");

        assert_eq!(scene.marker(line, "marker-end"), Some(arrow));
        scene.set_prop(line, "marker-start", arrow);
        assert_eq!(scene.marker(line, "marker-start"), Some(arrow));
        assert!(scene.diagnostics().is_empty());
    }

    #[test]
    fn marker_type_mismatches_are_reported() {
        let mut scene = Scene::new();
        let root = scene.add_root("doc", Svg::new(10.0, 10.0));
        let g = scene.add_child(root, "notmarker", Group).expect("g");
        let line = scene.add_child(root, "l", Line::new(0.0, 0.0, 5.0, 5.0)).expect("line");
        scene.set_prop(line, "marker-end", g);
        scene.set_prop(line, "marker-start", 3.0f64);

        assert_eq!(scene.marker(line, "marker-end"), None);
        assert_eq!(scene.marker(line, "marker-start"), None);
        let diagnostics = scene.take_diagnostics();
        assert!(matches!(
            diagnostics[0],
            Diagnostic::ReferenceType { expected: "Marker", found: "Group", .. }
        ));
        assert!(matches!(diagnostics[1], Diagnostic::PropertyType { .. }));
    }
}
