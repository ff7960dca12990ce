use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use std::cell::RefCell;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SvgError>;

/// Hard failures at the API boundary. Nothing inside a style or render pass
/// produces one of these; those problems are reported as [`Diagnostic`]s.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("surface size {width}x{height} is not drawable")]
    InvalidSurfaceSize { width: u32, height: u32 },
    #[error("node {0} is not part of this scene")]
    UnknownNode(String),
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

/// A non-fatal problem found while styling or painting a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum Diagnostic {
    #[error("could not find element named `{url}` in parents of svg el: {path}")]
    ReferenceNotFound { url: SmolStr, path: String },
    #[error("found element named `{name}` from {path} but it is a {found}, not a {expected}")]
    ReferenceType {
        name: SmolStr,
        expected: &'static str,
        found: &'static str,
        path: String,
    },
    #[error("property `{key}` on {path} should be {expected}, instead is {found}")]
    PropertyType {
        key: SmolStr,
        expected: &'static str,
        found: String,
        path: String,
    },
}

/// Ledger of diagnostics for one scene. A diagnostic is recorded and logged
/// the first time it is reported; repeats from later passes are dropped.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: RefCell<Vec<Diagnostic>>,
    seen: RefCell<FxHashSet<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        if !self.seen.borrow_mut().insert(diagnostic.clone()) {
            return;
        }
        log::warn!(target: "rfgui_svg", "{diagnostic}");
        self.entries.borrow_mut().push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    /// Drains the recorded entries. Diagnostics already seen stay suppressed.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    /// Forgets everything, so the next report of any diagnostic is recorded.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.seen.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, Diagnostics};

    #[test]
    fn report_records_in_order_and_take_drains() {
        let diagnostics = Diagnostics::new();
        diagnostics.report(Diagnostic::ReferenceNotFound {
            url: "a".into(),
            path: "/svg".to_string(),
        });
        diagnostics.report(Diagnostic::ReferenceNotFound {
            url: "b".into(),
            path: "/svg".to_string(),
        });
        assert_eq!(diagnostics.len(), 2);

        let drained = diagnostics.take();
        assert!(diagnostics.is_empty());
        assert!(matches!(&drained[1], Diagnostic::ReferenceNotFound { url, .. } if url == "b"));
    }

    #[test]
    fn repeated_reports_are_recorded_once() {
        let diagnostics = Diagnostics::new();
        let missing = Diagnostic::ReferenceNotFound {
            url: "url(#missing)".into(),
            path: "/svg/r".to_string(),
        };
        for _ in 0..50 {
            diagnostics.report(missing.clone());
        }
        diagnostics.report(Diagnostic::ReferenceNotFound {
            url: "url(#missing)".into(),
            path: "/svg/other".to_string(),
        });
        assert_eq!(diagnostics.len(), 2);

        diagnostics.take();
        diagnostics.report(missing.clone());
        assert!(diagnostics.is_empty());

        diagnostics.clear();
        diagnostics.report(missing);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn reference_not_found_message_names_url_and_path() {
        let message = Diagnostic::ReferenceNotFound {
            url: "arrow".into(),
            path: "/drawing/line1".to_string(),
        }
        .to_string();
        assert!(message.contains("arrow"));
        assert!(message.contains("/drawing/line1"));
    }
}
