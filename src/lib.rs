//! SVG scenegraph: a retained tree of drawable nodes whose paint state is
//! resolved through an inheritance and stylesheet cascade, whose `url(#..)`
//! references are looked up per document, and whose boxes are computed while
//! a depth-first render walk pushes and pops transforms.

pub mod error;
pub mod style;
pub mod tree;
pub mod view;

pub use error::{Diagnostic, Diagnostics, Result, SvgError};
pub use style::{Color, Length, Paint, PaintServer, UnitContext};
pub use tree::{Node, NodeFlags, NodeId, PropValue, Props, Scene, StyleContext};
pub use view::base_component::*;
pub use view::{BBox, Surface, SurfaceOptions};
