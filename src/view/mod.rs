pub mod base_component;
pub mod bbox;
mod render;
pub mod viewport;

pub use bbox::*;
pub use viewport::*;
