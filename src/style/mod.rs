pub mod color;
pub mod computed_style;
pub mod css;
pub mod parsed_style;

pub use color::*;
pub use computed_style::*;
pub use css::*;
pub use parsed_style::*;
