mod color;
mod transform;

pub use color::Colour;
pub use transform::Transform;
