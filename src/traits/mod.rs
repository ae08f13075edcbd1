pub mod debug_panel;
pub mod mesh_loader;
pub mod viewer;

pub use debug_panel::*;
pub use mesh_loader::*;
pub use viewer::*;
