pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod loaders;
pub mod math;
pub mod scene;
pub mod traits;
pub mod ui;
pub mod viewer;

pub use composer::{attach_loaded_mesh, MeshPlacement, MeshStatus, SceneComposer, StaticNodes};
pub use config::SceneConfig;
pub use error::{ColourError, ComposeError, MeshLoadError};
pub use math::Colour;
