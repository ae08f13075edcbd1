mod debug_panel;
mod outline;

pub use debug_panel::EguiDebugPanel;
pub use outline::show_scene_outline;
