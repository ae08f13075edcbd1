use crate::scene::SharedScene;

/// Owner of the render root and the paint loop.
pub trait Viewer {
    /// Attach a scene root to the render root
    fn add_scene_object(&self, scene: SharedScene);

    /// Request a re-render. Repeated requests before the next paint
    /// collapse into one.
    fn update(&self);
}
