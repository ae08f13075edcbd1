use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::scene::SharedScene;
use crate::traits::Viewer;

/// Viewer without a surface. Records attached scenes and collapses
/// redraw requests the way a paint loop would.
#[derive(Debug, Default)]
pub struct HeadlessViewer {
    scenes: RefCell<Vec<SharedScene>>,
    update_requests: Cell<u64>,
    redraw_pending: Cell<bool>,
    frames: Cell<u64>,
}

impl HeadlessViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenes(&self) -> Vec<SharedScene> {
        self.scenes.borrow().iter().map(Rc::clone).collect()
    }

    /// Total `update()` calls so far
    pub fn update_requests(&self) -> u64 {
        self.update_requests.get()
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending.get()
    }

    /// Consume the pending redraw, if any, as one presented frame.
    pub fn take_redraw(&self) -> bool {
        if !self.redraw_pending.replace(false) {
            return false;
        }
        self.frames.set(self.frames.get() + 1);
        true
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames.get()
    }
}

impl Viewer for HeadlessViewer {
    fn add_scene_object(&self, scene: SharedScene) {
        self.scenes.borrow_mut().push(scene);
    }

    fn update(&self) {
        self.update_requests.set(self.update_requests.get() + 1);
        self.redraw_pending.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    #[test]
    fn test_back_to_back_updates_collapse_into_one_frame() {
        let viewer = HeadlessViewer::new();
        viewer.update();
        viewer.update();

        assert_eq!(viewer.update_requests(), 2);
        assert!(viewer.take_redraw());
        assert!(!viewer.take_redraw());
        assert_eq!(viewer.frames_presented(), 1);
    }

    #[test]
    fn test_add_scene_object_shares_the_scene() {
        let viewer = HeadlessViewer::new();
        let scene = Scene::new("scene").into_shared();
        viewer.add_scene_object(scene.clone());

        let attached = viewer.scenes();
        assert_eq!(attached.len(), 1);
        assert!(Rc::ptr_eq(&attached[0], &scene));
    }
}
