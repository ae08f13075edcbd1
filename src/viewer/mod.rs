mod headless;
mod window;

pub use headless::HeadlessViewer;
pub use window::WindowViewer;

use crate::math::Colour;
use crate::scene::{NodeContent, SharedScene};

/// Colour of the first point light found in `scenes`, depth first.
pub fn first_light_colour(scenes: &[SharedScene]) -> Option<Colour> {
    scenes.iter().find_map(|shared| {
        let scene = shared.borrow();
        let mut found = None;
        scene.root.visit(&mut |node, _| {
            if let (None, NodeContent::PointLight(light)) = (found, &node.content) {
                found = Some(light.colour);
            }
        });
        found
    })
}
