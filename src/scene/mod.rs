mod geometry;
mod light;
mod material;
mod node;
mod summary;

use std::cell::RefCell;
use std::rc::Rc;

pub use geometry::{Geometry, MeshData};
pub use light::PointLight;
pub use material::{Material, MaterialId, MaterialLibrary, Texture, TextureMap};
pub use node::{NodeContent, Primitive, SceneNode};
pub use summary::{NodeSummary, SceneSummary};

/// Scene root together with the materials its primitives refer to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub root: SceneNode,
    pub materials: MaterialLibrary,
}

/// Scene handle shared between the composer, the viewer and load
/// continuations. Only ever touched from the event loop thread.
pub type SharedScene = Rc<RefCell<Scene>>;

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            root: SceneNode::group(name),
            materials: MaterialLibrary::new(),
        }
    }

    pub fn into_shared(self) -> SharedScene {
        Rc::new(RefCell::new(self))
    }

    /// Material of a primitive node, if the node is a primitive.
    pub fn material_of(&self, node: &SceneNode) -> Option<&Material> {
        node.as_primitive()
            .and_then(|p| self.materials.get(p.material))
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary::of(self)
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        SceneNode::group("scene")
    }
}
