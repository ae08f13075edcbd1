//! Scene assembly: static geometry, the light, the asynchronous mesh load
//! and the debug colour control.

use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::rc::Rc;

use futures::task::{LocalSpawn, LocalSpawnExt};
use glam::Vec3;

use crate::config::SceneConfig;
use crate::error::{ComposeError, MeshLoadError};
use crate::math::Colour;
use crate::scene::{
    Geometry, Material, PointLight, Primitive, Scene, SceneNode, SharedScene,
};
use crate::traits::{DebugPanel, LoadedMesh, MeshLoader, Viewer};

pub const LIGHT_COLOUR_KEY: &str = "Light colour";

/// Child indices of the nodes created by [`SceneComposer::build_static_geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticNodes {
    pub floor: usize,
    pub rear_wall: usize,
    pub left_wall: usize,
    pub right_wall: usize,
    pub sphere: usize,
}

impl StaticNodes {
    pub fn planes(&self) -> [usize; 4] {
        [self.floor, self.rear_wall, self.left_wall, self.right_wall]
    }
}

/// Progress of the external mesh load.
#[derive(Debug, Clone, Default)]
pub enum MeshStatus {
    #[default]
    NotRequested,
    Pending {
        uri: String,
    },
    Loaded {
        uri: String,
        index: usize,
    },
    Failed(Rc<MeshLoadError>),
}

impl MeshStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, MeshStatus::Pending { .. })
    }
}

impl fmt::Display for MeshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshStatus::NotRequested => write!(f, "not requested"),
            MeshStatus::Pending { uri } => write!(f, "loading {}", uri),
            MeshStatus::Loaded { uri, .. } => write!(f, "loaded {}", uri),
            MeshStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Where and how the loaded subtree is placed once it arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshPlacement {
    pub colour: Colour,
    pub offset: Vec3,
    pub scale: f32,
}

impl From<&SceneConfig> for MeshPlacement {
    fn from(config: &SceneConfig) -> Self {
        Self {
            colour: config.mesh_colour,
            offset: Vec3::from_array(config.mesh_offset),
            scale: config.mesh_scale,
        }
    }
}

pub struct SceneComposer {
    config: SceneConfig,
    scene: SharedScene,
    viewer: Rc<dyn Viewer>,
    light: Option<usize>,
    mesh_status: Rc<RefCell<MeshStatus>>,
}

impl SceneComposer {
    pub fn new(viewer: Rc<dyn Viewer>, config: SceneConfig) -> Self {
        Self {
            config,
            scene: Scene::new("scene").into_shared(),
            viewer,
            light: None,
            mesh_status: Rc::new(RefCell::new(MeshStatus::NotRequested)),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    pub fn mesh_status(&self) -> MeshStatus {
        self.mesh_status.borrow().clone()
    }

    pub fn light_index(&self) -> Option<usize> {
        self.light
    }

    pub fn light_colour(&self) -> Option<Colour> {
        let scene = self.scene.borrow();
        self.light
            .and_then(|i| scene.root.child(i))
            .and_then(SceneNode::as_light)
            .map(|light| light.colour)
    }

    /// Runs the full startup sequence and issues the first re-render.
    /// The loaded mesh arrives later, when `spawner`'s executor runs.
    pub fn compose<S>(
        &mut self,
        loader: &dyn MeshLoader,
        spawner: &S,
        panel: &mut dyn DebugPanel,
    ) -> Result<(), ComposeError>
    where
        S: LocalSpawn + ?Sized,
    {
        self.build_static_geometry();
        let uri = self.config.model_uri.clone();
        self.request_external_mesh(loader, spawner, &uri)?;
        self.place_light();
        self.viewer.add_scene_object(Rc::clone(&self.scene));
        self.bind_debug_controls(panel);
        self.viewer.update();

        log::info!(
            "Scene composed: {} nodes, {} materials",
            1 + self.scene.borrow().root.descendant_count(),
            self.scene.borrow().materials.len()
        );
        Ok(())
    }

    /// New opaque Phong material; never shared with earlier calls.
    pub fn create_material(colour: Colour) -> Material {
        Material::phong(colour)
    }

    /// Floor, three walls and the sphere. The four planes share one material.
    pub fn build_static_geometry(&mut self) -> StaticNodes {
        let width = self.config.plane_width;
        let height = self.config.plane_height;

        let mut scene = self.scene.borrow_mut();
        let wall_material = scene
            .materials
            .add(Self::create_material(self.config.wall_colour));
        let plane = Geometry::plane(width, height);

        let wall = |name: &str, position: Vec3| {
            let mut primitive = Primitive::new(plane.clone(), wall_material);
            primitive.receive_shadow = true;
            let mut node = SceneNode::primitive(name, primitive);
            node.transform.position = position;
            node
        };

        let mut floor = wall("floor", Vec3::ZERO);
        floor.transform.rotate_x(-FRAC_PI_2);

        let rear = wall("rear_wall", Vec3::new(0.0, height / 2.0, -height / 2.0));

        let mut left = wall("left_wall", Vec3::new(-width / 2.0, height / 2.0, 0.0));
        left.transform.rotate_y(FRAC_PI_2);

        let mut right = wall("right_wall", Vec3::new(width / 2.0, height / 2.0, 0.0));
        right.transform.rotate_y(-FRAC_PI_2);

        let sphere_material = scene
            .materials
            .add(Self::create_material(self.config.sphere_colour));
        let mut sphere = Primitive::new(
            Geometry::sphere(
                self.config.sphere_radius,
                self.config.sphere_segments,
                self.config.sphere_segments,
            ),
            sphere_material,
        );
        sphere.cast_shadow = true;
        let mut sphere = SceneNode::primitive("sphere", sphere);
        sphere.transform.position.y = self.config.sphere_height;

        let nodes = StaticNodes {
            floor: scene.root.add(floor),
            rear_wall: scene.root.add(rear),
            left_wall: scene.root.add(left),
            right_wall: scene.root.add(right),
            sphere: scene.root.add(sphere),
        };
        log::debug!("Static geometry built: {:?}", nodes);
        nodes
    }

    /// Starts the mesh load and schedules its continuation on `spawner`.
    /// The continuation appends the placed subtree to the scene root, or
    /// records the failure, then requests one re-render.
    pub fn request_external_mesh<S>(
        &mut self,
        loader: &dyn MeshLoader,
        spawner: &S,
        uri: &str,
    ) -> Result<(), ComposeError>
    where
        S: LocalSpawn + ?Sized,
    {
        log::info!("Requesting mesh: {}", uri);

        let load = loader.load(uri);
        let scene = Rc::clone(&self.scene);
        let viewer = Rc::clone(&self.viewer);
        let status = Rc::clone(&self.mesh_status);
        let placement = MeshPlacement::from(&self.config);
        let uri = uri.to_string();

        *self.mesh_status.borrow_mut() = MeshStatus::Pending { uri: uri.clone() };

        spawner.spawn_local(async move {
            let attached = load
                .await
                .and_then(|mesh| attach_loaded_mesh(&mut scene.borrow_mut(), mesh, &placement, &uri));

            let next = match attached {
                Ok(index) => {
                    log::info!("Mesh attached: {} (root child {})", uri, index);
                    MeshStatus::Loaded { uri, index }
                }
                Err(err) => {
                    log::error!("Mesh load failed: {}", err);
                    MeshStatus::Failed(Rc::new(err))
                }
            };
            *status.borrow_mut() = next;
            viewer.update();
        })?;

        Ok(())
    }

    pub fn place_light(&mut self) -> usize {
        let light = SceneNode::point_light(
            "point_light",
            PointLight::new(self.config.light_colour),
            Vec3::from_array(self.config.light_position),
        );
        let index = self.scene.borrow_mut().root.add(light);
        self.light = Some(index);
        index
    }

    /// Binds the light colour to the panel. Each change writes the light
    /// colour and requests one re-render.
    pub fn bind_debug_controls(&mut self, panel: &mut dyn DebugPanel) {
        let initial = self.light_colour().unwrap_or(self.config.light_colour);
        let scene = Rc::clone(&self.scene);
        let viewer = Rc::clone(&self.viewer);
        let light = self.light;

        panel
            .add_color(LIGHT_COLOUR_KEY, initial)
            .on_change(move |colour| {
                if !set_light_colour(&scene, light, colour) {
                    log::warn!("Light colour changed before a light was placed");
                    return;
                }
                log::debug!("Light colour set to {}", colour);
                viewer.update();
            });

        if self.config.open_panel {
            panel.open();
        }
    }
}

fn set_light_colour(scene: &SharedScene, light: Option<usize>, colour: Colour) -> bool {
    let mut scene = scene.borrow_mut();
    match light
        .and_then(|i| scene.root.child_mut(i))
        .and_then(SceneNode::as_light_mut)
    {
        Some(light) => {
            light.colour = colour;
            true
        }
        None => false,
    }
}

/// Re-materials the first child of a loaded subtree, places the subtree
/// and appends it to the scene root. Returns the new root child index.
/// The scene is left untouched on error.
pub fn attach_loaded_mesh(
    scene: &mut Scene,
    mesh: LoadedMesh,
    placement: &MeshPlacement,
    uri: &str,
) -> Result<usize, MeshLoadError> {
    let LoadedMesh {
        mut root,
        mut materials,
    } = mesh;

    let first = root
        .child_mut(0)
        .and_then(SceneNode::as_primitive_mut)
        .ok_or_else(|| MeshLoadError::MissingPrimitive(uri.to_string()))?;

    let map = materials.get(first.material).and_then(|m| m.map.clone());
    first.material =
        materials.add(SceneComposer::create_material(placement.colour).with_map(map));
    first.cast_shadow = true;
    first.receive_shadow = true;

    let offset = scene.materials.absorb(materials);
    root.offset_materials(offset);

    root.transform.position = placement.offset;
    root.transform.set_uniform_scale(placement.scale);

    Ok(scene.root.add(root))
}
