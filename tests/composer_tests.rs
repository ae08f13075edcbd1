use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::FutureExt;
use glam::{Quat, Vec3};
use scene_composer::composer::LIGHT_COLOUR_KEY;
use scene_composer::scene::{Geometry, Material, MaterialLibrary, Primitive, SceneNode};
use scene_composer::traits::{DebugPanel, LoadedMesh, MeshLoadFuture, MeshLoader, Viewer};
use scene_composer::ui::EguiDebugPanel;
use scene_composer::viewer::HeadlessViewer;
use scene_composer::{Colour, MeshLoadError, MeshStatus, SceneComposer, SceneConfig};

type Reply = oneshot::Sender<Result<LoadedMesh, MeshLoadError>>;

/// Loader whose results are delivered by the test
#[derive(Default)]
struct ControlledLoader {
    pending: RefCell<Vec<(String, Reply)>>,
}

impl ControlledLoader {
    fn requested(&self) -> Vec<String> {
        self.pending.borrow().iter().map(|(uri, _)| uri.clone()).collect()
    }

    fn resolve(&self, result: Result<LoadedMesh, MeshLoadError>) {
        let (_, reply) = self.pending.borrow_mut().remove(0);
        reply.send(result).ok();
    }

    fn drop_all(&self) {
        self.pending.borrow_mut().clear();
    }
}

impl MeshLoader for ControlledLoader {
    fn load(&self, uri: &str) -> MeshLoadFuture {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push((uri.to_string(), tx));
        let uri = uri.to_string();
        async move { rx.await.unwrap_or_else(|_| Err(MeshLoadError::Dropped(uri))) }.boxed_local()
    }
}

struct Harness {
    viewer: Rc<HeadlessViewer>,
    loader: ControlledLoader,
    panel: EguiDebugPanel,
    pool: LocalPool,
    composer: SceneComposer,
}

fn composed() -> Harness {
    let viewer = Rc::new(HeadlessViewer::new());
    let loader = ControlledLoader::default();
    let mut panel = EguiDebugPanel::default();
    let pool = LocalPool::new();
    let mut composer = SceneComposer::new(viewer.clone(), SceneConfig::default());
    composer
        .compose(&loader, &pool.spawner(), &mut panel)
        .unwrap();

    Harness {
        viewer,
        loader,
        panel,
        pool,
        composer,
    }
}

fn skyscraper() -> LoadedMesh {
    let mut materials = MaterialLibrary::new();
    let original = materials.add(Material::phong(Colour::from_rgb(90, 90, 90)));
    let mut root = SceneNode::group("gltf_scene");
    root.add(SceneNode::primitive(
        "skyscraper",
        Primitive::new(Geometry::plane(1.0, 4.0), original),
    ));
    LoadedMesh { root, materials }
}

fn child_count(h: &Harness) -> usize {
    h.composer.scene().borrow().root.children().len()
}

#[test]
fn test_planes_form_box_corner() {
    let h = composed();
    let scene = h.composer.scene().borrow();
    let children = scene.root.children();

    let expected = [
        ("floor", Vec3::ZERO, Quat::from_rotation_x(-FRAC_PI_2)),
        ("rear_wall", Vec3::new(0.0, 12.5, -12.5), Quat::IDENTITY),
        ("left_wall", Vec3::new(-12.5, 12.5, 0.0), Quat::from_rotation_y(FRAC_PI_2)),
        ("right_wall", Vec3::new(12.5, 12.5, 0.0), Quat::from_rotation_y(-FRAC_PI_2)),
    ];

    for (node, (name, position, rotation)) in children.iter().zip(expected) {
        assert_eq!(node.name, name);
        assert_eq!(node.transform.position, position, "{} position", name);
        assert!(
            node.transform.rotation.abs_diff_eq(rotation, 1e-6),
            "{} rotation",
            name
        );
        let primitive = node.as_primitive().unwrap();
        assert!(primitive.receive_shadow);
        assert!(!primitive.cast_shadow);
        assert_eq!(primitive.geometry, Geometry::plane(25.0, 25.0));
    }
}

#[test]
fn test_planes_alias_one_material() {
    let h = composed();
    let mut scene = h.composer.scene().borrow_mut();

    let ids: Vec<_> = scene.root.children()[..4]
        .iter()
        .map(|node| node.as_primitive().unwrap().material)
        .collect();
    assert!(ids.iter().all(|&id| id == ids[0]));

    scene.materials.get_mut(ids[0]).unwrap().colour = Colour::BLACK;
    for node in &scene.root.children()[..4] {
        assert_eq!(scene.material_of(node).unwrap().colour, Colour::BLACK);
    }
}

#[test]
fn test_sphere_is_only_teal_primitive() {
    let h = composed();
    let scene = h.composer.scene().borrow();
    let teal = Colour::from_rgb(0x44, 0xaa, 0x88);

    let teal_nodes: Vec<&SceneNode> = scene
        .root
        .children()
        .iter()
        .filter(|node| scene.material_of(node).map(|m| m.colour) == Some(teal))
        .collect();

    assert_eq!(teal_nodes.len(), 1);
    let sphere = teal_nodes[0];
    assert_eq!(sphere.name, "sphere");
    assert_eq!(sphere.transform.position, Vec3::new(0.0, 1.0, 0.0));
    let primitive = sphere.as_primitive().unwrap();
    assert!(primitive.cast_shadow);
    assert!(matches!(primitive.geometry, Geometry::Sphere { radius, .. } if radius == 1.0));
}

#[test]
fn test_compose_wires_viewer_light_and_panel() {
    let h = composed();

    let names: Vec<String> = h
        .composer
        .scene()
        .borrow()
        .root
        .children()
        .iter()
        .map(|node| node.name.clone())
        .collect();
    assert_eq!(
        names,
        ["floor", "rear_wall", "left_wall", "right_wall", "sphere", "point_light"]
    );

    let light_index = h.composer.light_index().unwrap();
    let scene = h.composer.scene().borrow();
    let light_node = scene.root.child(light_index).unwrap();
    assert_eq!(light_node.transform.position, Vec3::new(2.0, 8.0, 5.0));
    assert_eq!(light_node.as_light().unwrap().colour, Colour::WHITE);

    assert_eq!(h.viewer.scenes().len(), 1);
    assert!(Rc::ptr_eq(&h.viewer.scenes()[0], h.composer.scene()));
    assert_eq!(h.viewer.update_requests(), 1);

    assert!(h.panel.is_open());
    assert_eq!(h.panel.controls().len(), 1);
    assert_eq!(h.panel.controls()[0].key(), LIGHT_COLOUR_KEY);
    assert_eq!(h.panel.controls()[0].value(), Colour::WHITE);

    assert_eq!(h.loader.requested(), vec!["static/skyscraper.glb".to_string()]);
}

#[test]
fn test_mesh_appears_only_after_continuation_runs() {
    let mut h = composed();
    assert_eq!(child_count(&h), 6);
    assert!(h.composer.mesh_status().is_pending());

    // Nothing resolves until the loader answers
    h.pool.run_until_stalled();
    assert_eq!(child_count(&h), 6);
    assert_eq!(h.viewer.update_requests(), 1);

    h.loader.resolve(Ok(skyscraper()));
    h.pool.run_until_stalled();

    assert_eq!(child_count(&h), 7);
    assert_eq!(h.viewer.update_requests(), 2);

    let MeshStatus::Loaded { index, .. } = h.composer.mesh_status() else {
        panic!("mesh should be loaded");
    };
    let scene = h.composer.scene().borrow();
    let subtree = scene.root.child(index).unwrap();
    assert_eq!(subtree.transform.position, Vec3::new(4.0, 5.25, -3.0));
    assert_eq!(subtree.transform.scale, Vec3::splat(3.0));

    let tower = subtree.child(0).unwrap();
    let primitive = tower.as_primitive().unwrap();
    assert!(primitive.cast_shadow && primitive.receive_shadow);
    assert_eq!(scene.material_of(tower).unwrap().colour.hex(), 0xcccccc);
}

#[test]
fn test_light_colour_change_touches_only_the_light() {
    let mut h = composed();
    let light_index = h.composer.light_index().unwrap();
    let before = h.composer.scene().borrow().clone();
    let requests = h.viewer.update_requests();

    let new_colour = Colour::from_rgb(0x12, 0x34, 0x56);
    let control = h.panel.control_mut(LIGHT_COLOUR_KEY).unwrap();
    assert!(control.set_value(new_colour));

    assert_eq!(h.composer.light_colour(), Some(new_colour));
    assert_eq!(h.viewer.update_requests(), requests + 1);

    let mut expected = before;
    expected
        .root
        .child_mut(light_index)
        .and_then(SceneNode::as_light_mut)
        .unwrap()
        .colour = new_colour;
    assert_eq!(*h.composer.scene().borrow(), expected);
}

#[test]
fn test_repeated_updates_do_not_duplicate_content() {
    let h = composed();
    let before = h.composer.scene().borrow().clone();

    h.viewer.update();
    h.viewer.update();

    assert_eq!(*h.composer.scene().borrow(), before);
    assert_eq!(h.viewer.scenes().len(), 1);
    assert!(h.viewer.take_redraw());
    assert!(!h.viewer.take_redraw());
}

#[test]
fn test_load_failure_is_reported_and_scene_untouched() {
    let mut h = composed();
    let before = h.composer.scene().borrow().clone();

    h.loader
        .resolve(Err(MeshLoadError::EmptyScene("static/skyscraper.glb".to_string())));
    h.pool.run_until_stalled();

    assert_eq!(*h.composer.scene().borrow(), before);
    match h.composer.mesh_status() {
        MeshStatus::Failed(err) => assert_eq!(err.uri(), "static/skyscraper.glb"),
        other => panic!("unexpected status: {:?}", other),
    }
    assert_eq!(h.viewer.update_requests(), 2);
}

#[test]
fn test_dropped_loader_reports_failure() {
    let mut h = composed();

    h.loader.drop_all();
    h.pool.run_until_stalled();

    assert!(matches!(
        h.composer.mesh_status(),
        MeshStatus::Failed(ref err) if matches!(**err, MeshLoadError::Dropped(_))
    ));
    assert_eq!(child_count(&h), 6);
}

#[test]
fn test_controls_bound_before_light_do_nothing() {
    let viewer = Rc::new(HeadlessViewer::new());
    let mut panel = EguiDebugPanel::default();
    let mut composer = SceneComposer::new(viewer.clone(), SceneConfig::default());

    composer.bind_debug_controls(&mut panel);
    panel
        .control_mut(LIGHT_COLOUR_KEY)
        .unwrap()
        .set_value(Colour::BLACK);

    assert_eq!(composer.light_colour(), None);
    assert_eq!(viewer.update_requests(), 0);
}
