use crate::composer::MeshStatus;
use crate::scene::{NodeContent, Scene, SceneNode, SharedScene};

/// Scene tree and mesh-load status window
pub fn show_scene_outline(ctx: &egui::Context, scenes: &[SharedScene], status: &MeshStatus) {
    egui::Window::new("Scene")
        .title_bar(true)
        .resizable(true)
        .default_pos(egui::pos2(10.0, 10.0))
        .default_width(280.0)
        .show(ctx, |ui| {
            let colour = match status {
                MeshStatus::Loaded { .. } => egui::Color32::from_rgb(100, 200, 100),
                MeshStatus::Failed(_) => egui::Color32::from_rgb(255, 100, 100),
                _ => egui::Color32::GRAY,
            };
            ui.label(
                egui::RichText::new(format!("Mesh: {}", status))
                    .size(14.0)
                    .color(colour),
            );

            ui.add_space(5.0);
            ui.separator();
            ui.add_space(5.0);

            for (i, shared) in scenes.iter().enumerate() {
                let scene = shared.borrow();
                node_ui(ui, &scene, &scene.root, &i.to_string());
            }
        });
}

fn node_ui(ui: &mut egui::Ui, scene: &Scene, node: &SceneNode, path: &str) {
    let label = describe(scene, node);
    if node.children().is_empty() {
        ui.monospace(label);
        return;
    }

    egui::CollapsingHeader::new(label)
        .id_salt(path)
        .default_open(!path.contains('/'))
        .show(ui, |ui| {
            for (i, child) in node.children().iter().enumerate() {
                node_ui(ui, scene, child, &format!("{}/{}", path, i));
            }
        });
}

fn describe(scene: &Scene, node: &SceneNode) -> String {
    let p = node.transform.position;
    let kind = match &node.content {
        NodeContent::Group => "group".to_string(),
        NodeContent::Primitive(primitive) => {
            let colour = scene
                .materials
                .get(primitive.material)
                .map(|m| m.colour.to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("{} {}", primitive.geometry.kind(), colour)
        }
        NodeContent::PointLight(light) => format!("light {}", light.colour),
    };
    format!("{} [{}] ({:.2}, {:.2}, {:.2})", node.name, kind, p.x, p.y, p.z)
}
