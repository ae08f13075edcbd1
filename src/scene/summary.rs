use glam::EulerRot;
use serde::Serialize;

use super::{NodeContent, Scene, SceneNode};

/// Serializable snapshot of a scene, printed by `--dump`.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub generated_at: String,
    pub material_count: usize,
    pub node_count: usize,
    pub root: NodeSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub kind: String,
    pub position: [f32; 3],
    /// XYZ Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_colour: Option<String>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialSummary {
    pub id: usize,
    pub colour: String,
    pub textured: bool,
}

impl SceneSummary {
    pub fn of(scene: &Scene) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            material_count: scene.materials.len(),
            node_count: 1 + scene.root.descendant_count(),
            root: NodeSummary::of(scene, &scene.root),
        }
    }
}

impl NodeSummary {
    fn of(scene: &Scene, node: &SceneNode) -> Self {
        let (x, y, z) = node.transform.rotation.to_euler(EulerRot::XYZ);
        let (kind, material, light_colour, cast_shadow, receive_shadow) = match &node.content {
            NodeContent::Group => ("group".to_string(), None, None, false, false),
            NodeContent::Primitive(p) => (
                p.geometry.kind().to_string(),
                scene.materials.get(p.material).map(|m| MaterialSummary {
                    id: p.material.index(),
                    colour: m.colour.to_string(),
                    textured: m.map.is_some(),
                }),
                None,
                p.cast_shadow,
                p.receive_shadow,
            ),
            NodeContent::PointLight(l) => (
                "point_light".to_string(),
                None,
                Some(l.colour.to_string()),
                false,
                false,
            ),
        };

        Self {
            name: node.name.clone(),
            kind,
            position: node.transform.position.to_array(),
            rotation: [x.to_degrees(), y.to_degrees(), z.to_degrees()],
            scale: node.transform.scale.to_array(),
            material,
            light_colour,
            cast_shadow,
            receive_shadow,
            children: node
                .children()
                .iter()
                .map(|child| NodeSummary::of(scene, child))
                .collect(),
        }
    }
}
