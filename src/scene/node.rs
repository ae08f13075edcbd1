use glam::Vec3;

use super::geometry::Geometry;
use super::light::PointLight;
use super::material::MaterialId;
use crate::math::Transform;

/// Drawable unit: geometry, material handle and shadow flags.
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub geometry: Geometry,
    pub material: MaterialId,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Primitive {
    pub fn new(geometry: Geometry, material: MaterialId) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeContent {
    Group,
    Primitive(Primitive),
    PointLight(PointLight),
}

/// Node of the scene tree. Children are append-only, so the index returned
/// by [`SceneNode::add`] stays valid for the life of the node.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub content: NodeContent,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            content,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeContent::Group)
    }

    pub fn primitive(name: impl Into<String>, primitive: Primitive) -> Self {
        Self::new(name, NodeContent::Primitive(primitive))
    }

    pub fn point_light(name: impl Into<String>, light: PointLight, position: Vec3) -> Self {
        let mut node = Self::new(name, NodeContent::PointLight(light));
        node.transform.position = position;
        node
    }

    pub fn add(&mut self, child: SceneNode) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&SceneNode> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut SceneNode> {
        self.children.get_mut(index)
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match &self.content {
            NodeContent::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_primitive_mut(&mut self) -> Option<&mut Primitive> {
        match &mut self.content {
            NodeContent::Primitive(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&PointLight> {
        match &self.content {
            NodeContent::PointLight(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut PointLight> {
        match &mut self.content {
            NodeContent::PointLight(l) => Some(l),
            _ => None,
        }
    }

    /// Depth-first pre-order visit of this node and its descendants.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a SceneNode, usize)) {
        self.visit_at(0, f);
    }

    fn visit_at<'a>(&'a self, depth: usize, f: &mut impl FnMut(&'a SceneNode, usize)) {
        f(self, depth);
        for child in &self.children {
            child.visit_at(depth + 1, f);
        }
    }

    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Shifts every material id in the subtree after its library was
    /// absorbed into another.
    pub(crate) fn offset_materials(&mut self, by: usize) {
        self.visit_mut(&mut |node| {
            if let Some(primitive) = node.as_primitive_mut() {
                primitive.material = primitive.material.offset(by);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Colour;
    use crate::scene::{Material, MaterialLibrary};

    #[test]
    fn test_add_returns_stable_index() {
        let mut root = SceneNode::group("root");
        let first = root.add(SceneNode::group("a"));
        let second = root.add(SceneNode::group("b"));

        assert_eq!((first, second), (0, 1));
        assert_eq!(root.child(first).unwrap().name, "a");
        assert_eq!(root.child(second).unwrap().name, "b");
    }

    #[test]
    fn test_visit_is_depth_first() {
        let mut root = SceneNode::group("root");
        let mut branch = SceneNode::group("branch");
        branch.add(SceneNode::group("leaf"));
        root.add(branch);
        root.add(SceneNode::group("sibling"));

        let mut seen = Vec::new();
        root.visit(&mut |node, depth| seen.push((node.name.as_str(), depth)));

        assert_eq!(
            seen,
            vec![("root", 0), ("branch", 1), ("leaf", 2), ("sibling", 1)]
        );
        assert_eq!(root.descendant_count(), 3);
    }

    #[test]
    fn test_offset_materials_touches_only_primitives() {
        let mut library = MaterialLibrary::new();
        let id = library.add(Material::phong(Colour::WHITE));

        let mut root = SceneNode::group("root");
        root.add(SceneNode::primitive(
            "plane",
            Primitive::new(Geometry::plane(1.0, 1.0), id),
        ));
        root.add(SceneNode::point_light("light", PointLight::default(), Vec3::ONE));
        root.offset_materials(5);

        let primitive = root.child(0).and_then(SceneNode::as_primitive).unwrap();
        assert_eq!(primitive.material.index(), 5);
        assert!(root.child(1).unwrap().as_light().is_some());
    }
}
