use std::sync::Arc;

use crate::math::Colour;

/// RGBA8 texture image, shared between materials through [`TextureMap`].
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub type TextureMap = Arc<Texture>;

/// Opaque Phong material.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub colour: Colour,
    pub map: Option<TextureMap>,
    pub specular: Colour,
    pub shininess: f32,
    pub opacity: f32,
}

impl Material {
    pub const DEFAULT_SPECULAR: Colour = Colour::from_rgb(0x11, 0x11, 0x11);
    pub const DEFAULT_SHININESS: f32 = 30.0;

    pub fn phong(colour: Colour) -> Self {
        Self {
            colour,
            map: None,
            specular: Self::DEFAULT_SPECULAR,
            shininess: Self::DEFAULT_SHININESS,
            opacity: 1.0,
        }
    }

    pub fn with_map(mut self, map: Option<TextureMap>) -> Self {
        self.map = map;
        self
    }
}

/// Handle into a [`MaterialLibrary`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(usize);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn offset(self, by: usize) -> Self {
        Self(self.0 + by)
    }
}

/// Arena owning every material of a scene. Primitives hold ids, so two
/// primitives with the same id alias one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i), m))
    }

    /// Moves every material of `other` into this library and returns the
    /// offset to add to ids that pointed into `other`.
    pub fn absorb(&mut self, other: MaterialLibrary) -> usize {
        let offset = self.materials.len();
        self.materials.extend(other.materials);
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_returns_offset() {
        let mut scene = MaterialLibrary::new();
        scene.add(Material::phong(Colour::WHITE));

        let mut loaded = MaterialLibrary::new();
        let loaded_id = loaded.add(Material::phong(Colour::from_rgb(1, 2, 3)));

        let offset = scene.absorb(loaded);
        let remapped = loaded_id.offset(offset);

        assert_eq!(offset, 1);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.get(remapped).unwrap().colour, Colour::from_rgb(1, 2, 3));
    }

    #[test]
    fn test_phong_defaults() {
        let material = Material::phong(Colour::WHITE);
        assert_eq!(material.specular.hex(), 0x111111);
        assert_eq!(material.shininess, 30.0);
        assert_eq!(material.opacity, 1.0);
        assert!(material.map.is_none());
    }
}
