use crate::math::Colour;

/// Omnidirectional light. Its position comes from the owning node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub colour: Colour,
    pub intensity: f32,
    /// Cut-off range; `0.0` means unbounded.
    pub distance: f32,
    pub decay: f32,
}

impl PointLight {
    pub fn new(colour: Colour) -> Self {
        Self {
            colour,
            intensity: 1.0,
            distance: 0.0,
            decay: 2.0,
        }
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new(Colour::WHITE)
    }
}
