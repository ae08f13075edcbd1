use std::sync::Arc;

/// Triangle mesh data imported from a model file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// Plane in the local XY plane, facing +Z.
    Plane {
        width: f32,
        height: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    Mesh(Arc<MeshData>),
}

impl Geometry {
    pub fn plane(width: f32, height: f32) -> Self {
        Geometry::Plane {
            width,
            height,
            width_segments: 1,
            height_segments: 1,
        }
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Geometry::Sphere {
            radius,
            width_segments,
            height_segments,
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Plane {
                width_segments,
                height_segments,
                ..
            }
            | Geometry::Sphere {
                width_segments,
                height_segments,
                ..
            } => (*width_segments as usize + 1) * (*height_segments as usize + 1),
            Geometry::Mesh(mesh) => mesh.positions.len(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            Geometry::Plane {
                width_segments,
                height_segments,
                ..
            } => *width_segments as usize * *height_segments as usize * 2,
            // Pole rows collapse to a single triangle per segment
            Geometry::Sphere {
                width_segments,
                height_segments,
                ..
            } => *width_segments as usize * (*height_segments as usize).saturating_sub(1) * 2,
            Geometry::Mesh(mesh) => mesh.triangle_count(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Plane { .. } => "plane",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Mesh(_) => "mesh",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_counts() {
        let plane = Geometry::plane(25.0, 25.0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = Geometry::sphere(1.0, 20, 20);
        assert_eq!(sphere.vertex_count(), 441);
        assert_eq!(sphere.triangle_count(), 760);
    }

    #[test]
    fn test_mesh_counts_without_indices() {
        let mesh = MeshData {
            positions: vec![[0.0; 3]; 6],
            ..Default::default()
        };
        assert_eq!(Geometry::Mesh(Arc::new(mesh)).triangle_count(), 2);
    }
}
