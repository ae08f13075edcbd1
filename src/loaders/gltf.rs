use std::sync::Arc;

use futures::channel::oneshot;
use futures::FutureExt;
use glam::Mat4;

use crate::error::MeshLoadError;
use crate::math::{Colour, Transform};
use crate::scene::{
    Geometry, Material, MaterialId, MaterialLibrary, MeshData, Primitive, SceneNode, Texture,
    TextureMap,
};
use crate::traits::{LoadedMesh, MeshLoadFuture, MeshLoader};

const FALLBACK_COLOUR: Colour = Colour::from_rgb(0xcc, 0xcc, 0xcc);

/// Loads `.gltf` / `.glb` files into scene subtrees. Parsing runs on a
/// worker thread; the result is handed back through a oneshot channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfMeshLoader;

impl GltfMeshLoader {
    pub fn new() -> Self {
        Self
    }

    /// Imports and converts a file on the calling thread
    pub fn load_blocking(uri: &str) -> Result<LoadedMesh, MeshLoadError> {
        log::info!("Loading glTF file: {}", uri);
        let (document, buffers, images) =
            gltf::import(uri).map_err(|source| MeshLoadError::Import {
                uri: uri.to_string(),
                source,
            })?;
        convert_document(uri, &document, &buffers, &images)
    }

    /// Imports an in-memory `.gltf`/`.glb`; `label` names it in errors.
    /// Without a base path the importer refuses every buffer or image
    /// `uri`, `data:` URIs included, so only self-contained GLB payloads
    /// and URI-free documents load this way.
    pub fn load_slice(label: &str, bytes: &[u8]) -> Result<LoadedMesh, MeshLoadError> {
        let (document, buffers, images) =
            gltf::import_slice(bytes).map_err(|source| MeshLoadError::Import {
                uri: label.to_string(),
                source,
            })?;
        convert_document(label, &document, &buffers, &images)
    }
}

impl MeshLoader for GltfMeshLoader {
    fn load(&self, uri: &str) -> MeshLoadFuture {
        let (tx, rx) = oneshot::channel();
        let worker_uri = uri.to_string();

        let spawned = std::thread::Builder::new()
            .name("gltf-loader".to_string())
            .spawn(move || {
                // Receiver may be gone if the executor was dropped
                let _ = tx.send(Self::load_blocking(&worker_uri));
            })
            .map(drop);

        await_worker(uri.to_string(), spawned, rx)
    }
}

/// Resolves to the worker's result, or to `Worker` when it never started.
fn await_worker(
    uri: String,
    spawned: std::io::Result<()>,
    rx: oneshot::Receiver<Result<LoadedMesh, MeshLoadError>>,
) -> MeshLoadFuture {
    if let Err(source) = spawned {
        log::error!("Failed to start loader thread for {}: {}", uri, source);
        return futures::future::ready(Err(MeshLoadError::Worker { uri, source })).boxed_local();
    }

    async move {
        rx.await
            .unwrap_or_else(|_| Err(MeshLoadError::Dropped(uri)))
    }
    .boxed_local()
}

/// Converts the default scene of a document into a subtree whose root
/// children are the scene's top-level nodes.
fn convert_document(
    uri: &str,
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<LoadedMesh, MeshLoadError> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .filter(|scene| scene.nodes().next().is_some())
        .ok_or_else(|| MeshLoadError::EmptyScene(uri.to_string()))?;

    log::debug!(
        "glTF {}: {} nodes, {} meshes, {} materials, {} images",
        uri,
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count(),
        images.len()
    );

    let textures: Vec<Option<TextureMap>> = document
        .textures()
        .map(|texture| {
            let image = texture.source();
            images
                .get(image.index())
                .and_then(|data| to_rgba_texture(image.name().or(texture.name()), data))
                .map(Arc::new)
        })
        .collect();

    let mut converter = Converter {
        buffers,
        textures,
        materials: MaterialLibrary::new(),
        by_gltf_index: Vec::new(),
        default_material: None,
    };

    for material in document.materials() {
        let converted = converter.convert_material(&material);
        let id = converter.materials.add(converted);
        converter.by_gltf_index.push(id);
    }

    let mut root = SceneNode::group(scene.name().unwrap_or("gltf_scene"));
    for node in scene.nodes() {
        root.add(converter.convert_node(&node));
    }

    Ok(LoadedMesh {
        root,
        materials: converter.materials,
    })
}

struct Converter<'a> {
    buffers: &'a [gltf::buffer::Data],
    textures: Vec<Option<TextureMap>>,
    materials: MaterialLibrary,
    /// Indexed by glTF material index
    by_gltf_index: Vec<MaterialId>,
    default_material: Option<MaterialId>,
}

impl Converter<'_> {
    fn convert_material(&self, material: &gltf::Material) -> Material {
        let pbr = material.pbr_metallic_roughness();
        let [r, g, b, a] = pbr.base_color_factor();
        let map = pbr
            .base_color_texture()
            .and_then(|info| self.textures.get(info.texture().index()).cloned().flatten());

        let mut converted = Material::phong(Colour::from_linear_rgb([r, g, b])).with_map(map);
        converted.opacity = a;
        converted
    }

    fn material_id(&mut self, primitive: &gltf::Primitive) -> MaterialId {
        if let Some(id) = primitive
            .material()
            .index()
            .and_then(|index| self.by_gltf_index.get(index).copied())
        {
            return id;
        }
        match self.default_material {
            Some(id) => id,
            None => {
                let id = self.materials.add(Material::phong(FALLBACK_COLOUR));
                self.default_material = Some(id);
                id
            }
        }
    }

    /// A mesh with one primitive becomes a primitive node; several become a
    /// group of primitive nodes. Node children follow the mesh.
    fn convert_node(&mut self, node: &gltf::Node) -> SceneNode {
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));
        let transform = Transform::from_matrix(&Mat4::from_cols_array_2d(&node.transform().matrix()));

        let primitives: Vec<Primitive> = node
            .mesh()
            .map(|mesh| {
                mesh.primitives()
                    .filter_map(|p| self.convert_primitive(&name, &p))
                    .collect()
            })
            .unwrap_or_default();

        let mut converted = if primitives.len() == 1 {
            let mut primitives = primitives;
            match primitives.pop() {
                Some(primitive) => SceneNode::primitive(name.clone(), primitive),
                None => SceneNode::group(name.clone()),
            }
        } else {
            let mut group = SceneNode::group(name.clone());
            for (i, primitive) in primitives.into_iter().enumerate() {
                group.add(SceneNode::primitive(format!("{}_{}", name, i), primitive));
            }
            group
        };
        converted.transform = transform;

        for child in node.children() {
            converted.add(self.convert_node(&child));
        }
        converted
    }

    fn convert_primitive(&mut self, node_name: &str, primitive: &gltf::Primitive) -> Option<Primitive> {
        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let Some(positions) = reader.read_positions() else {
            log::warn!("Skipping primitive of {}: no positions", node_name);
            return None;
        };

        let mesh = MeshData {
            positions: positions.collect(),
            normals: reader.read_normals().map(|n| n.collect()).unwrap_or_default(),
            uvs: reader
                .read_tex_coords(0)
                .map(|uvs| uvs.into_f32().collect())
                .unwrap_or_default(),
            indices: reader.read_indices().map(|i| i.into_u32().collect()),
        };
        log::debug!(
            "  {}: {} vertices, {} triangles",
            node_name,
            mesh.positions.len(),
            mesh.triangle_count()
        );

        let material = self.material_id(primitive);
        Some(Primitive::new(Geometry::Mesh(Arc::new(mesh)), material))
    }
}

/// Expands 8-bit images to RGBA8. Other formats are skipped.
fn to_rgba_texture(label: Option<&str>, image: &gltf::image::Data) -> Option<Texture> {
    use gltf::image::Format;

    let pixels = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|la| [la[0], la[0], la[0], la[1]])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            log::warn!("Unsupported texture format {:?}; texture ignored", other);
            return None;
        }
    };

    Some(Texture {
        label: label.map(str::to_string),
        width: image.width,
        height: image.height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(format: gltf::image::Format, pixels: Vec<u8>) -> gltf::image::Data {
        gltf::image::Data {
            pixels,
            format,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_rgb_expands_to_opaque_rgba() {
        let texture = to_rgba_texture(
            Some("facade"),
            &image(gltf::image::Format::R8G8B8, vec![1, 2, 3]),
        )
        .unwrap();
        assert_eq!(texture.pixels, vec![1, 2, 3, 255]);
        assert_eq!(texture.label.as_deref(), Some("facade"));
    }

    #[test]
    fn test_grey_alpha_expands_to_rgba() {
        let texture = to_rgba_texture(None, &image(gltf::image::Format::R8G8, vec![9, 7])).unwrap();
        assert_eq!(texture.pixels, vec![9, 9, 9, 7]);
    }

    #[test]
    fn test_worker_start_failure_is_reported() {
        let (_tx, rx) = oneshot::channel();
        let spawned = Err(std::io::Error::new(std::io::ErrorKind::WouldBlock, "thread limit"));

        let err = futures::executor::block_on(await_worker("tower.glb".to_string(), spawned, rx))
            .unwrap_err();

        match err {
            MeshLoadError::Worker { uri, source } => {
                assert_eq!(uri, "tower.glb");
                assert_eq!(source.kind(), std::io::ErrorKind::WouldBlock);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_dropped_worker_reports_dropped() {
        let (tx, rx) = oneshot::channel();
        drop(tx);

        let err = futures::executor::block_on(await_worker("tower.glb".to_string(), Ok(()), rx))
            .unwrap_err();

        assert!(matches!(err, MeshLoadError::Dropped(ref uri) if uri == "tower.glb"));
    }

    #[test]
    fn test_float_formats_are_skipped() {
        let data = image(gltf::image::Format::R32G32B32A32FLOAT, vec![0; 16]);
        assert!(to_rgba_texture(None, &data).is_none());
    }
}
