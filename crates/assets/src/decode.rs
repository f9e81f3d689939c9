use glam::{Quat, Vec3};
use murex_common::{Color, Geometry, PhongMaterial, Transform};
use murex_scene::{MeshNode, NodeKind, NodeTree, Scene};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LoadError;
use crate::task::LoadTask;

/// Mesh compression extensions whose decoders live outside this crate.
///
/// Only a *required* extension is fatal. A primitive that merely uses one
/// also carries plain accessors, and those are read instead.
const COMPRESSION_EXTENSIONS: &[&str] = &["KHR_draco_mesh_compression", "EXT_meshopt_compression"];

/// Content-addressed asset ID computed from the file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        AssetId(u64::from_le_bytes(head))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Loader configuration, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Location of the runtime decoder for compressed meshes.
    pub decoder_path: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            decoder_path: PathBuf::from("/draco/gltf/"),
        }
    }
}

/// A decoded asset: its own scene graph, not yet attached anywhere.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub id: AssetId,
    pub path: PathBuf,
    pub scene: Scene,
}

impl LoadedAsset {
    /// Detach the root-level child at `index` from the asset scene.
    pub fn take_child(&mut self, index: usize) -> Result<NodeTree, LoadError> {
        let id = self.scene.child(None, index)?;
        Ok(self.scene.detach(id)?)
    }

    /// Detach the first root-level child. Assets with an empty scene
    /// report `SceneError::NoChildren`.
    pub fn take_first_child(&mut self) -> Result<NodeTree, LoadError> {
        self.take_child(0)
    }

    pub fn vertex_count(&self) -> usize {
        self.scene
            .meshes()
            .iter()
            .map(|(_, mesh, _)| mesh.geometry.vertex_count())
            .sum()
    }
}

/// glTF 2.0 loader (`.gltf` with external or embedded buffers, or `.glb`).
#[derive(Debug, Clone, Default)]
pub struct GltfLoader {
    config: LoaderConfig,
}

impl GltfLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Start decoding `path` on a background thread.
    pub fn load(&self, path: impl AsRef<Path>) -> LoadTask {
        LoadTask::spawn(self.clone(), path.as_ref().to_path_buf())
    }

    /// Decode `path` on the calling thread.
    pub fn decode(&self, path: impl AsRef<Path>) -> Result<LoadedAsset, LoadError> {
        let path = path.as_ref();
        let _span = tracing::info_span!("decode_gltf", path = %path.display()).entered();

        let bytes = std::fs::read(path)?;
        let id = AssetId::from_bytes(&bytes);

        // Checked before validation, which rejects unknown required extensions.
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice_without_validation(&bytes)?;
        self.check_compression(&document)?;
        for extension in document.extensions_used() {
            if COMPRESSION_EXTENSIONS.contains(&extension) {
                tracing::debug!(extension, "compressed primitives present, using fallback accessors");
            }
        }
        let document = gltf::Document::from_json(document.into_json())?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

        let mut builder = SceneBuilder {
            buffers: &buffers,
            materials: BTreeMap::new(),
        };
        let mut scene = Scene::new();
        if let Some(gltf_scene) = document.default_scene().or_else(|| document.scenes().next()) {
            for node in gltf_scene.nodes() {
                let tree = builder.node(&node)?;
                scene.attach(None, tree)?;
            }
        }
        scene.drain_events();

        let asset = LoadedAsset {
            id,
            path: path.to_path_buf(),
            scene,
        };
        tracing::debug!(
            asset = %asset.id,
            nodes = asset.scene.node_count(),
            vertices = asset.vertex_count(),
            "glTF decoded"
        );
        Ok(asset)
    }

    fn check_compression(&self, document: &gltf::Document) -> Result<(), LoadError> {
        match document
            .extensions_required()
            .find(|extension| COMPRESSION_EXTENSIONS.contains(extension))
        {
            Some(extension) => Err(LoadError::CompressedMesh {
                extension: extension.to_string(),
                decoder_path: self.config.decoder_path.clone(),
            }),
            None => Ok(()),
        }
    }
}

struct SceneBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    materials: BTreeMap<Option<usize>, Arc<PhongMaterial>>,
}

impl SceneBuilder<'_> {
    fn node(&mut self, node: &gltf::Node<'_>) -> Result<NodeTree, LoadError> {
        let (t, r, s) = node.transform().decomposed();
        let transform = Transform::from_trs(Vec3::from(t), Quat::from_array(r), Vec3::from(s));
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node_{}", node.index()));

        let mut tree = match node.mesh() {
            Some(mesh) => {
                let mut parts = self.mesh_parts(&mesh)?;
                if parts.len() == 1 {
                    let kind = parts.remove(0);
                    NodeTree::new(name, transform, kind)
                } else {
                    // Multi-primitive meshes become a group of single-primitive meshes.
                    let mut group = NodeTree::new(name.clone(), transform, NodeKind::Group);
                    for (i, kind) in parts.into_iter().enumerate() {
                        group = group.with_child(NodeTree::new(
                            format!("{name}_{i}"),
                            Transform::default(),
                            kind,
                        ));
                    }
                    group
                }
            }
            None => NodeTree::new(name, transform, NodeKind::Group),
        };

        for child in node.children() {
            let child_tree = self.node(&child)?;
            tree.children.push(child_tree);
        }
        Ok(tree)
    }

    fn mesh_parts(&mut self, mesh: &gltf::Mesh<'_>) -> Result<Vec<NodeKind>, LoadError> {
        let mut parts = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    mesh = ?mesh.name(),
                    mode = ?primitive.mode(),
                    "skipping non-triangle primitive"
                );
                continue;
            }
            let buffers = self.buffers;
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| LoadError::MissingPositions {
                    mesh: mesh.name().map(str::to_string),
                })?
                .map(Vec3::from)
                .collect();
            let normals = reader
                .read_normals()
                .map(|n| n.map(Vec3::from).collect::<Vec<_>>());
            let indices = reader.read_indices().map(|i| i.into_u32().collect::<Vec<_>>());
            let geometry = Geometry::new(positions, normals, indices)?;

            let material = self.material(&primitive.material());
            parts.push(NodeKind::Mesh(MeshNode {
                geometry: Arc::new(geometry),
                material,
            }));
        }
        Ok(parts)
    }

    fn material(&mut self, material: &gltf::Material<'_>) -> Arc<PhongMaterial> {
        let key = material.index();
        let entry = self.materials.entry(key).or_insert_with(|| {
            let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
            Arc::new(PhongMaterial::with_color(Color(Vec3::new(r, g, b))))
        });
        Arc::clone(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use murex_scene::SceneError;

    #[test]
    fn asset_id_is_content_addressed() {
        assert_eq!(AssetId::from_bytes(b"shell"), AssetId::from_bytes(b"shell"));
        assert_ne!(AssetId::from_bytes(b"shell"), AssetId::from_bytes(b"conch"));
        assert_eq!(AssetId(0xab).to_string(), "00000000000000ab");
    }

    #[test]
    fn decodes_triangle_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_triangle(dir.path());
        let mut asset = GltfLoader::default().decode(&path).unwrap();

        assert_eq!(asset.scene.node_count(), 1);
        assert_eq!(asset.vertex_count(), 3);
        assert!(asset.scene.events().is_empty());

        let tree = asset.take_first_child().unwrap();
        assert_eq!(tree.name, "shell");
        assert_eq!(tree.transform.position, Vec3::new(0.0, 0.0, 1.0));
        match tree.kind {
            NodeKind::Mesh(mesh) => {
                assert_eq!(mesh.geometry.triangle_count(), 1);
                assert_eq!(mesh.geometry.normals()[0], Vec3::Z);
            }
            other => panic!("expected mesh, got {other:?}"),
        }
    }

    #[test]
    fn empty_scene_has_no_first_child() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_empty_scene(dir.path());
        let mut asset = GltfLoader::default().decode(&path).unwrap();
        let err = asset.take_first_child().unwrap_err();
        assert!(matches!(err, LoadError::Scene(SceneError::NoChildren(None))));
    }

    #[test]
    fn required_draco_reports_decoder_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_draco_required(dir.path());
        let loader = GltfLoader::new(LoaderConfig {
            decoder_path: PathBuf::from("/decoders/draco/"),
        });
        match loader.decode(&path) {
            Err(LoadError::CompressedMesh {
                extension,
                decoder_path,
            }) => {
                assert_eq!(extension, "KHR_draco_mesh_compression");
                assert_eq!(decoder_path, PathBuf::from("/decoders/draco/"));
            }
            other => panic!("expected CompressedMesh, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GltfLoader::default()
            .decode(dir.path().join("absent.gltf"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn bundled_shell_asset_decodes() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../public/Murex_Romosus.gltf");
        let mut asset = GltfLoader::default().decode(&path).unwrap();
        assert_eq!(asset.vertex_count(), 2421);
        let tree = asset.take_first_child().unwrap();
        assert_eq!(tree.name, "Murex_Romosus");
        match tree.kind {
            NodeKind::Mesh(mesh) => assert_eq!(mesh.geometry.triangle_count(), 4820),
            other => panic!("expected mesh, got {other:?}"),
        }
    }

    #[test]
    fn compressed_primitive_with_fallback_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::write_draco_with_fallback(dir.path());
        let asset = GltfLoader::default().decode(&path).unwrap();
        assert_eq!(asset.vertex_count(), 3);
        assert_eq!(asset.scene.meshes().len(), 1);
    }

    #[test]
    fn garbage_is_gltf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.gltf");
        std::fs::write(&path, b"not a gltf").unwrap();
        let err = GltfLoader::default().decode(&path).unwrap_err();
        assert!(matches!(err, LoadError::Gltf(_)));
    }

    #[test]
    fn truncated_glb_is_gltf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.glb");
        let mut glb = b"glTF".to_vec();
        glb.extend_from_slice(&2u32.to_le_bytes());
        std::fs::write(&path, &glb).unwrap();
        let err = GltfLoader::default().decode(&path).unwrap_err();
        assert!(matches!(err, LoadError::Gltf(_)));
    }
}
