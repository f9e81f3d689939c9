//! Asset loader: decodes a glTF scene file into a detached scene graph.
//!
//! Loads run on a background thread and are observed through a
//! [`LoadTask`], which the caller polls from its own loop, awaits, or
//! cancels. Every load ends in an explicit `Result`.
//!
//! # Invariants
//! - A failed or cancelled load never touches the caller's scene.
//! - Asset ids are content hashes: the same bytes give the same id.

mod decode;
mod error;
mod task;

pub use decode::{AssetId, GltfLoader, LoadedAsset, LoaderConfig};
pub use error::LoadError;
pub use task::LoadTask;

pub fn crate_info() -> &'static str {
    "murex-assets v0.1.0"
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::{Path, PathBuf};

    /// Write a one-triangle glTF (external .bin buffer) into `dir`.
    pub fn write_triangle(dir: &Path) -> PathBuf {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let bytes: Vec<u8> = positions
            .iter()
            .flatten()
            .flat_map(|f| f.to_le_bytes())
            .collect();
        std::fs::write(dir.join("tri.bin"), &bytes).unwrap();

        let json = r#"{
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "name": "shell", "mesh": 0, "translation": [0.0, 0.0, 1.0] }],
            "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
            "materials": [],
            "buffers": [{ "uri": "tri.bin", "byteLength": 36 }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
            "accessors": [{
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            }]
        }"#;
        let path = dir.join("tri.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    pub fn write_empty_scene(dir: &Path) -> PathBuf {
        let json = r#"{
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [] }]
        }"#;
        let path = dir.join("empty.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    /// The triangle, with its primitive also declaring a Draco payload that
    /// the file does not require.
    pub fn write_draco_with_fallback(dir: &Path) -> PathBuf {
        let tri = write_triangle(dir);
        let json = std::fs::read_to_string(&tri).unwrap();
        let json = json
            .replace(
                r#""asset": { "version": "2.0" },"#,
                r#""asset": { "version": "2.0" },
            "extensionsUsed": ["KHR_draco_mesh_compression"],"#,
            )
            .replace(
                r#"{ "attributes": { "POSITION": 0 } }"#,
                r#"{
                "attributes": { "POSITION": 0 },
                "extensions": {
                    "KHR_draco_mesh_compression": { "bufferView": 0, "attributes": { "POSITION": 0 } }
                }
            }"#,
            );
        assert!(json.contains("extensionsUsed"));
        let path = dir.join("draco_fallback.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }

    pub fn write_draco_required(dir: &Path) -> PathBuf {
        let json = r#"{
            "asset": { "version": "2.0" },
            "extensionsUsed": ["KHR_draco_mesh_compression"],
            "extensionsRequired": ["KHR_draco_mesh_compression"],
            "scenes": [{ "nodes": [] }]
        }"#;
        let path = dir.join("draco.gltf");
        std::fs::write(&path, json).unwrap();
        path
    }
}
