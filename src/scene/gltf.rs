use anyhow::Context;
use cgmath::{Quaternion, Vector3};

use super::{AnimationClip, Joint, MeshData, ModelAsset, SceneNode};

/// Build a [`ModelAsset`] from a parsed glTF document. Only what the
/// normalizer consumes is ingested: node hierarchy with decomposed
/// transforms, vertex positions, skin joint names, and clip names.
pub fn from_document(
    document: &::gltf::Document,
    buffers: &[::gltf::buffer::Data],
) -> anyhow::Result<ModelAsset> {
    let mut nodes: Vec<SceneNode> = Vec::with_capacity(document.nodes().count());
    for node in document.nodes() {
        let (translation, rotation, scale) = node.transform().decomposed();
        nodes.push(SceneNode {
            name: node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index())),
            parent: None,
            translation: Vector3::new(translation[0], translation[1], translation[2]),
            // glTF stores quaternions as xyzw.
            rotation: Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
            scale: Vector3::new(scale[0], scale[1], scale[2]),
        });
    }
    for node in document.nodes() {
        for child in node.children() {
            nodes[child.index()].parent = Some(node.index());
        }
    }

    let mut meshes = Vec::new();
    for node in document.nodes() {
        let Some(mesh) = node.mesh() else { continue };
        for primitive in mesh.primitives() {
            let Some(accessor) = primitive.get(&::gltf::Semantic::Positions) else {
                continue;
            };
            let positions = read_positions(&accessor, buffers)
                .with_context(|| format!("positions of mesh on node {}", node.index()))?;
            if !positions.is_empty() {
                meshes.push(MeshData {
                    node: node.index(),
                    positions,
                    visible: true,
                });
            }
        }
    }

    let mut joints = Vec::new();
    if let Some(skin) = document.skins().next() {
        for node in skin.joints() {
            joints.push(Joint {
                name: node
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("joint_{}", node.index())),
                node: node.index(),
            });
        }
    }

    let mut clips = Vec::new();
    for animation in document.animations() {
        let duration = animation
            .channels()
            .filter_map(|channel| accessor_max_scalar(&channel.sampler().input()))
            .fold(0.0_f32, f32::max);
        clips.push(AnimationClip {
            name: animation
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("clip_{}", animation.index())),
            duration,
        });
    }

    Ok(ModelAsset {
        nodes,
        meshes,
        joints,
        clips,
        ..ModelAsset::default()
    })
}

/// Parse a self-contained GLB byte buffer into a [`ModelAsset`].
pub fn from_glb_bytes(bytes: &[u8]) -> anyhow::Result<ModelAsset> {
    let (document, buffers, _images) =
        ::gltf::import_slice(bytes).context("glb payload did not parse")?;
    from_document(&document, &buffers)
}

fn read_positions(
    accessor: &::gltf::Accessor,
    buffers: &[::gltf::buffer::Data],
) -> anyhow::Result<Vec<Vector3<f32>>> {
    use ::gltf::accessor::{DataType, Dimensions};

    if accessor.data_type() != DataType::F32 || accessor.dimensions() != Dimensions::Vec3 {
        return Ok(Vec::new());
    }
    // Sparse accessors carry no view; nothing to read then.
    let Some(view) = accessor.view() else {
        return Ok(Vec::new());
    };
    let buffer = buffers
        .get(view.buffer().index())
        .map(|data| &data.0)
        .context("position accessor points past the buffer list")?;

    let stride = view.stride().unwrap_or(12);
    let offset = accessor.offset() + view.offset();
    let mut positions = Vec::with_capacity(accessor.count());
    for i in 0..accessor.count() {
        let base = offset + i * stride;
        if base + 12 > buffer.len() {
            break;
        }
        let xyz: [f32; 3] = bytemuck::pod_read_unaligned(&buffer[base..base + 12]);
        positions.push(Vector3::new(xyz[0], xyz[1], xyz[2]));
    }
    Ok(positions)
}

fn accessor_max_scalar(accessor: &::gltf::Accessor) -> Option<f32> {
    let max = accessor.max()?;
    max.as_array()?.first()?.as_f64().map(|v| v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingests_glb_artifact_when_present() {
        let path = std::path::Path::new("test_artifacts/showcase.glb");
        if !path.exists() {
            return;
        }

        let bytes = std::fs::read(path).unwrap();
        let asset = from_glb_bytes(&bytes).unwrap();
        assert!(!asset.nodes.is_empty());
        assert!(asset.world_aabb().is_some());
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(from_glb_bytes(b"definitely not a glb").is_err());
    }
}
