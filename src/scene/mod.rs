pub mod gltf;

use cgmath::{Matrix4, Quaternion, SquareMatrix, Vector3};

/// One node of the loaded scene graph. Transforms are local; world
/// transforms are derived by walking the parent chain.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<usize>,
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl SceneNode {
    pub fn named(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.translation)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Vertex positions of one mesh, attached to a node.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub node: usize,
    pub positions: Vec<Vector3<f32>>,
    pub visible: bool,
}

/// A skeleton joint: a named reference into the node arena.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub node: usize,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
}

/// Animation playback state read by the render surface.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    pub active_clip: Option<usize>,
    pub time: f32,
    pub paused: bool,
}

/// Uniform transform applied to the whole model by the normalizer.
#[derive(Debug, Clone)]
pub struct RootTransform {
    pub scale: f32,
    pub position: Vector3<f32>,
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            position: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

/// A loaded mesh+skeleton+animation bundle of unknown scale and pose.
/// Owned by the render surface; the normalizer reads it and mutates
/// transform state in place.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    pub nodes: Vec<SceneNode>,
    pub meshes: Vec<MeshData>,
    pub joints: Vec<Joint>,
    pub clips: Vec<AnimationClip>,
    pub playback: Playback,
    pub root: RootTransform,
    pub visible: bool,
}

/// Axis-aligned box in model-world space (before the root transform).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    fn around(point: Vector3<f32>) -> Self {
        Self { min: point, max: point }
    }

    fn extend(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) / 2.0
    }
}

impl ModelAsset {
    pub fn node_world(&self, index: usize) -> Matrix4<f32> {
        match self.nodes.get(index) {
            Some(node) => match node.parent {
                Some(parent) => self.node_world(parent) * node.local_matrix(),
                None => node.local_matrix(),
            },
            None => Matrix4::identity(),
        }
    }

    pub fn node_world_position(&self, index: usize) -> Vector3<f32> {
        let world = self.node_world(index);
        (world * Vector3::new(0.0, 0.0, 0.0).extend(1.0)).truncate()
    }

    /// World position of the first joint whose name satisfies `matches`.
    pub fn joint_world_position<F>(&self, matches: F) -> Option<Vector3<f32>>
    where
        F: Fn(&str) -> bool,
    {
        self.joints
            .iter()
            .find(|joint| matches(&joint.name))
            .map(|joint| self.node_world_position(joint.node))
    }

    /// Combined bounding box of all visible meshes, in world space. `None`
    /// when no visible mesh has any vertices.
    pub fn world_aabb(&self) -> Option<Aabb> {
        let mut aabb: Option<Aabb> = None;
        for mesh in self.meshes.iter().filter(|m| m.visible) {
            let world = self.node_world(mesh.node);
            for position in &mesh.positions {
                let point = (world * position.extend(1.0)).truncate();
                match aabb.as_mut() {
                    Some(aabb) => aabb.extend(point),
                    None => aabb = Some(Aabb::around(point)),
                }
            }
        }
        aabb
    }

    pub fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name == name)
    }
}
