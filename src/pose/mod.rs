pub mod idle;

use cgmath::Vector3;
use serde::Serialize;

use crate::scene::ModelAsset;

/// Floor applied when every measurement tier comes back degenerate, so the
/// scale stays finite.
pub const MIN_MEASURED_HEIGHT: f32 = 0.1;

/// Guard against division blowing up on a sub-floor measurement.
pub const SCALE_EPSILON: f32 = 1e-5;

/// One animation tick, used to settle the skeleton out of its bind pose.
pub const POSE_TICK: f32 = 1.0 / 60.0;

/// Joint-name fragments for the two height reference points, tried in
/// order. Authoring has drifted over the years, so these are substring
/// tables rather than exact names.
const GROUND_JOINT_MARKERS: &[&str] = &["ground_loc", "ground"];
const OVERHEAD_JOINT_MARKERS: &[&str] = &["overhead_loc", "overhead"];

/// Canonical sizing/placement targets, taken from [`crate::config::StageConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeParams {
    pub target_height: f32,
    pub baseline_y: f32,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self {
            target_height: 3.4,
            baseline_y: 0.0,
        }
    }
}

impl NormalizeParams {
    pub fn from_config(config: &crate::config::StageConfig) -> Self {
        Self {
            target_height: config.target_height,
            baseline_y: config.baseline_y,
        }
    }
}

/// The canonical transform derived for one loaded asset. Recomputed when a
/// new asset loads, immutable in between.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPose {
    pub scale: f32,
    pub ground_offset_y: f32,
    pub center_offset_x: f32,
    pub center_offset_z: f32,
    pub idle_clip: Option<String>,
}

/// Normalize a freshly loaded model in place: settle it into its idle
/// pose, fix mirrored sub-node scales, size it to the target height, and
/// plant its feet on the baseline. Only then is it marked visible, so the
/// first presented frame is already posed and scaled.
///
/// Every missing datum (no clips, no reference joints, empty meshes)
/// degrades to the next heuristic tier; there is no error path.
pub fn normalize(
    asset: &mut ModelAsset,
    params: &NormalizeParams,
    preferred_idle: Option<&str>,
) -> NormalizedPose {
    // 1-2. Pick the resting clip and advance one tick so the skeleton
    // leaves its bind pose before anything is measured or shown.
    let idle_clip = select_idle(asset, preferred_idle);
    if let Some(name) = &idle_clip {
        let index = asset.clip_index(name);
        asset.playback.active_clip = index;
        asset.playback.time = POSE_TICK;
        asset.playback.paused = true;
    }

    // 3. Some authored assets mirror geometry with negative scales.
    correct_negative_scales(asset);

    // 4. Height, preferring the reference joints over mesh bounds.
    let measured = measure_height(asset);

    // 5.
    let scale = params.target_height / measured.max(SCALE_EPSILON);

    // 6. Anchor: ground joint when present, else bbox center/floor.
    let anchor = ground_anchor(asset);
    asset.root.scale = scale;
    asset.root.position = Vector3::new(
        -anchor.x * scale,
        params.baseline_y - anchor.y * scale,
        -anchor.z * scale,
    );

    // 7.
    asset.visible = true;

    NormalizedPose {
        scale,
        ground_offset_y: asset.root.position.y,
        center_offset_x: asset.root.position.x,
        center_offset_z: asset.root.position.z,
        idle_clip,
    }
}

fn select_idle(asset: &ModelAsset, preferred: Option<&str>) -> Option<String> {
    if let Some(name) = preferred {
        if asset.clip_index(name).is_some() {
            return Some(name.to_string());
        }
    }
    let names = asset.clip_names();
    idle::pick_idle_clip(&names).map(str::to_string)
}

fn correct_negative_scales(asset: &mut ModelAsset) {
    for node in &mut asset.nodes {
        node.scale.x = node.scale.x.abs();
        node.scale.y = node.scale.y.abs();
        node.scale.z = node.scale.z.abs();
    }
}

fn matches_any<'a>(markers: &'a [&'a str]) -> impl Fn(&str) -> bool + 'a {
    move |name| {
        let lower = name.to_lowercase();
        markers.iter().any(|marker| lower.contains(marker))
    }
}

fn measure_height(asset: &ModelAsset) -> f32 {
    let ground = asset.joint_world_position(matches_any(GROUND_JOINT_MARKERS));
    let overhead = asset.joint_world_position(matches_any(OVERHEAD_JOINT_MARKERS));
    if let (Some(ground), Some(overhead)) = (ground, overhead) {
        let height = (overhead.y - ground.y).abs();
        if height > 0.0 {
            return height;
        }
    }

    if let Some(aabb) = asset.world_aabb() {
        let height = aabb.height();
        if height > 0.0 {
            return height;
        }
    }

    MIN_MEASURED_HEIGHT
}

fn ground_anchor(asset: &ModelAsset) -> Vector3<f32> {
    if let Some(ground) = asset.joint_world_position(matches_any(GROUND_JOINT_MARKERS)) {
        return ground;
    }
    if let Some(aabb) = asset.world_aabb() {
        let center = aabb.center();
        return Vector3::new(center.x, aabb.min.y, center.z);
    }
    Vector3::new(0.0, 0.0, 0.0)
}
