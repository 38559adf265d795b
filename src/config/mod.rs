use serde::{Deserialize, Serialize};

/// Host and tuning configuration for the showcase core.
///
/// The embedding app hands this in as a value (usually parsed from its own
/// settings JSON). Every field has a default so a partial document works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Canonical asset host, without a trailing slash.
    pub primary_host: String,
    /// Mirror host, used as a last resort for splash/loading art only.
    pub mirror_host: String,
    /// Per-candidate wait for 2D art loads, in milliseconds.
    pub art_timeout_ms: u64,
    /// Canonical on-screen model height in world units.
    pub target_height: f32,
    /// World-space Y where model feet rest.
    pub baseline_y: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            primary_host: "https://cdn.podium.gg".to_string(),
            mirror_host: "https://mirror.podium.gg".to_string(),
            art_timeout_ms: 4000,
            target_height: 3.4,
            baseline_y: 0.0,
        }
    }
}

impl StageConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: StageConfig = serde_json::from_str(json)?;
        Ok(config)
    }
}
