/// Name fragments marking a clip as a transition into or out of idle,
/// never the resting loop itself.
pub const TRANSITION_MARKERS: &[&str] = &[
    "idle_in",
    "idle-in",
    "idlein",
    "-to-",
    "_to_",
    "to-idle",
    "to_idle",
];

/// Ranked idle patterns, tried in order. The order was tuned empirically
/// against the live asset corpus; treat it as opaque.
pub const RANKED_IDLE_PATTERNS: &[&str] = &[
    "idle_base",
    "idle-base",
    "idlebase",
    "idle01",
    "idle_01",
    "idle1",
    "idle_1",
    "idle-1",
    "idle_loop",
    "idle-loop",
    "idleloop",
    "idle",
];

pub fn is_transition(name: &str) -> bool {
    let lower = name.to_lowercase();
    TRANSITION_MARKERS.iter().any(|marker| lower.contains(marker))
}

fn ranked_match<'a>(names: &[&'a str]) -> Option<&'a str> {
    for pattern in RANKED_IDLE_PATTERNS {
        if let Some(name) = names.iter().find(|n| n.to_lowercase().contains(pattern)) {
            return Some(name);
        }
    }
    None
}

/// Pick the clip used to pose the model at rest.
///
/// Prefers idle-labeled clips with transition clips excluded; when no clip
/// is idle-labeled at all, the ranked walk runs over every name; failing
/// that, the first authored clip. `None` only when there are no clips, in
/// which case the model displays in its bind pose.
pub fn pick_idle_clip<'a>(names: &[&'a str]) -> Option<&'a str> {
    let idle_labeled: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| n.to_lowercase().contains("idle") && !is_transition(n))
        .collect();

    if !idle_labeled.is_empty() {
        return ranked_match(&idle_labeled);
    }
    ranked_match(names).or_else(|| names.first().copied())
}
