// Integration tests for the variant orchestrator: axis merging, reset
// semantics, and the latest-wins guarantee end to end.

use std::sync::Arc;
use std::time::Duration;

use podium::config::StageConfig;
use podium::stage::VariantStage;

#[path = "common/mod.rs"]
mod common;

use common::{plain_knight, spirit_archer, ScriptedProbe};

const BASE_14: &str = "https://cdn.podium.gg/characters/spiritarcher/models/203014.glb";
const CHROMA_RUBY: &str = "https://cdn.podium.gg/characters/spiritarcher/chromas/203014/203141.png";
const CHROMA_OBSIDIAN: &str =
    "https://cdn.podium.gg/characters/spiritarcher/chromas/203014/203142.png";
const COMPANION_CHROMA_WOLF: &str =
    "https://cdn.podium.gg/characters/spiritarcher/companions/wolf/chromas/203014/203141.png";
const COMPANION_PRIMARY_ALIAS: &str =
    "https://cdn.podium.gg/characters/spiritarcher/companions/spiritwolf/models/203014.glb";
const COMPANION_FALLBACK_ALIAS: &str =
    "https://cdn.podium.gg/characters/spiritarcher/companions/wolf/models/203014.glb";
const FORM_MODEL: &str =
    "https://cdn.podium.gg/characters/spiritarcher/forms/shadow/models/203014.glb";
const LEGACY_MODEL_SELECTED: &str =
    "https://cdn.podium.gg/characters/spiritarcher/legacy/v2/models/203014.glb";
const LEGACY_MODEL_BASE: &str =
    "https://cdn.podium.gg/characters/spiritarcher/legacy/v2/models/203000.glb";

fn stage(probe: ScriptedProbe) -> (VariantStage<ScriptedProbe>, Arc<ScriptedProbe>) {
    common::init_logging();
    let probe = Arc::new(probe);
    let stage = VariantStage::new(&StageConfig::default(), probe.clone());
    (stage, probe)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn empty_stage_has_empty_snapshot() {
    let (stage, probe) = stage(ScriptedProbe::new());
    let snapshot = stage.snapshot();
    assert_eq!(snapshot.model_url, None);
    assert_eq!(probe.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn subject_selection_shows_base_model_without_networking_extra_axes() {
    let (stage, probe) = stage(ScriptedProbe::new().hit(
        "https://cdn.podium.gg/characters/plainknight/models/007000.glb",
    ));
    stage.select_subject(&plain_knight());
    settle().await;

    let snapshot = stage.snapshot();
    assert_eq!(
        snapshot.model_url.as_deref(),
        Some("https://cdn.podium.gg/characters/plainknight/models/007000.glb")
    );
    assert_eq!(snapshot.texture_override, None);
    assert_eq!(snapshot.companion_model_url, None);
    // No variant selected, no companion catalogued: nothing was probed.
    assert_eq!(probe.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn chroma_resolves_for_primary_and_companion() {
    let (stage, _probe) = stage(
        ScriptedProbe::new()
            .hit(CHROMA_RUBY)
            .hit(COMPANION_CHROMA_WOLF)
            .hit(COMPANION_PRIMARY_ALIAS),
    );
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.select_chroma(Some(203141));
    settle().await;

    let snapshot = stage.snapshot();
    assert_eq!(snapshot.model_url.as_deref(), Some(BASE_14));
    assert_eq!(snapshot.texture_override.as_deref(), Some(CHROMA_RUBY));
    // Companion chroma fell through the first alias to "wolf".
    assert_eq!(
        snapshot.companion_texture_override.as_deref(),
        Some(COMPANION_CHROMA_WOLF)
    );
}

#[tokio::test(start_paused = true)]
async fn chroma_exhaustion_is_silent() {
    // Nothing exists upstream: every axis dries up, the base model stays.
    let (stage, _probe) = stage(ScriptedProbe::new());
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.select_chroma(Some(203141));
    settle().await;

    let snapshot = stage.snapshot();
    assert_eq!(snapshot.model_url.as_deref(), Some(BASE_14));
    assert_eq!(snapshot.texture_override, None);
    assert_eq!(snapshot.companion_texture_override, None);
}

#[tokio::test(start_paused = true)]
async fn unknown_chroma_id_clears_the_selection() {
    let (stage, probe) = stage(ScriptedProbe::new());
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.select_chroma(Some(999999));
    settle().await;

    assert_eq!(stage.snapshot().texture_override, None);
    // An unknown id never reaches the network.
    let calls = probe.calls.lock().unwrap();
    assert!(!calls.iter().any(|url| url.contains("chromas")));
}

#[tokio::test(start_paused = true)]
async fn rapid_chroma_switches_keep_only_the_latest() {
    // Ruby's probe is slow and would resolve long after Obsidian's; its
    // completion must be dropped on arrival.
    let (stage, _probe) = stage(
        ScriptedProbe::new()
            .hit(CHROMA_RUBY)
            .delay_ms(CHROMA_RUBY, 500)
            .hit(CHROMA_OBSIDIAN),
    );
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.select_chroma(Some(203141));
    settle().await;
    stage.select_chroma(Some(203142));
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(
        stage.snapshot().texture_override.as_deref(),
        Some(CHROMA_OBSIDIAN)
    );
}

#[tokio::test(start_paused = true)]
async fn companion_aliases_fall_back_in_order() {
    let (stage, probe) = stage(ScriptedProbe::new().hit(COMPANION_FALLBACK_ALIAS));
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    settle().await;

    assert_eq!(
        stage.snapshot().companion_model_url.as_deref(),
        Some(COMPANION_FALLBACK_ALIAS)
    );
    let calls = probe.calls.lock().unwrap();
    let companion_calls: Vec<&String> = calls
        .iter()
        .filter(|url| url.contains("/companions/") && url.ends_with(".glb"))
        .collect();
    assert_eq!(
        companion_calls,
        vec![COMPANION_PRIMARY_ALIAS, COMPANION_FALLBACK_ALIAS]
    );
}

#[tokio::test(start_paused = true)]
async fn alternate_form_overrides_model_and_idle() {
    let (stage, _probe) = stage(ScriptedProbe::new().hit(FORM_MODEL));
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.set_alternate_form(true);
    settle().await;

    let snapshot = stage.snapshot();
    assert_eq!(snapshot.model_url.as_deref(), Some(FORM_MODEL));
    assert_eq!(snapshot.idle_override.as_deref(), Some("idle_shadow"));

    stage.set_alternate_form(false);
    settle().await;
    let snapshot = stage.snapshot();
    assert_eq!(snapshot.model_url.as_deref(), Some(BASE_14));
    assert_eq!(snapshot.idle_override, None);
}

#[tokio::test(start_paused = true)]
async fn historical_version_probes_selected_then_base_skin() {
    // The archived model only exists for the base skin; the secondary
    // probe picks it up.
    let (stage, probe) = stage(ScriptedProbe::new().hit(LEGACY_MODEL_BASE));
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.select_historical_version(1);
    settle().await;

    assert_eq!(
        stage.snapshot().model_url.as_deref(),
        Some(LEGACY_MODEL_BASE)
    );
    let calls = probe.calls.lock().unwrap();
    let legacy_models: Vec<&String> = calls
        .iter()
        .filter(|url| url.contains("/legacy/") && url.ends_with(".glb"))
        .collect();
    assert_eq!(legacy_models, vec![LEGACY_MODEL_SELECTED, LEGACY_MODEL_BASE]);
}

#[tokio::test(start_paused = true)]
async fn skin_switch_resets_every_axis_but_chroma_switch_does_not() {
    let (stage, _probe) = stage(
        ScriptedProbe::new()
            .hit(FORM_MODEL)
            .hit(CHROMA_RUBY)
            .hit(COMPANION_PRIMARY_ALIAS),
    );
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.set_alternate_form(true);
    settle().await;
    assert_eq!(stage.snapshot().model_url.as_deref(), Some(FORM_MODEL));

    // Chroma-only change: the alternate form must survive.
    stage.select_chroma(Some(203141));
    settle().await;
    let snapshot = stage.snapshot();
    assert_eq!(snapshot.model_url.as_deref(), Some(FORM_MODEL));
    assert_eq!(snapshot.texture_override.as_deref(), Some(CHROMA_RUBY));

    // Skin change: form off, chroma cleared, back to the new base model.
    stage.select_skin(0);
    settle().await;
    let snapshot = stage.snapshot();
    assert_eq!(
        snapshot.model_url.as_deref(),
        Some("https://cdn.podium.gg/characters/spiritarcher/models/203000.glb")
    );
    assert_eq!(snapshot.texture_override, None);
    assert_eq!(snapshot.idle_override, None);
}

#[tokio::test(start_paused = true)]
async fn watch_channel_sees_resolutions_land() {
    let (stage, _probe) = stage(ScriptedProbe::new().hit(CHROMA_RUBY));
    let mut receiver = stage.watch();

    stage.select_subject(&spirit_archer());
    stage.select_skin(14);
    stage.select_chroma(Some(203141));
    settle().await;

    // The receiver has been notified at least once since subscription and
    // the final value carries the resolved chroma.
    assert!(receiver.has_changed().unwrap());
    let snapshot = receiver.borrow_and_update().clone();
    assert_eq!(snapshot.texture_override.as_deref(), Some(CHROMA_RUBY));
}

#[tokio::test(start_paused = true)]
async fn splash_candidates_follow_the_selected_skin() {
    let (stage, _probe) = stage(ScriptedProbe::new());
    stage.select_subject(&spirit_archer());
    stage.select_skin(14);

    let urls = stage.splash_candidates();
    assert_eq!(urls.len(), 4);
    assert!(urls[0].ends_with("/splash/203014.jpg"));
    assert!(urls[1].ends_with("/splash/203000.jpg"));
    assert!(urls[2].starts_with("https://mirror.podium.gg/"));
}
