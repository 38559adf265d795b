use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;
use tokio::sync::watch;

use crate::candidate::CandidateGenerator;
use crate::catalog::{CatalogSkin, CatalogSubject, ChromaVariant, FormVariant, LegacyVariant};
use crate::config::StageConfig;
use crate::resolve::axis::{AxisResolver, ChangeHook};
use crate::resolve::http::HttpProbe;
use crate::resolve::ExistenceProbe;
use crate::selection::{SelectionContext, SubjectKey, VariantAxis};

/// The one coherent "what to render" view the render surface consumes.
/// Pending and exhausted axes simply contribute no override, so the base
/// asset keeps displaying while chains are in flight or after they dry up.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StageSnapshot {
    /// Active model URL: alternate form > historical version > base skin.
    /// `None` until a subject is selected.
    pub model_url: Option<String>,
    /// Texture override for the primary model: alternate-form texture >
    /// historical-version texture > chroma > none.
    pub texture_override: Option<String>,
    pub companion_model_url: Option<String>,
    pub companion_texture_override: Option<String>,
    /// Idle clip requested by the active variant, if it specifies one.
    pub idle_override: Option<String>,
}

/// Per-subject chroma lookup cache. Owned by the orchestrator, never
/// ambient; `clear` is the injected reset.
#[derive(Default)]
pub struct ChromaCache {
    map: HashMap<u32, Vec<ChromaVariant>>,
}

impl ChromaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chromas_for<F>(&mut self, subject_id: u32, load: F) -> &[ChromaVariant]
    where
        F: FnOnce() -> Vec<ChromaVariant>,
    {
        self.map.entry(subject_id).or_insert_with(load)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[derive(Debug, Clone, Default)]
struct SelectionState {
    subject: Option<CatalogSubject>,
    skin_number: u32,
    chroma_id: Option<u32>,
    alternate_form: bool,
    /// 0 is the live version; i >= 1 selects `historical_versions[i - 1]`.
    legacy_index: usize,
}

impl SelectionState {
    fn skin(&self) -> Option<&CatalogSkin> {
        self.subject.as_ref()?.skin(self.skin_number)
    }

    fn form(&self) -> Option<&FormVariant> {
        if !self.alternate_form {
            return None;
        }
        self.skin()?.alternate_form.as_ref()
    }

    fn legacy(&self) -> Option<&LegacyVariant> {
        if self.legacy_index == 0 {
            return None;
        }
        self.skin()?.historical_versions.get(self.legacy_index - 1)
    }

    fn context(&self, axis: VariantAxis) -> Option<SelectionContext> {
        let subject = self.subject.as_ref()?;
        Some(SelectionContext {
            subject: SubjectKey::of(subject),
            skin_number: self.skin_number,
            axis,
            companion_aliases: self
                .skin()
                .and_then(|skin| skin.companion())
                .map(|companion| companion.aliases.clone()),
        })
    }

    fn idle_override(&self) -> Option<String> {
        if let Some(form) = self.form() {
            if form.idle_override.is_some() {
                return form.idle_override.clone();
            }
        }
        self.legacy().and_then(|legacy| legacy.idle_override.clone())
    }
}

struct StageInner<P> {
    generator: CandidateGenerator,
    selection: Mutex<SelectionState>,
    chroma_cache: Mutex<ChromaCache>,
    chroma: AxisResolver<P>,
    companion_chroma: AxisResolver<P>,
    form: AxisResolver<P>,
    legacy_model: AxisResolver<P>,
    legacy_texture: AxisResolver<P>,
    companion: AxisResolver<P>,
    snapshot: watch::Sender<StageSnapshot>,
}

/// Variant orchestrator: one resolution state machine per axis, merged
/// into a single snapshot published on a watch channel.
///
/// Switching subject or skin resets every axis (chroma cleared, alternate
/// form off, historical version back to live); switching only the chroma
/// preserves the others.
pub struct VariantStage<P> {
    inner: Arc<StageInner<P>>,
}

impl VariantStage<HttpProbe> {
    pub fn with_http(config: &StageConfig) -> Self {
        Self::new(config, Arc::new(HttpProbe::new()))
    }
}

impl<P: ExistenceProbe> VariantStage<P> {
    pub fn new(config: &StageConfig, probe: Arc<P>) -> Self {
        let generator = CandidateGenerator::new(config);
        let inner = Arc::new_cyclic(|weak: &Weak<StageInner<P>>| {
            let hook: ChangeHook = {
                let weak = weak.clone();
                Arc::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.republish();
                    }
                })
            };
            StageInner {
                generator,
                selection: Mutex::new(SelectionState::default()),
                chroma_cache: Mutex::new(ChromaCache::new()),
                chroma: AxisResolver::new("chroma", probe.clone(), hook.clone()),
                companion_chroma: AxisResolver::new("companion-chroma", probe.clone(), hook.clone()),
                form: AxisResolver::new("form", probe.clone(), hook.clone()),
                legacy_model: AxisResolver::new("legacy-model", probe.clone(), hook.clone()),
                legacy_texture: AxisResolver::new("legacy-texture", probe.clone(), hook.clone()),
                companion: AxisResolver::new("companion", probe.clone(), hook),
                snapshot: watch::channel(StageSnapshot::default()).0,
            }
        });
        Self { inner }
    }

    pub fn watch(&self) -> watch::Receiver<StageSnapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> StageSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Select a subject; lands on its first catalogued skin with every
    /// variant axis back at its default.
    pub fn select_subject(&self, subject: &CatalogSubject) {
        {
            let mut selection = self.inner.selection.lock().unwrap();
            selection.skin_number = subject.skins.first().map(|s| s.number).unwrap_or(0);
            selection.subject = Some(subject.clone());
            selection.chroma_id = None;
            selection.alternate_form = false;
            selection.legacy_index = 0;
        }
        self.inner.resubmit_all();
    }

    pub fn select_skin(&self, number: u32) {
        {
            let mut selection = self.inner.selection.lock().unwrap();
            selection.skin_number = number;
            selection.chroma_id = None;
            selection.alternate_form = false;
            selection.legacy_index = 0;
        }
        self.inner.resubmit_all();
    }

    /// Select a chroma (or none). Unknown ids for the current subject are
    /// treated as no selection. Other axes are left untouched.
    pub fn select_chroma(&self, chroma: Option<u32>) {
        {
            let mut selection = self.inner.selection.lock().unwrap();
            let validated = match (chroma, selection.subject.as_ref()) {
                (Some(id), Some(subject)) => {
                    let mut cache = self.inner.chroma_cache.lock().unwrap();
                    let known = cache.chromas_for(subject.id, || subject_chromas(subject));
                    known.iter().any(|c| c.id == id).then_some(id)
                }
                _ => None,
            };
            selection.chroma_id = validated;
        }
        let selection = self.inner.selection.lock().unwrap().clone();
        self.inner.resubmit_chroma_axes(&selection);
        self.inner.republish();
    }

    pub fn set_alternate_form(&self, enabled: bool) {
        {
            let mut selection = self.inner.selection.lock().unwrap();
            selection.alternate_form = enabled;
        }
        let selection = self.inner.selection.lock().unwrap().clone();
        self.inner.resubmit_form(&selection);
        self.inner.republish();
    }

    /// Select a historical version: 0 is the live version, `i >= 1` the
    /// i-th archived one. Out-of-range indexes clamp to the newest archive.
    pub fn select_historical_version(&self, index: usize) {
        {
            let mut selection = self.inner.selection.lock().unwrap();
            let available = selection.skin().map(|s| s.historical_versions.len()).unwrap_or(0);
            selection.legacy_index = index.min(available);
        }
        let selection = self.inner.selection.lock().unwrap().clone();
        self.inner.resubmit_legacy(&selection);
        self.inner.republish();
    }

    pub fn clear_chroma_cache(&self) {
        self.inner.chroma_cache.lock().unwrap().clear();
    }

    /// Candidate chain for the current skin's splash art, mirror last.
    pub fn splash_candidates(&self) -> Vec<String> {
        let selection = self.inner.selection.lock().unwrap();
        selection
            .context(VariantAxis::None)
            .map(|ctx| self.inner.generator.splash_art(&ctx).urls())
            .unwrap_or_default()
    }

    /// Candidate chain for the current skin's loading-screen art.
    pub fn loading_candidates(&self) -> Vec<String> {
        let selection = self.inner.selection.lock().unwrap();
        selection
            .context(VariantAxis::None)
            .map(|ctx| self.inner.generator.loading_art(&ctx).urls())
            .unwrap_or_default()
    }
}

impl<P: ExistenceProbe> StageInner<P> {
    fn resubmit_all(&self) {
        let selection = self.selection.lock().unwrap().clone();

        match selection.context(VariantAxis::None) {
            Some(ctx) if ctx.companion_aliases.is_some() => {
                self.companion.submit(self.generator.companion_model(&ctx));
            }
            _ => {
                self.companion.reset();
            }
        }

        self.resubmit_form(&selection);
        self.resubmit_legacy(&selection);
        self.resubmit_chroma_axes(&selection);
        self.republish();
    }

    fn resubmit_chroma_axes(&self, selection: &SelectionState) {
        let context = selection
            .chroma_id
            .and_then(|id| selection.context(VariantAxis::Chroma(id)));
        match context {
            Some(ctx) => {
                self.chroma.submit(self.generator.chroma_texture(&ctx));
                if ctx.companion_aliases.is_some() {
                    self.companion_chroma
                        .submit(self.generator.companion_chroma_texture(&ctx));
                } else {
                    self.companion_chroma.reset();
                }
            }
            None => {
                self.chroma.reset();
                self.companion_chroma.reset();
            }
        }
    }

    fn resubmit_form(&self, selection: &SelectionState) {
        match (selection.form(), selection.context(VariantAxis::AlternateForm(true))) {
            (Some(form), Some(ctx)) => {
                let list = if form.swaps_model {
                    self.generator.alternate_form_model(&ctx, form)
                } else {
                    self.generator.alternate_form_texture(&ctx, form)
                };
                self.form.submit(list);
            }
            _ => {
                self.form.reset();
            }
        }
    }

    fn resubmit_legacy(&self, selection: &SelectionState) {
        let context = selection.context(VariantAxis::HistoricalVersion(selection.legacy_index));
        match (selection.legacy(), context) {
            (Some(legacy), Some(ctx)) => {
                self.legacy_model
                    .submit(self.generator.historical_model(&ctx, legacy));
                if legacy.has_texture {
                    self.legacy_texture
                        .submit(self.generator.historical_texture(&ctx, legacy));
                } else {
                    self.legacy_texture.reset();
                }
            }
            _ => {
                self.legacy_model.reset();
                self.legacy_texture.reset();
            }
        }
    }

    fn republish(&self) {
        let selection = self.selection.lock().unwrap().clone();
        self.snapshot.send_replace(self.compose(&selection));
    }

    fn compose(&self, selection: &SelectionState) -> StageSnapshot {
        let Some(ctx) = selection.context(VariantAxis::None) else {
            return StageSnapshot::default();
        };
        let base_model = self.generator.model(&ctx).urls().into_iter().next();

        let form = selection.form();
        let form_url = self.form.resolved_url();

        let model_url = match (form, &form_url) {
            (Some(form), Some(url)) if form.swaps_model => Some(url.clone()),
            _ => self.legacy_model.resolved_url().or(base_model),
        };

        let texture_override = match (form, &form_url) {
            (Some(form), Some(url)) if !form.swaps_model => Some(url.clone()),
            _ => self
                .legacy_texture
                .resolved_url()
                .or_else(|| self.chroma.resolved_url()),
        };

        StageSnapshot {
            model_url,
            texture_override,
            companion_model_url: self.companion.resolved_url(),
            companion_texture_override: self.companion_chroma.resolved_url(),
            idle_override: selection.idle_override(),
        }
    }
}

/// Every chroma the subject ships, across all its skins.
fn subject_chromas(subject: &CatalogSubject) -> Vec<ChromaVariant> {
    subject
        .skins
        .iter()
        .flat_map(|skin| skin.chromas.iter().cloned())
        .collect()
}
