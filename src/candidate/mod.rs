use std::collections::HashSet;

use crate::catalog::{FormVariant, LegacyVariant};
use crate::config::StageConfig;
use crate::selection::{SelectionContext, VariantAxis};

/// One speculative URL that may or may not exist upstream. `slot` is the
/// position the URL held in the template expansion before dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub slot: usize,
}

/// Ordered, deduplicated candidate chain. Duplicates collapse into their
/// first-seen slot so a fallback walk can never stall re-trying an
/// unchanged value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CandidateList {
    entries: Vec<Candidate>,
}

impl CandidateList {
    pub fn from_urls<I>(urls: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();
        for (slot, url) in urls.into_iter().enumerate() {
            if seen.insert(url.clone()) {
                entries.push(Candidate { url, slot });
            }
        }
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|c| c.url.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Builds candidate URL chains from the naming conventions of the asset
/// hosts. Pure and deterministic: same context in, same chain out. A context
/// the templates cannot express (wrong axis, no companion) yields an empty
/// list, which downstream treats as immediate exhaustion.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    primary_host: String,
    mirror_host: String,
}

impl CandidateGenerator {
    pub fn new(config: &StageConfig) -> Self {
        Self {
            primary_host: config.primary_host.trim_end_matches('/').to_string(),
            mirror_host: config.mirror_host.trim_end_matches('/').to_string(),
        }
    }

    /// The skin's own model. A single-entry chain: the base model is assumed
    /// to exist and is what exhaustion of every other axis falls back to.
    pub fn model(&self, ctx: &SelectionContext) -> CandidateList {
        CandidateList::from_urls([format!(
            "{}/characters/{}/models/{:0>6}.glb",
            self.primary_host,
            ctx.subject.alias,
            ctx.skin_key()
        )])
    }

    /// Recolor texture for the primary model. Keyed by chroma id on top of
    /// the skin key.
    pub fn chroma_texture(&self, ctx: &SelectionContext) -> CandidateList {
        let VariantAxis::Chroma(chroma_id) = &ctx.axis else {
            return CandidateList::default();
        };
        CandidateList::from_urls([format!(
            "{}/characters/{}/chromas/{:0>6}/{}.png",
            self.primary_host,
            ctx.subject.alias,
            ctx.skin_key(),
            chroma_id
        )])
    }

    /// Recolor texture for the companion sub-model, one candidate per alias
    /// spelling in priority order.
    pub fn companion_chroma_texture(&self, ctx: &SelectionContext) -> CandidateList {
        let VariantAxis::Chroma(chroma_id) = &ctx.axis else {
            return CandidateList::default();
        };
        let Some(aliases) = &ctx.companion_aliases else {
            return CandidateList::default();
        };
        CandidateList::from_urls(aliases.iter().map(|alias| {
            format!(
                "{}/characters/{}/companions/{}/chromas/{:0>6}/{}.png",
                self.primary_host,
                ctx.subject.alias,
                alias,
                ctx.skin_key(),
                chroma_id
            )
        }))
    }

    /// Companion sub-model, one candidate per alias spelling.
    pub fn companion_model(&self, ctx: &SelectionContext) -> CandidateList {
        let aliases = match (&ctx.axis, &ctx.companion_aliases) {
            (VariantAxis::ExtraModel(aliases), _) => aliases.clone(),
            (_, Some(aliases)) => aliases.clone(),
            _ => return CandidateList::default(),
        };
        CandidateList::from_urls(aliases.iter().map(|alias| {
            format!(
                "{}/characters/{}/companions/{}/models/{:0>6}.glb",
                self.primary_host,
                ctx.subject.alias,
                alias,
                ctx.skin_key()
            )
        }))
    }

    /// Replacement model for an alternate form.
    pub fn alternate_form_model(&self, ctx: &SelectionContext, form: &FormVariant) -> CandidateList {
        CandidateList::from_urls([format!(
            "{}/characters/{}/forms/{}/models/{:0>6}.glb",
            self.primary_host,
            ctx.subject.alias,
            form.label,
            ctx.skin_key()
        )])
    }

    /// Texture override for a texture-only alternate form.
    pub fn alternate_form_texture(&self, ctx: &SelectionContext, form: &FormVariant) -> CandidateList {
        CandidateList::from_urls([format!(
            "{}/characters/{}/forms/{}/textures/{:0>6}.png",
            self.primary_host,
            ctx.subject.alias,
            form.label,
            ctx.skin_key()
        )])
    }

    /// Historical-version model. Probed against the selected skin first and
    /// the base skin second; for the base skin itself both collapse to one
    /// candidate in the dedup.
    pub fn historical_model(&self, ctx: &SelectionContext, legacy: &LegacyVariant) -> CandidateList {
        CandidateList::from_urls([
            format!(
                "{}/characters/{}/legacy/v{}/models/{:0>6}.glb",
                self.primary_host,
                ctx.subject.alias,
                legacy.version,
                ctx.skin_key()
            ),
            format!(
                "{}/characters/{}/legacy/v{}/models/{:0>6}.glb",
                self.primary_host,
                ctx.subject.alias,
                legacy.version,
                ctx.base_skin_key()
            ),
        ])
    }

    /// Historical-version texture, same selected-then-base ordering.
    pub fn historical_texture(&self, ctx: &SelectionContext, legacy: &LegacyVariant) -> CandidateList {
        CandidateList::from_urls([
            format!(
                "{}/characters/{}/legacy/v{}/textures/{:0>6}.png",
                self.primary_host,
                ctx.subject.alias,
                legacy.version,
                ctx.skin_key()
            ),
            format!(
                "{}/characters/{}/legacy/v{}/textures/{:0>6}.png",
                self.primary_host,
                ctx.subject.alias,
                legacy.version,
                ctx.base_skin_key()
            ),
        ])
    }

    /// Splash art chain: skin on the primary host, base skin on the primary
    /// host, then the same pair on the mirror as a last resort.
    pub fn splash_art(&self, ctx: &SelectionContext) -> CandidateList {
        CandidateList::from_urls([
            self.splash_url(&self.primary_host, ctx, ctx.skin_key()),
            self.splash_url(&self.primary_host, ctx, ctx.base_skin_key()),
            self.splash_url(&self.mirror_host, ctx, ctx.skin_key()),
            self.splash_url(&self.mirror_host, ctx, ctx.base_skin_key()),
        ])
    }

    /// Loading-screen art chain, same host ordering as splash art.
    pub fn loading_art(&self, ctx: &SelectionContext) -> CandidateList {
        CandidateList::from_urls([
            self.loading_url(&self.primary_host, ctx, ctx.skin_key()),
            self.loading_url(&self.primary_host, ctx, ctx.base_skin_key()),
            self.loading_url(&self.mirror_host, ctx, ctx.skin_key()),
            self.loading_url(&self.mirror_host, ctx, ctx.base_skin_key()),
        ])
    }

    fn splash_url(&self, host: &str, ctx: &SelectionContext, skin_key: u32) -> String {
        format!(
            "{}/characters/{}/splash/{:0>6}.jpg",
            host, ctx.subject.alias, skin_key
        )
    }

    fn loading_url(&self, host: &str, ctx: &SelectionContext, skin_key: u32) -> String {
        format!(
            "{}/characters/{}/loading/{:0>6}.jpg",
            host, ctx.subject.alias, skin_key
        )
    }
}
