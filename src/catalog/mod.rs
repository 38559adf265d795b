use serde::{Deserialize, Serialize};

/// One subject (character) in the upstream catalog.
///
/// The catalog itself is fetched by the surrounding app; this core only
/// deserializes what it is handed. Upstream adds fields over time, so the
/// shapes here ignore anything unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSubject {
    pub id: u32,
    /// Numeric key used in asset URL arithmetic (skin key = key * 1000 + n).
    pub numeric_key: u32,
    /// URL path segment for this subject.
    pub alias: String,
    pub name: String,
    #[serde(default)]
    pub skins: Vec<CatalogSkin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSkin {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub chromas: Vec<ChromaVariant>,
    #[serde(default)]
    pub alternate_form: Option<FormVariant>,
    #[serde(default)]
    pub historical_versions: Vec<LegacyVariant>,
    #[serde(default)]
    pub companions: Vec<CompanionVariant>,
}

/// A recolor of the skin's texture. Model geometry is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromaVariant {
    pub id: u32,
    #[serde(default)]
    pub name: String,
}

/// An alternate form the skin can toggle into (transformation, mega form).
/// Some forms ship a whole replacement model, others only a texture swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormVariant {
    /// URL path segment for the form.
    pub label: String,
    /// True when the form replaces the model; false for texture-only forms.
    pub swaps_model: bool,
    #[serde(default)]
    pub idle_override: Option<String>,
}

/// A historical version of the skin kept around for the archive view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyVariant {
    pub version: u32,
    #[serde(default)]
    pub has_texture: bool,
    #[serde(default)]
    pub idle_override: Option<String>,
}

/// A companion sub-model displayed next to the primary (pet, mount, twin).
/// Companions have accumulated alias spellings over the years; candidates
/// are probed in the listed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionVariant {
    pub aliases: Vec<String>,
}

impl CatalogSubject {
    pub fn skin(&self, number: u32) -> Option<&CatalogSkin> {
        self.skins.iter().find(|s| s.number == number)
    }
}

impl CatalogSkin {
    /// The first companion listed for the skin, if any. The showcase renders
    /// at most one companion at a time.
    pub fn companion(&self) -> Option<&CompanionVariant> {
        self.companions.first()
    }
}

/// Parse a catalog document (a JSON array of subjects).
pub fn parse_catalog(json: &str) -> anyhow::Result<Vec<CatalogSubject>> {
    let subjects: Vec<CatalogSubject> = serde_json::from_str(json)?;
    Ok(subjects)
}
