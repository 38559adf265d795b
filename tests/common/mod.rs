// Shared fixtures for integration tests: a scripted existence probe and a
// small catalog in the shape the live data takes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use podium::catalog::{
    CatalogSkin, CatalogSubject, ChromaVariant, CompanionVariant, FormVariant, LegacyVariant,
};
use podium::resolve::{ExistenceProbe, ProbeOutcome};

/// Route `log` output through the test harness when RUST_LOG is set.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Probe double: exactly the scripted URLs exist, optionally after a
/// scripted delay. Records every check in order.
pub struct ScriptedProbe {
    hits: Vec<String>,
    delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self {
            hits: Vec::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn hit(mut self, url: &str) -> Self {
        self.hits.push(url.to_string());
        self
    }

    pub fn delay_ms(mut self, url: &str, ms: u64) -> Self {
        self.delays.insert(url.to_string(), Duration::from_millis(ms));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ExistenceProbe for ScriptedProbe {
    fn check(&self, url: &str) -> impl Future<Output = ProbeOutcome> + Send {
        self.calls.lock().unwrap().push(url.to_string());
        let delay = self.delays.get(url).copied().unwrap_or_default();
        let outcome = if self.hits.iter().any(|h| h == url) {
            ProbeOutcome::Hit
        } else {
            ProbeOutcome::Miss
        };
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            outcome
        }
    }
}

/// A subject with the full spread of variant data: chromas, an alternate
/// form, an archived version, and a companion with alias drift.
pub fn spirit_archer() -> CatalogSubject {
    CatalogSubject {
        id: 203,
        numeric_key: 203,
        alias: "spiritarcher".to_string(),
        name: "Spirit Archer".to_string(),
        skins: vec![
            CatalogSkin {
                number: 0,
                name: "Default".to_string(),
                chromas: vec![],
                alternate_form: None,
                historical_versions: vec![],
                companions: vec![CompanionVariant {
                    aliases: vec!["spiritwolf".to_string(), "wolf".to_string()],
                }],
            },
            CatalogSkin {
                number: 14,
                name: "Shadowfire".to_string(),
                chromas: vec![
                    ChromaVariant {
                        id: 203141,
                        name: "Ruby".to_string(),
                    },
                    ChromaVariant {
                        id: 203142,
                        name: "Obsidian".to_string(),
                    },
                ],
                alternate_form: Some(FormVariant {
                    label: "shadow".to_string(),
                    swaps_model: true,
                    idle_override: Some("idle_shadow".to_string()),
                }),
                historical_versions: vec![LegacyVariant {
                    version: 2,
                    has_texture: true,
                    idle_override: None,
                }],
                companions: vec![CompanionVariant {
                    aliases: vec!["spiritwolf".to_string(), "wolf".to_string()],
                }],
            },
        ],
    }
}

/// A subject with no variants at all.
pub fn plain_knight() -> CatalogSubject {
    CatalogSubject {
        id: 7,
        numeric_key: 7,
        alias: "plainknight".to_string(),
        name: "Plain Knight".to_string(),
        skins: vec![CatalogSkin {
            number: 0,
            name: "Default".to_string(),
            chromas: vec![],
            alternate_form: None,
            historical_versions: vec![],
            companions: vec![],
        }],
    }
}
