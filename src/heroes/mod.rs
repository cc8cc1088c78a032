//! Hero id lookups.
//!
//! The catalogue is fetched once through the gateway and reused for the
//! lifetime of the owning [`HeroDirectory`].

use std::collections::HashMap;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::gateway::RequestGateway;
use crate::models::{Hero, HeroId};

/// Prefix of internal hero names.
pub const INTERNAL_NAME_PREFIX: &str = "npc_dota_hero_";

#[derive(Debug, Clone)]
struct HeroNames {
    internal: String,
    localized: String,
}

/// Hero id → name tables.
#[derive(Debug, Clone, Default)]
pub struct HeroCatalog {
    heroes: HashMap<HeroId, HeroNames>,
}

impl HeroCatalog {
    pub fn from_heroes(heroes: impl IntoIterator<Item = Hero>) -> Self {
        let heroes = heroes
            .into_iter()
            .map(|h| {
                (
                    h.id,
                    HeroNames {
                        internal: h.name,
                        localized: h.localized_name,
                    },
                )
            })
            .collect();
        Self { heroes }
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    /// Display name, or `hero_<id>` when the id is unknown.
    pub fn hero_name(&self, id: HeroId) -> String {
        self.heroes
            .get(&id)
            .map(|h| h.localized.clone())
            .unwrap_or_else(|| format!("hero_{}", id))
    }

    /// Internal `npc_dota_hero_*` name.
    pub fn internal_name(&self, id: HeroId) -> Option<&str> {
        self.heroes.get(&id).map(|h| h.internal.as_str())
    }

    /// Internal name without the `npc_dota_hero_` prefix, lowercased.
    pub fn short_name(&self, id: HeroId) -> Option<String> {
        self.internal_name(id).map(|name| {
            name.strip_prefix(INTERNAL_NAME_PREFIX)
                .unwrap_or(name)
                .to_lowercase()
        })
    }
}

/// Load-once owner of the hero catalogue.
#[derive(Debug, Default)]
pub struct HeroDirectory {
    catalog: OnceCell<HeroCatalog>,
}

impl HeroDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the catalogue, fetching it on first use.
    ///
    /// A failed or empty fetch is not cached, so the next call tries again and
    /// this call gets an empty catalogue (names fall back to `hero_<id>`).
    pub async fn catalog(&self, gateway: &RequestGateway) -> HeroCatalog {
        if let Some(catalog) = self.catalog.get() {
            return catalog.clone();
        }

        let result = self
            .catalog
            .get_or_try_init(|| async {
                let heroes = gateway.heroes().await;
                if heroes.is_empty() {
                    return Err(());
                }
                let catalog = HeroCatalog::from_heroes(heroes);
                info!("Loaded {} heroes", catalog.len());
                Ok(catalog)
            })
            .await;

        match result {
            Ok(catalog) => catalog.clone(),
            Err(()) => {
                warn!("Hero catalogue unavailable, using fallback names");
                HeroCatalog::default()
            }
        }
    }

    /// Whether the catalogue has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{gateway, ScriptedTransport};
    use reqwest::StatusCode;

    const HEROES_JSON: &str = r#"[
        {"id": 1, "name": "npc_dota_hero_antimage", "localized_name": "Anti-Mage",
         "primary_attr": "agi", "attack_type": "Melee", "roles": ["Carry"]},
        {"id": 2, "name": "npc_dota_hero_axe", "localized_name": "Axe",
         "primary_attr": "str", "attack_type": "Melee", "roles": ["Initiator"]}
    ]"#;

    #[test]
    fn test_hero_name_lookup_and_fallback() {
        let heroes: Vec<Hero> = serde_json::from_str(HEROES_JSON).unwrap();
        let catalog = HeroCatalog::from_heroes(heroes);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.hero_name(2), "Axe");
        assert_eq!(catalog.hero_name(999), "hero_999");
        assert_eq!(catalog.internal_name(1), Some("npc_dota_hero_antimage"));
        assert_eq!(catalog.short_name(1).as_deref(), Some("antimage"));
        assert!(catalog.internal_name(999).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_directory_loads_once() {
        let transport = ScriptedTransport::new();
        transport.push_ok(HEROES_JSON);
        let gateway = gateway(&transport);
        let directory = HeroDirectory::new();

        assert!(!directory.is_loaded());
        let first = directory.catalog(&gateway).await;
        let second = directory.catalog(&gateway).await;

        assert_eq!(first.hero_name(1), "Anti-Mage");
        assert_eq!(second.len(), 2);
        assert!(directory.is_loaded());
        assert_eq!(transport.issued().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_directory_retries_after_failure() {
        let transport = ScriptedTransport::new();
        transport.push(StatusCode::SERVICE_UNAVAILABLE, "");
        transport.push_ok(HEROES_JSON);
        let gateway = gateway(&transport);
        let directory = HeroDirectory::new();

        let fallback = directory.catalog(&gateway).await;
        assert!(fallback.is_empty());
        assert_eq!(fallback.hero_name(1), "hero_1");
        assert!(!directory.is_loaded());

        let loaded = directory.catalog(&gateway).await;
        assert_eq!(loaded.hero_name(1), "Anti-Mage");
        assert_eq!(transport.issued().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_directories_are_independent() {
        let transport = ScriptedTransport::new();
        transport.push_ok(HEROES_JSON);
        transport.push_ok(HEROES_JSON);
        let gateway = gateway(&transport);

        HeroDirectory::new().catalog(&gateway).await;
        HeroDirectory::new().catalog(&gateway).await;
        assert_eq!(transport.issued().len(), 2);
    }
}
