//! Hero catalogue entries.

use serde::{Deserialize, Serialize};

use super::HeroId;

/// Static hero definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: HeroId,

    /// Internal name, e.g. `npc_dota_hero_antimage`
    pub name: String,

    /// Display name, e.g. `Anti-Mage`
    pub localized_name: String,

    #[serde(default)]
    pub primary_attr: String,

    #[serde(default)]
    pub attack_type: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

/// Hero entry from the global hero statistics feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalHero {
    #[serde(flatten)]
    pub hero: Hero,

    #[serde(default)]
    pub img: String,

    #[serde(default)]
    pub icon: String,
}
