//! Player-level records: profile, win/loss, peers, hero stats, counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;

use super::{AccountId, HeroId};
use crate::analysis::calculate_win_rate;

/// Public profile block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub account_id: AccountId,

    #[serde(default)]
    pub personaname: Option<String>,

    #[serde(default)]
    pub avatarfull: Option<String>,

    #[serde(default)]
    pub profileurl: Option<String>,

    #[serde(default)]
    pub loccountrycode: Option<String>,

    #[serde(default)]
    pub plus: Option<bool>,
}

/// Player profile response.
///
/// The upstream answers unknown accounts with a body that has no `profile`
/// block, which is why it is optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub profile: Option<ProfileInfo>,

    #[serde(default)]
    pub rank_tier: Option<u32>,

    #[serde(default)]
    pub leaderboard_rank: Option<u32>,
}

impl PlayerProfile {
    /// Display name, if the profile block is present.
    pub fn display_name(&self) -> Option<&str> {
        self.profile.as_ref()?.personaname.as_deref()
    }

    /// Whether the upstream actually knows this subject.
    pub fn is_known(&self) -> bool {
        self.profile.is_some()
    }
}

/// Lifetime win/loss record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLoss {
    #[serde(default)]
    pub win: u32,
    #[serde(default)]
    pub lose: u32,
}

impl WinLoss {
    pub fn games(&self) -> u32 {
        self.win + self.lose
    }

    /// Win rate (0.0 to 1.0), zero when no games were recorded.
    pub fn win_rate(&self) -> f64 {
        calculate_win_rate(self.win, self.games())
    }
}

/// Someone the subject has played with or against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub account_id: AccountId,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub last_played: i64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub win: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub games: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub with_win: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub with_games: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub against_win: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub against_games: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub personaname: String,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub avatar: String,
}

impl Peer {
    /// Win rate in games played on the same team.
    pub fn with_win_rate(&self) -> f64 {
        calculate_win_rate(self.with_win, self.with_games)
    }

    /// Win rate in games played on opposite teams.
    pub fn against_win_rate(&self) -> f64 {
        calculate_win_rate(self.against_win, self.against_games)
    }
}

/// Per-hero record for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHeroStats {
    /// Served as a string by some upstream versions
    #[serde(deserialize_with = "serde_aux::field_attributes::deserialize_number_from_string")]
    pub hero_id: HeroId,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub last_played: i64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub games: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub win: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub with_games: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub with_win: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub against_games: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub against_win: u32,
}

impl PlayerHeroStats {
    /// Win rate on this hero, zero when it was never played.
    pub fn win_rate(&self) -> f64 {
        calculate_win_rate(self.win, self.games)
    }
}

/// Aggregate counters (per lobby type, game mode, region, ...).
///
/// The category layout is upstream-defined, so values are kept as raw JSON.
pub type PlayerCounts = BTreeMap<String, serde_json::Value>;
