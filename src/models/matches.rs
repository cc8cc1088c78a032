//! Match history and match detail records as served by the upstream API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;

use super::{AccountId, HeroId, MatchId};

/// Slot values below this belong to the Radiant side.
pub const DIRE_SLOT_OFFSET: u16 = 128;

/// Team side of a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Radiant,
    Dire,
}

impl Side {
    /// Side encoded by a player slot.
    pub fn from_slot(slot: u16) -> Self {
        if slot < DIRE_SLOT_OFFSET {
            Side::Radiant
        } else {
            Side::Dire
        }
    }

    /// Whether this side won, given the match's radiant-win flag.
    pub fn won(self, radiant_win: bool) -> bool {
        match self {
            Side::Radiant => radiant_win,
            Side::Dire => !radiant_win,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Radiant => write!(f, "Radiant"),
            Side::Dire => write!(f, "Dire"),
        }
    }
}

/// One row of a player's match history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: MatchId,

    /// Player slot; the side is encoded by [`Side::from_slot`]
    pub player_slot: u16,

    /// Outcome flag as reported by the history endpoint
    pub radiant_win: bool,

    /// Duration in seconds
    pub duration: u32,

    /// Unix timestamp (seconds)
    pub start_time: i64,

    pub hero_id: HeroId,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub kills: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub deaths: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub assists: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lobby_type: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<u32>,
}

impl MatchSummary {
    /// Side according to the summary's own slot.
    pub fn side(&self) -> Side {
        Side::from_slot(self.player_slot)
    }

    /// Match start as a UTC timestamp.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time, 0)
    }

    /// Kill/death/assist ratio; zero deaths count as one.
    pub fn kda(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }
}

/// One participant in a match detail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayerDetail {
    /// `None` when the participant's identity is not public
    #[serde(default)]
    pub account_id: Option<AccountId>,

    pub player_slot: u16,

    pub hero_id: HeroId,

    #[serde(default)]
    pub personaname: Option<String>,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub kills: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub deaths: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub assists: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub win: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub gold_per_min: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub xp_per_min: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub hero_damage: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub tower_damage: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub item_0: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub item_1: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub item_2: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub item_3: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub item_4: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub item_5: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub backpack_0: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub backpack_1: u32,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub backpack_2: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub neutral_item: u32,
}

impl MatchPlayerDetail {
    pub fn side(&self) -> Side {
        Side::from_slot(self.player_slot)
    }

    /// Main inventory item ids, skipping empty slots.
    pub fn items(&self) -> Vec<u32> {
        [
            self.item_0,
            self.item_1,
            self.item_2,
            self.item_3,
            self.item_4,
            self.item_5,
        ]
        .into_iter()
        .filter(|&item| item != 0)
        .collect()
    }
}

/// Full per-match record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub match_id: MatchId,

    pub radiant_win: bool,

    /// Duration in seconds
    pub duration: u32,

    /// Unix timestamp (seconds)
    pub start_time: i64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub radiant_score: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub dire_score: u32,

    #[serde(default)]
    pub players: Vec<MatchPlayerDetail>,
}

impl MatchDetail {
    /// Find a participant by account id.
    pub fn player(&self, account_id: AccountId) -> Option<&MatchPlayerDetail> {
        self.players
            .iter()
            .find(|p| p.account_id == Some(account_id))
    }

    /// Participants on one side, in slot order as served.
    pub fn players_on(&self, side: Side) -> impl Iterator<Item = &MatchPlayerDetail> {
        self.players.iter().filter(move |p| p.side() == side)
    }

    /// The winning side.
    pub fn winner(&self) -> Side {
        if self.radiant_win {
            Side::Radiant
        } else {
            Side::Dire
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL_JSON: &str = r#"{
        "match_id": 7500000001,
        "radiant_win": false,
        "duration": 2400,
        "start_time": 1700000000,
        "radiant_score": 21,
        "dire_score": 35,
        "players": [
            {"account_id": 11, "player_slot": 0, "hero_id": 1, "personaname": "alpha",
             "kills": 3, "deaths": 7, "assists": 5, "win": 0,
             "gold_per_min": 410, "xp_per_min": 500, "hero_damage": 12000, "tower_damage": 300,
             "item_0": 1, "item_1": 0, "item_2": 36, "item_3": 0, "item_4": 0, "item_5": 0,
             "backpack_0": 0, "backpack_1": 0, "backpack_2": 0, "neutral_item": 0},
            {"account_id": null, "player_slot": 130, "hero_id": 8,
             "kills": 10, "deaths": 1, "assists": 9, "win": 1,
             "gold_per_min": 700, "xp_per_min": 800, "hero_damage": null, "tower_damage": null}
        ]
    }"#;

    #[test]
    fn test_side_from_slot() {
        assert_eq!(Side::from_slot(0), Side::Radiant);
        assert_eq!(Side::from_slot(4), Side::Radiant);
        assert_eq!(Side::from_slot(127), Side::Radiant);
        assert_eq!(Side::from_slot(128), Side::Dire);
        assert_eq!(Side::from_slot(132), Side::Dire);
    }

    #[test]
    fn test_side_won() {
        assert!(Side::Radiant.won(true));
        assert!(!Side::Radiant.won(false));
        assert!(Side::Dire.won(false));
        assert!(!Side::Dire.won(true));
    }

    #[test]
    fn test_match_detail_parses_anonymous_and_null_counters() {
        let detail: MatchDetail = serde_json::from_str(DETAIL_JSON).unwrap();

        assert_eq!(detail.players.len(), 2);
        assert_eq!(detail.winner(), Side::Dire);

        let anon = &detail.players[1];
        assert_eq!(anon.account_id, None);
        assert_eq!(anon.personaname, None);
        assert_eq!(anon.hero_damage, 0);
        assert_eq!(anon.item_0, 0);
        assert_eq!(anon.side(), Side::Dire);
    }

    #[test]
    fn test_match_detail_player_lookup() {
        let detail: MatchDetail = serde_json::from_str(DETAIL_JSON).unwrap();

        assert_eq!(detail.player(11).map(|p| p.hero_id), Some(1));
        assert!(detail.player(99).is_none());
        assert_eq!(detail.players_on(Side::Radiant).count(), 1);
        assert_eq!(detail.players[0].items(), vec![1, 36]);
    }

    #[test]
    fn test_match_summary_parse_and_kda() {
        let json = r#"{
            "match_id": 42, "player_slot": 131, "radiant_win": true, "duration": 1800,
            "start_time": 1700000000, "hero_id": 14, "kills": 4, "deaths": 0, "assists": 6,
            "party_size": 3, "lobby_type": 7, "skill": null
        }"#;
        let summary: MatchSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.side(), Side::Dire);
        assert_eq!(summary.party_size, Some(3));
        assert_eq!(summary.skill, None);
        assert_eq!(summary.kda(), 10.0);
        assert_eq!(
            summary.started_at().map(|t| t.timestamp()),
            Some(1_700_000_000)
        );
    }
}
