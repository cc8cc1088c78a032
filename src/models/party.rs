//! Derived records produced by the party aggregation engine.

use serde::{Deserialize, Serialize};

use super::{AccountId, HeroId, MatchSummary, PartyId};
use crate::analysis::calculate_win_rate;

/// An identified ally in a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teammate {
    pub account_id: AccountId,
    pub personaname: String,
    pub hero_id: HeroId,
}

/// Outcome of a match from the subject's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Won,
    Lost,
}

impl MatchResult {
    pub fn from_won(won: bool) -> Self {
        if won {
            MatchResult::Won
        } else {
            MatchResult::Lost
        }
    }

    pub fn is_win(self) -> bool {
        self == MatchResult::Won
    }
}

impl std::fmt::Display for MatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchResult::Won => write!(f, "Won"),
            MatchResult::Lost => write!(f, "Lost"),
        }
    }
}

/// A match summary enriched with its team context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedMatch {
    #[serde(flatten)]
    pub summary: MatchSummary,

    /// Identified allies, in detail-record order
    pub teammates: Vec<Teammate>,

    /// Outcome recomputed from the detail record
    pub result: MatchResult,

    /// Localized name of the hero the subject played
    pub played_hero_name: String,
}

/// A party member with their most-played hero inside one party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyTeammate {
    pub account_id: AccountId,
    pub personaname: String,
    pub most_played_hero_id: HeroId,
}

/// A cohort of matches played with the same set of teammates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyGroup {
    pub id: PartyId,

    /// Member account ids, ascending
    pub player_ids: Vec<AccountId>,

    /// Member roster in `player_ids` order
    pub teammates: Vec<PartyTeammate>,

    pub wins: u32,

    pub losses: u32,

    /// Contributing matches, in input order
    pub matches: Vec<ExtendedMatch>,
}

impl PartyGroup {
    pub fn is_solo(&self) -> bool {
        self.id.is_solo()
    }

    pub fn games(&self) -> u32 {
        self.matches.len() as u32
    }

    /// Win rate (0.0 to 1.0), zero for an empty group.
    pub fn win_rate(&self) -> f64 {
        calculate_win_rate(self.wins, self.games())
    }
}
