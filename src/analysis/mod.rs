//! Match aggregation engine.
//!
//! Pure computations over fetched match data:
//! - Team context per match (outcome, identified teammates)
//! - Party cohorts across matches with win/loss and most-played heroes
//! - Derived ratios used by the dashboard views

mod party;

pub use party::{analyze_match, group_matches_by_party};

use serde::Serialize;

use crate::models::{MatchSummary, PartyGroup};

/// Minimum number of matches a party needs before it can be the best party.
pub const BEST_PARTY_MIN_MATCHES: usize = 2;

/// Calculate win rate from wins and games played.
pub fn calculate_win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64
    }
}

/// Pick the party with the best win rate.
///
/// Only non-solo parties with at least [`BEST_PARTY_MIN_MATCHES`] matches are
/// candidates. A later candidate replaces the current best only with a
/// strictly higher win rate, or an equal win rate over strictly more matches.
pub fn best_party(parties: &[PartyGroup]) -> Option<&PartyGroup> {
    parties
        .iter()
        .filter(|p| !p.is_solo() && p.matches.len() >= BEST_PARTY_MIN_MATCHES)
        .fold(None, |best: Option<&PartyGroup>, current| match best {
            None => Some(current),
            Some(prev) => {
                let (prev_rate, curr_rate) = (prev.win_rate(), current.win_rate());
                if curr_rate > prev_rate
                    || (curr_rate == prev_rate && current.matches.len() > prev.matches.len())
                {
                    Some(current)
                } else {
                    Some(prev)
                }
            }
        })
}

/// Averages over a match history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchTotals {
    pub matches: u32,
    pub average_kda: f64,
    pub average_duration_minutes: f64,
}

/// Summarize a match history; averages over no matches are zero.
pub fn summarize_matches(matches: &[MatchSummary]) -> MatchTotals {
    if matches.is_empty() {
        return MatchTotals::default();
    }

    let count = matches.len() as f64;
    let kda_sum: f64 = matches.iter().map(MatchSummary::kda).sum();
    let duration_sum: f64 = matches.iter().map(|m| m.duration as f64).sum();

    MatchTotals {
        matches: matches.len() as u32,
        average_kda: kda_sum / count,
        average_duration_minutes: duration_sum / count / 60.0,
    }
}
