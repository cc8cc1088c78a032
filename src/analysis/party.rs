//! Team-context reconstruction and party grouping.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::heroes::HeroCatalog;
use crate::models::{
    AccountId, ExtendedMatch, HeroId, MatchDetail, MatchResult, MatchSummary, PartyGroup,
    PartyId, PartyTeammate, Teammate,
};

/// Enrich one match summary with its outcome and identified teammates.
///
/// The subject's side comes from their slot in `detail`, and the outcome is
/// recomputed from that side and the detail's winner flag. Returns `None` when
/// the subject does not appear in `detail`.
pub fn analyze_match(
    account_id: AccountId,
    summary: &MatchSummary,
    detail: &MatchDetail,
    heroes: &HeroCatalog,
) -> Option<ExtendedMatch> {
    let Some(subject) = detail.player(account_id) else {
        trace!(
            "Account {} not present in match {}, skipping",
            account_id,
            detail.match_id
        );
        return None;
    };

    let side = subject.side();
    let result = MatchResult::from_won(side.won(detail.radiant_win));

    let teammates = detail
        .players_on(side)
        .filter_map(|p| {
            let id = p.account_id?;
            if id == account_id {
                return None;
            }
            Some(Teammate {
                account_id: id,
                personaname: p
                    .personaname
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| format!("Unknown ({})", id)),
                hero_id: p.hero_id,
            })
        })
        .collect();

    Some(ExtendedMatch {
        summary: summary.clone(),
        teammates,
        result,
        played_hero_name: heroes.hero_name(summary.hero_id),
    })
}

/// Per-teammate hero occurrences, kept in first-seen order.
#[derive(Debug, Default)]
struct HeroTally(Vec<(HeroId, u32)>);

impl HeroTally {
    fn record(&mut self, hero_id: HeroId) {
        match self.0.iter_mut().find(|(id, _)| *id == hero_id) {
            Some((_, count)) => *count += 1,
            None => self.0.push((hero_id, 1)),
        }
    }

    /// Most frequent hero; the first hero to reach the top count wins ties.
    fn most_played(&self) -> HeroId {
        let mut best: Option<(HeroId, u32)> = None;
        for &(hero_id, count) in &self.0 {
            if best.map_or(true, |(_, max)| count > max) {
                best = Some((hero_id, count));
            }
        }
        best.map(|(hero_id, _)| hero_id).unwrap_or(0)
    }
}

struct PartyAccumulator {
    id: PartyId,
    player_ids: Vec<AccountId>,
    wins: u32,
    losses: u32,
    matches: Vec<ExtendedMatch>,
    names: HashMap<AccountId, String>,
    heroes: HashMap<AccountId, HeroTally>,
}

impl PartyAccumulator {
    fn new(id: PartyId, player_ids: Vec<AccountId>) -> Self {
        Self {
            id,
            player_ids,
            wins: 0,
            losses: 0,
            matches: Vec::new(),
            names: HashMap::new(),
            heroes: HashMap::new(),
        }
    }

    fn add(&mut self, m: &ExtendedMatch) {
        match m.result {
            MatchResult::Won => self.wins += 1,
            MatchResult::Lost => self.losses += 1,
        }

        for mate in &m.teammates {
            // last seen name wins
            self.names.insert(mate.account_id, mate.personaname.clone());
            self.heroes
                .entry(mate.account_id)
                .or_default()
                .record(mate.hero_id);
        }

        self.matches.push(m.clone());
    }

    fn finish(self) -> PartyGroup {
        let teammates = self
            .player_ids
            .iter()
            .map(|&id| PartyTeammate {
                account_id: id,
                personaname: self
                    .names
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                most_played_hero_id: self
                    .heroes
                    .get(&id)
                    .map(HeroTally::most_played)
                    .unwrap_or(0),
            })
            .collect();

        PartyGroup {
            id: self.id,
            player_ids: self.player_ids,
            teammates,
            wins: self.wins,
            losses: self.losses,
            matches: self.matches,
        }
    }
}

/// Partition matches into party cohorts keyed by their teammate id set.
///
/// Groups come back ordered by descending match count. Equal-sized groups
/// keep the order in which they were first seen, but callers should not rely
/// on that ordering.
pub fn group_matches_by_party(matches: &[ExtendedMatch]) -> Vec<PartyGroup> {
    let mut index: HashMap<PartyId, usize> = HashMap::new();
    let mut groups: Vec<PartyAccumulator> = Vec::new();

    for m in matches {
        let (key, player_ids) = PartyId::from_members(m.teammates.iter().map(|t| t.account_id));

        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(PartyAccumulator::new(key.clone(), player_ids));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };

        groups[slot].add(m);
    }

    let mut parties: Vec<PartyGroup> = groups.into_iter().map(PartyAccumulator::finish).collect();
    parties.sort_by(|a, b| b.matches.len().cmp(&a.matches.len()));

    debug!(
        "Grouped {} matches into {} parties",
        matches.len(),
        parties.len()
    );
    parties
}
