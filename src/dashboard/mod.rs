//! Dashboard data loading.
//!
//! Coordinates the fetch-then-aggregate flow the views need:
//! 1. Fetch the subject's profile, win/loss and recent matches
//! 2. Fetch the detail record of every recent match
//! 3. Run the aggregation engine over summaries and details
//! 4. Group the enriched matches into parties

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{analyze_match, best_party, group_matches_by_party};
use crate::gateway::RequestGateway;
use crate::heroes::HeroDirectory;
use crate::models::{AccountId, ExtendedMatch, MatchSummary, PartyGroup, PlayerProfile, WinLoss};

/// Header data for a player page.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerOverview {
    pub account_id: AccountId,
    pub profile: Option<PlayerProfile>,
    pub win_loss: Option<WinLoss>,
    pub matches: Vec<MatchSummary>,
}

impl PlayerOverview {
    /// Whether the subject exists upstream.
    pub fn is_found(&self) -> bool {
        self.profile.as_ref().is_some_and(PlayerProfile::is_known)
    }
}

/// Party breakdown for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct PartyReport {
    pub account_id: AccountId,

    /// Matches that could be analyzed
    pub analyzed: Vec<ExtendedMatch>,

    /// Party cohorts, most frequent first
    pub parties: Vec<PartyGroup>,

    /// Matches dropped because detail was missing or lacked the subject
    pub skipped: usize,

    #[serde(skip)]
    pub duration: Duration,
}

impl PartyReport {
    pub fn best_party(&self) -> Option<&PartyGroup> {
        best_party(&self.parties)
    }
}

/// Loads dashboard data through a gateway.
pub struct DashboardLoader {
    gateway: RequestGateway,
    heroes: HeroDirectory,
}

impl DashboardLoader {
    pub fn new(gateway: RequestGateway) -> Self {
        Self {
            gateway,
            heroes: HeroDirectory::new(),
        }
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn heroes(&self) -> &HeroDirectory {
        &self.heroes
    }

    /// Fetch profile, win/loss and recent matches.
    ///
    /// The three requests are submitted together; the gateway still issues
    /// them one at a time.
    pub async fn player_overview(&self, account_id: AccountId) -> PlayerOverview {
        let (profile, win_loss, matches) = tokio::join!(
            self.gateway.player_profile(account_id),
            self.gateway.player_win_loss(account_id),
            self.gateway.recent_matches(account_id),
        );

        PlayerOverview {
            account_id,
            profile,
            win_loss,
            matches,
        }
    }

    /// Build the party breakdown from the subject's recent matches.
    pub async fn party_report(&self, account_id: AccountId) -> PartyReport {
        let summaries = self.gateway.recent_matches(account_id).await;
        self.party_report_for(account_id, &summaries).await
    }

    /// Build the party breakdown for an already fetched match list.
    pub async fn party_report_for(
        &self,
        account_id: AccountId,
        summaries: &[MatchSummary],
    ) -> PartyReport {
        let start = Instant::now();
        let catalog = self.heroes.catalog(&self.gateway).await;

        info!(
            "Analyzing {} matches for account {}",
            summaries.len(),
            account_id
        );

        let mut analyzed = Vec::with_capacity(summaries.len());
        let mut skipped = 0;

        for summary in summaries {
            let Some(detail) = self.gateway.match_detail(summary.match_id).await else {
                skipped += 1;
                continue;
            };

            match analyze_match(account_id, summary, &detail, &catalog) {
                Some(extended) => analyzed.push(extended),
                None => {
                    debug!(
                        "Match {} has no record of account {}",
                        summary.match_id, account_id
                    );
                    skipped += 1;
                }
            }
        }

        let parties = group_matches_by_party(&analyzed);

        info!(
            "Found {} parties across {} matches ({} skipped)",
            parties.len(),
            analyzed.len(),
            skipped
        );

        PartyReport {
            account_id,
            analyzed,
            parties,
            skipped,
            duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::testing::{gateway, ScriptedTransport};
    use reqwest::StatusCode;

    const HEROES_JSON: &str = r#"[
        {"id": 1, "name": "npc_dota_hero_antimage", "localized_name": "Anti-Mage"},
        {"id": 2, "name": "npc_dota_hero_axe", "localized_name": "Axe"}
    ]"#;

    fn summary_json(match_id: u64) -> String {
        format!(
            r#"{{"match_id": {}, "player_slot": 0, "radiant_win": true, "duration": 1800,
                "start_time": 1700000000, "hero_id": 1, "kills": 5, "deaths": 3, "assists": 7}}"#,
            match_id
        )
    }

    fn detail_json(match_id: u64, radiant_win: bool, players: &[(Option<u32>, u16, u32)]) -> String {
        let players: Vec<String> = players
            .iter()
            .map(|(account, slot, hero)| {
                let account = account.map_or("null".to_string(), |a| a.to_string());
                format!(
                    r#"{{"account_id": {}, "player_slot": {}, "hero_id": {}, "personaname": "p{}"}}"#,
                    account, slot, hero, account
                )
            })
            .collect();
        format!(
            r#"{{"match_id": {}, "radiant_win": {}, "duration": 1800, "start_time": 1700000000,
                "radiant_score": 10, "dire_score": 20, "players": [{}]}}"#,
            match_id,
            radiant_win,
            players.join(",")
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_party_report_end_to_end() {
        let transport = ScriptedTransport::new();
        let summaries: Vec<String> = (1..=5).map(summary_json).collect();
        transport.push_ok(&format!("[{}]", summaries.join(",")));
        transport.push_ok(HEROES_JSON);
        // 1: with 10 and 20, won
        transport.push_ok(&detail_json(
            1,
            true,
            &[(Some(7), 0, 1), (Some(10), 1, 2), (Some(20), 2, 1), (Some(99), 128, 2)],
        ));
        // 2: same party in the other order, subject on dire, lost
        transport.push_ok(&detail_json(
            2,
            true,
            &[(Some(20), 129, 2), (Some(7), 128, 1), (Some(10), 130, 2)],
        ));
        // 3: solo (only an anonymous ally), won
        transport.push_ok(&detail_json(3, true, &[(Some(7), 0, 1), (None, 1, 2)]));
        // 4: detail missing
        transport.push(StatusCode::NOT_FOUND, "");
        // 5: subject anonymized in the detail
        transport.push_ok(&detail_json(5, true, &[(None, 0, 1), (Some(10), 1, 2)]));

        let loader = DashboardLoader::new(gateway(&transport));
        let report = loader.party_report(7).await;

        assert_eq!(report.analyzed.len(), 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.parties.len(), 2);

        let party = &report.parties[0];
        assert_eq!(party.id.as_str(), "10,20");
        assert_eq!((party.wins, party.losses), (1, 1));
        assert_eq!(report.analyzed[0].played_hero_name, "Anti-Mage");

        let solo = &report.parties[1];
        assert!(solo.is_solo());
        assert_eq!((solo.wins, solo.losses), (1, 0));

        assert_eq!(report.best_party().map(|p| p.id.as_str()), Some("10,20"));
        // matches + heroes + 5 details
        assert_eq!(transport.issued().len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_party_report_no_matches() {
        let transport = ScriptedTransport::new();
        transport.push(StatusCode::NOT_FOUND, "");
        transport.push_ok(HEROES_JSON);
        let loader = DashboardLoader::new(gateway(&transport));

        let report = loader.party_report(1).await;
        assert!(report.analyzed.is_empty());
        assert!(report.parties.is_empty());
        assert_eq!(report.skipped, 0);
        assert!(report.best_party().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_player_overview_not_found() {
        let transport = ScriptedTransport::new();
        transport.push_ok(r#"{"rank_tier": null}"#);
        transport.push_ok(r#"{"win": 0, "lose": 0}"#);
        transport.push_ok("[]");
        let loader = DashboardLoader::new(gateway(&transport));

        let overview = loader.player_overview(5).await;
        assert!(!overview.is_found());
        assert_eq!(overview.win_loss.map(|wl| wl.win_rate()), Some(0.0));
        assert!(overview.matches.is_empty());
        assert_eq!(
            transport.paths(),
            vec![
                "GET /api/players/5",
                "GET /api/players/5/wl",
                "GET /api/players/5/matches?limit=50",
            ]
        );
    }
}
