//! Typed, best-effort wrappers for each upstream resource.
//!
//! Failures never propagate from here: single-entity lookups come back as
//! `None`, list lookups as an empty `Vec`. The cause is logged.

use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{GatewayError, RequestGateway, UpstreamRequest};
use crate::models::{
    AccountId, GlobalHero, Hero, MatchDetail, MatchId, MatchSummary, Peer, PlayerCounts,
    PlayerHeroStats, PlayerProfile, ProMatch, WinLoss,
};

fn or_absent<T>(result: Result<T, GatewayError>, what: &str) -> Option<T> {
    result
        .map_err(|e| warn!("Error fetching {}: {}", what, e))
        .ok()
}

fn or_empty<T>(result: Result<Vec<T>, GatewayError>, what: &str) -> Vec<T> {
    or_absent(result, what).unwrap_or_default()
}

impl RequestGateway {
    /// GET a resource and decode a successful body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.fetch_resource(path, Method::GET)
            .await?
            .into_success()?
            .json()
    }

    pub async fn player_profile(&self, account_id: AccountId) -> Option<PlayerProfile> {
        or_absent(
            self.get_json(&format!("players/{}", account_id)).await,
            "player profile",
        )
    }

    pub async fn player_win_loss(&self, account_id: AccountId) -> Option<WinLoss> {
        or_absent(
            self.get_json(&format!("players/{}/wl", account_id)).await,
            "win/loss",
        )
    }

    /// Most recent matches, newest first, up to the configured limit.
    pub async fn recent_matches(&self, account_id: AccountId) -> Vec<MatchSummary> {
        or_empty(
            self.get_json(&format!(
                "players/{}/matches?limit={}",
                account_id, self.recent_match_limit
            ))
            .await,
            "matches",
        )
    }

    pub async fn match_detail(&self, match_id: MatchId) -> Option<MatchDetail> {
        or_absent(
            self.get_json(&format!("matches/{}", match_id)).await,
            &format!("match {}", match_id),
        )
    }

    pub async fn player_peers(&self, account_id: AccountId) -> Vec<Peer> {
        or_empty(
            self.get_json(&format!("players/{}/peers", account_id)).await,
            "peers",
        )
    }

    pub async fn player_heroes(&self, account_id: AccountId) -> Vec<PlayerHeroStats> {
        or_empty(
            self.get_json(&format!("players/{}/heroes", account_id)).await,
            "player heroes",
        )
    }

    /// Static hero definitions.
    pub async fn heroes(&self) -> Vec<Hero> {
        or_empty(self.get_json("heroes").await, "heroes")
    }

    pub async fn global_heroes(&self) -> Vec<GlobalHero> {
        or_empty(self.get_json("heroStats").await, "global heroes")
    }

    pub async fn pro_matches(&self) -> Vec<ProMatch> {
        or_empty(self.get_json("proMatches").await, "pro matches")
    }

    pub async fn player_counts(&self, account_id: AccountId) -> Option<PlayerCounts> {
        or_absent(
            self.get_json(&format!("players/{}/counts", account_id)).await,
            "counts",
        )
    }

    /// Ask the upstream to re-parse a match.
    ///
    /// The request is queued immediately, behind anything already submitted.
    /// The returned handle resolves once it has been answered; dropping it
    /// does not cancel the request.
    pub fn request_match_parse(&self, match_id: MatchId) -> JoinHandle<()> {
        let queued = self
            .resolve(&format!("request/{}", match_id))
            .and_then(|url| {
                self.enqueue(UpstreamRequest {
                    method: Method::POST,
                    url,
                })
            });

        tokio::spawn(async move {
            let outcome = match queued {
                Ok(receiver) => receiver.await.unwrap_or(Err(GatewayError::Closed)),
                Err(e) => Err(e),
            };
            match outcome.and_then(|response| response.into_success()) {
                Ok(_) => debug!("Parse requested for match {}", match_id),
                Err(e) => warn!("Error requesting parse of match {}: {}", match_id, e),
            }
        })
    }
}
