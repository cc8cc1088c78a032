//! Professional match feed entries.

use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_default_from_null;

use super::MatchId;

/// A recent professional match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProMatch {
    pub match_id: MatchId,

    pub duration: u32,

    pub start_time: i64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub radiant_team_id: u64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub radiant_name: String,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub dire_team_id: u64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub dire_name: String,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub leagueid: u64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub league_name: String,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub series_id: u64,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub series_type: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub radiant_score: u32,

    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub dire_score: u32,

    pub radiant_win: bool,
}

impl ProMatch {
    /// Name of the winning team.
    pub fn winner_name(&self) -> &str {
        if self.radiant_win {
            &self.radiant_name
        } else {
            &self.dire_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pro_match_null_team_names() {
        let json = r#"{
            "match_id": 8000000000, "duration": 2100, "start_time": 1700000000,
            "radiant_team_id": 15, "radiant_name": "Team A",
            "dire_team_id": null, "dire_name": null,
            "leagueid": 16000, "league_name": "Some League",
            "series_id": 900, "series_type": 1,
            "radiant_score": 30, "dire_score": 12, "radiant_win": false
        }"#;
        let pro: ProMatch = serde_json::from_str(json).unwrap();

        assert_eq!(pro.dire_team_id, 0);
        assert_eq!(pro.dire_name, "");
        assert_eq!(pro.winner_name(), "");
        assert_eq!(pro.radiant_name, "Team A");
    }
}
