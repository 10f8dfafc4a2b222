use serde::{Deserialize, Serialize};

use super::{flexible_f64, flexible_i64};

/// One constructor row from the current-teams catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: String,
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub points: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub position: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub wins: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub podiums: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsResponse {
    pub teams: Vec<Team>,
}

/// Career and current-season statistics for the team detail view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub first_entry: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub career_wins: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub career_points: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub career_podiums: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub career_poles: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub current_season_points: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub current_season_wins: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub current_season_podiums: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub world_championships: Option<i64>,
    #[serde(default)]
    pub drivers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamDetailResponse {
    pub team: TeamDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_teams_response() {
        let json = r#"{"teams":[
            {"team_id":"mclaren","name":"McLaren","nationality":"British","points":279,"position":1},
            {"team_id":"ferrari","name":"Ferrari","points":"252"}
        ]}"#;
        let resp: TeamsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.teams.len(), 2);
        assert_eq!(resp.teams[0].position, Some(1));
        assert_eq!(resp.teams[1].points, Some(252.0));
    }
}
