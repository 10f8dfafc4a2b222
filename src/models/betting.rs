use serde::{Deserialize, Serialize};

/// A betting group the user belongs to (or could join).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub group_id: i64,
    pub group_name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub join_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupSummary>,
}

/// Per-member score inside a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetStat {
    pub user: String,
    #[serde(default)]
    pub points: i64,
}

/// Group detail: name, owner and the member leaderboard.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub group_name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub bet_stats: Vec<BetStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub group_id: Option<i64>,
}

/// Generic `{ "status": ... }` acknowledgement used by join/leave/delete.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
}

/// A race that is currently open for betting.
#[derive(Debug, Clone, Deserialize)]
pub struct RaceToBet {
    pub id: String,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub circuit: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// A user's prediction for one race in one group.
/// The client holds a copy only while a form is open; the backend owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    #[serde(default)]
    pub race: Option<String>,
    pub bet_top_3: [String; 3],
    pub bet_last_5: String,
    pub bet_last_10: String,
    pub bet_fastest_lap: String,
}

/// Request body for creating or updating a bet. `race` and `group` are only
/// sent on creation; updates are addressed by race id in the URL.
#[derive(Debug, Clone, Serialize)]
pub struct BetPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
    pub bet_top_3: [String; 3],
    pub bet_last_5: String,
    pub bet_last_10: String,
    pub bet_fastest_lap: String,
}

/// A scored bet as returned after evaluation against real results.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatedBet {
    pub user: String,
    pub race: String,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub bet_top_3: Vec<String>,
    #[serde(default)]
    pub bet_last_5: String,
    #[serde(default)]
    pub bet_last_10: String,
    #[serde(default)]
    pub bet_fastest_lap: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStandingsEntry {
    pub user: String,
    #[serde(default)]
    pub points: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatedBetsResponse {
    #[serde(default)]
    pub bets: Vec<EvaluatedBet>,
    #[serde(default)]
    pub standings: Vec<GroupStandingsEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_groups_response() {
        let json = r#"{"status":"success","groups":[{
            "group_id": 7,
            "group_name": "paddock-club",
            "owner": "charles",
            "created_at": "2026-03-01T10:00:00Z",
            "members": ["charles", "carlos"]
        }]}"#;
        let resp: GroupsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.groups.len(), 1);
        assert_eq!(resp.groups[0].group_id, 7);
        assert_eq!(resp.groups[0].members, vec!["charles", "carlos"]);
    }

    #[test]
    fn test_parse_bet_top3_is_fixed_size() {
        let json = r#"{
            "race": "monza-2026",
            "bet_top_3": ["verstappen", "norris", "leclerc"],
            "bet_last_5": "stroll",
            "bet_last_10": "albon",
            "bet_fastest_lap": "norris"
        }"#;
        let bet: Bet = serde_json::from_str(json).unwrap();
        assert_eq!(bet.bet_top_3[1], "norris");

        // A two-entry podium is a malformed bet, not a shorter one
        let bad = r#"{"bet_top_3":["a","b"],"bet_last_5":"x","bet_last_10":"y","bet_fastest_lap":"z"}"#;
        assert!(serde_json::from_str::<Bet>(bad).is_err());
    }

    #[test]
    fn test_bet_payload_skips_absent_addressing() {
        let payload = BetPayload {
            race: None,
            group: None,
            bet_top_3: ["a".into(), "b".into(), "c".into()],
            bet_last_5: "x".into(),
            bet_last_10: "y".into(),
            bet_fastest_lap: "z".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("race").is_none());
        assert!(json.get("group").is_none());
    }

    #[test]
    fn test_parse_evaluated_bets() {
        let json = r#"{
            "bets": [{"user":"carlos","race":"imola-2026","points":5,
                      "bet_top_3":["a","b","c"],"bet_last_5":"d","bet_last_10":"e","bet_fastest_lap":"f"}],
            "standings": [{"user":"carlos","points":12},{"user":"charles","points":9}]
        }"#;
        let resp: EvaluatedBetsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.bets[0].points, 5);
        assert_eq!(resp.standings[1].user, "charles");
    }
}
