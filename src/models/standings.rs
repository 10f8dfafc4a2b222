use serde::{Deserialize, Serialize};

use super::{flexible_f64, flexible_i64};

/// One row of the season driver-championship table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverStandingRow {
    pub driver: String,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub position: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub points: Option<f64>,
}

/// One row of the season constructor-championship table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStandingRow {
    pub team: String,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub position: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub points: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_standings_rows() {
        // Positions and points come back as strings from the standings tables
        let json = r#"[
            {"driver":"Max Verstappen","nationality":"Dutch","team":"Red Bull","position":"1","points":"437"},
            {"driver":"Lando Norris","team":"McLaren","position":2,"points":374}
        ]"#;
        let rows: Vec<DriverStandingRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].position, Some(1));
        assert_eq!(rows[0].points, Some(437.0));
        assert_eq!(rows[1].position, Some(2));
    }
}
