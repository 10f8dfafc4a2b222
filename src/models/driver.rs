use serde::{Deserialize, Serialize};

use super::{flexible_f64, flexible_i64};

/// One driver row from the current-drivers catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub driver_id: String,
    pub forename: String,
    pub surname: String,
    #[serde(rename = "driverNumber", alias = "number", default)]
    pub driver_number: Option<i64>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(rename = "dateOfBirth", default)]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub wins: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub podiums: Option<i64>,
    #[serde(rename = "polePositions", default, deserialize_with = "flexible_i64")]
    pub pole_positions: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub points: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub position: Option<i64>,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.forename, self.surname)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriversResponse {
    pub drivers: Vec<Driver>,
}

/// Career and current-season statistics for the driver detail view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverDetail {
    #[serde(default)]
    pub forename: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub career_wins: Option<i64>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub career_points: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub career_podiums: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub career_poles: Option<i64>,
    #[serde(default)]
    pub current_team: Option<String>,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub current_season_points: Option<f64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub current_season_wins: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub current_season_podiums: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub current_season_poles: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub grand_prix_entered: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub world_championships: Option<i64>,
    #[serde(default, deserialize_with = "flexible_i64")]
    pub best_grid_position: Option<i64>,
}

impl DriverDetail {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.forename, self.surname)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverDetailResponse {
    pub driver: DriverDetail,
}

/// One race's starting and finishing position for a driver in a season.
/// Immutable once fetched; consumed by the line-chart adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub round: u32,
    pub grid: u32,
    pub result: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingsResponse {
    pub races: Vec<RaceResult>,
}

/// Per-season finishing position summary for the box-plot view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonBoxPlot {
    /// Season year used as the category label
    pub x: i32,
    pub min: f64,
    #[serde(rename = "firstQuartile")]
    pub first_quartile: f64,
    pub median: f64,
    #[serde(rename = "thirdQuartile")]
    pub third_quartile: f64,
    pub max: f64,
    /// Raw finishing positions behind the summary statistics
    #[serde(default)]
    pub positions: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxPlotResponse {
    #[serde(rename = "boxPlots")]
    pub box_plots: Vec<SeasonBoxPlot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_with_string_points() {
        let json = r#"{
            "driver_id": "norris",
            "forename": "Lando",
            "surname": "Norris",
            "number": 4,
            "nationality": "British",
            "points": "183"
        }"#;
        let d: Driver = serde_json::from_str(json).unwrap();
        assert_eq!(d.driver_number, Some(4));
        assert_eq!(d.points, Some(183.0));
        assert_eq!(d.full_name(), "Lando Norris");
    }

    #[test]
    fn test_parse_standings_response() {
        let json = r#"{"races":[{"round":3,"grid":2,"result":1},{"round":1,"grid":5,"result":4}]}"#;
        let resp: StandingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.races.len(), 2);
        assert_eq!(resp.races[0].round, 3);
        assert_eq!(resp.races[1].grid, 5);
    }

    #[test]
    fn test_parse_boxplot_camel_case() {
        let json = r#"{"boxPlots":[{
            "x": 2024,
            "min": 1.0,
            "firstQuartile": 2.0,
            "median": 4.0,
            "thirdQuartile": 8.0,
            "max": 15.0,
            "positions": [1.0, 2.0, 4.0, 8.0, 15.0, 9.0]
        }]}"#;
        let resp: BoxPlotResponse = serde_json::from_str(json).unwrap();
        let plot = &resp.box_plots[0];
        assert_eq!(plot.x, 2024);
        assert_eq!(plot.first_quartile, 2.0);
        assert_eq!(plot.third_quartile, 8.0);
        assert_eq!(plot.positions.len(), 6);
    }
}
