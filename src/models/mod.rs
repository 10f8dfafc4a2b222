//! Data models for F1Insight entities.
//!
//! This module contains the typed representations of everything the backend
//! sends, including:
//!
//! - `Driver`, `DriverDetail`, `RaceResult`, `SeasonBoxPlot`: catalog data
//! - `Team`, `TeamDetail`: constructor catalog data
//! - `DriverStandingRow`, `TeamStandingRow`: championship standings tables
//! - Betting types: `GroupSummary`, `GroupInfo`, `Bet`, `EvaluatedBet`, ...
//!
//! Responses are parsed at the HTTP boundary into these structs; the wire
//! format is camelCase in places and snake_case in others, mapped with
//! explicit serde attributes.

pub mod betting;
pub mod driver;
pub mod standings;
pub mod team;

pub use betting::{
    Bet, BetPayload, BetStat, CreateGroupResponse, EvaluatedBet, EvaluatedBetsResponse,
    GroupInfo, GroupStandingsEntry, GroupSummary, GroupsResponse, RaceToBet, StatusResponse,
};
pub use driver::{
    BoxPlotResponse, Driver, DriverDetail, DriverDetailResponse, DriversResponse, RaceResult,
    SeasonBoxPlot, StandingsResponse,
};
pub use standings::{DriverStandingRow, TeamStandingRow};
pub use team::{Team, TeamDetail, TeamDetailResponse, TeamsResponse};

use serde::{Deserialize, Deserializer};

/// Deserialize a numeric field the backend may serve as a number, a numeric
/// string, or null. The standings tables store points as text in places.
pub(crate) fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        None,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(Some(n)),
        Raw::Text(s) => Ok(s.trim().parse().ok()),
        Raw::None => Ok(None),
    }
}

/// Same leniency for integer fields (grid/finishing positions as strings).
pub(crate) fn flexible_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flexible_f64(deserializer)?.map(|n| n as i64))
}
