//! API client for the F1Insight backend REST API.
//!
//! This module provides the `ApiClient` struct for the unauthenticated
//! surface: login/register/refresh and the public catalog endpoints
//! (drivers, teams, standings, chart data).
//!
//! The betting game and the profile probe require a bearer token and go
//! through [`super::authed::AuthedClient`] instead.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    BoxPlotResponse, Driver, DriverDetail, DriverDetailResponse, DriverStandingRow,
    DriversResponse, RaceResult, SeasonBoxPlot, StandingsResponse, Team, TeamDetail,
    TeamDetailResponse, TeamStandingRow, TeamsResponse,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// The backend computes some statistics on demand; 30s covers the slow paths.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Access/refresh pair issued by login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// API client for the F1Insight backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying reqwest client, shared with the authenticated wrapper
    /// so both sides reuse one connection pool.
    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    pub(crate) async fn check_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.client.post(&url).json(body).send().await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            debug!(url = %url, error = %e, "Failed to parse response body");
            ApiError::InvalidResponse(format!("{}: {}", url, e))
        })
    }

    // ===== Authentication =====

    /// Exchange credentials for an access/refresh token pair
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        self.post(
            "/api/auth/login/",
            &serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Create an account; the backend logs the new user straight in
    pub async fn register(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        self.post(
            "/api/auth/register/",
            &serde_json::json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Mint a new access token from a refresh token. Single attempt; the
    /// fail-closed policy around it lives in `Session::refresh_access_token`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let response: RefreshResponse = self
            .post("/api/auth/refresh/", &serde_json::json!({ "refresh": refresh_token }))
            .await?;
        Ok(response.access)
    }

    // ===== Catalog =====

    /// Fetch the current season's driver roster
    pub async fn current_drivers(&self) -> Result<Vec<Driver>, ApiError> {
        let response: DriversResponse = self
            .post("/api/catalog/getcurrentdrivers", &serde_json::json!({}))
            .await?;
        Ok(response.drivers)
    }

    /// Fetch the current season's constructor roster
    pub async fn current_teams(&self) -> Result<Vec<Team>, ApiError> {
        let response: TeamsResponse = self
            .post("/api/catalog/getcurrentteams", &serde_json::json!({}))
            .await?;
        Ok(response.teams)
    }

    /// Fetch career and current-season statistics for one driver
    pub async fn driver_detail(&self, driver_id: &str) -> Result<DriverDetail, ApiError> {
        let response: DriverDetailResponse = self
            .post(
                "/api/catalog/driver/detailedview",
                &serde_json::json!({ "driver_id": driver_id }),
            )
            .await?;
        Ok(response.driver)
    }

    /// Fetch race-by-race grid/result positions for a driver's season.
    /// Rounds come back in no particular order; sorted here so chart
    /// consumers can rely on ascending rounds.
    pub async fn driver_standings(
        &self,
        driver_id: &str,
        season: i32,
    ) -> Result<Vec<RaceResult>, ApiError> {
        let response: StandingsResponse = self
            .post(
                "/api/catalog/driver/getstandings",
                &serde_json::json!({ "driver_id": driver_id, "season": season }),
            )
            .await?;
        let mut races = response.races;
        races.sort_by_key(|r| r.round);
        Ok(races)
    }

    /// Fetch per-season finishing-position summaries for a driver
    pub async fn driver_box_plots(&self, driver_id: &str) -> Result<Vec<SeasonBoxPlot>, ApiError> {
        let response: BoxPlotResponse = self
            .post(
                "/api/catalog/driver/getboxplot",
                &serde_json::json!({ "driver_id": driver_id }),
            )
            .await?;
        Ok(response.box_plots)
    }

    /// Fetch career and current-season statistics for one team
    pub async fn team_detail(&self, team_id: &str) -> Result<TeamDetail, ApiError> {
        let response: TeamDetailResponse = self
            .post(
                "/api/catalog/team/detailedview",
                &serde_json::json!({ "team_id": team_id }),
            )
            .await?;
        Ok(response.team)
    }

    /// Fetch race-by-race positions for a team's season (best classified car)
    pub async fn team_standings(
        &self,
        team_id: &str,
        season: i32,
    ) -> Result<Vec<RaceResult>, ApiError> {
        let response: StandingsResponse = self
            .post(
                "/api/catalog/team/getstandings",
                &serde_json::json!({ "team_id": team_id, "season": season }),
            )
            .await?;
        let mut races = response.races;
        races.sort_by_key(|r| r.round);
        Ok(races)
    }

    /// Fetch per-season finishing-position summaries for a team
    pub async fn team_box_plots(&self, team_id: &str) -> Result<Vec<SeasonBoxPlot>, ApiError> {
        let response: BoxPlotResponse = self
            .post(
                "/api/catalog/team/getboxplot",
                &serde_json::json!({ "team_id": team_id }),
            )
            .await?;
        Ok(response.box_plots)
    }

    // ===== Championship standings tables =====
    // The backend spells these routes "insigth"; kept as-is on the wire.

    /// Fetch the driver championship table for a season
    pub async fn driver_championship(&self, year: i32) -> Result<Vec<DriverStandingRow>, ApiError> {
        self.post(
            "/api/catalog/insigth/getdriverstandings",
            &serde_json::json!({ "year": year }),
        )
        .await
    }

    /// Fetch the constructor championship table for a season
    pub async fn team_championship(&self, year: i32) -> Result<Vec<TeamStandingRow>, ApiError> {
        self.post(
            "/api/catalog/insigth/getteamstanding",
            &serde_json::json!({ "year": year }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.url("/api/auth/login/"), "http://localhost:8000/api/auth/login/");
    }

    #[test]
    fn test_parse_token_pair() {
        let json = r#"{"access":"acc.jwt","refresh":"ref.jwt"}"#;
        let pair: TokenPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.access, "acc.jwt");
        assert_eq!(pair.refresh, "ref.jwt");
    }
}
