//! Application state management for the F1Insight TUI.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, fetched catalog data, the session, and
//! background task coordination.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, AuthedClient};
use crate::auth::{CredentialStore, FileTokenStore, Session};
use crate::config::Config;
use crate::models::{
    Bet, BetPayload, Driver, DriverDetail, DriverStandingRow, EvaluatedBetsResponse, GroupInfo,
    GroupSummary, RaceResult, RaceToBet, SeasonBoxPlot, Team, TeamDetail, TeamStandingRow,
};
use crate::utils::contains_ignore_case;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full refresh is at most a handful of fetches; 32 leaves headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for bet form fields and group names
const MAX_FIELD_LENGTH: usize = 60;

/// Number of items to scroll on page up/down
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Season shown on startup; adjustable from the standings tab
pub const DEFAULT_SEASON: i32 = 2025;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Standings,
    Drivers,
    Teams,
    Betting,
}

impl Tab {
    /// Get the display title for this tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Standings => "Standings",
            Tab::Drivers => "Drivers",
            Tab::Teams => "Teams",
            Tab::Betting => "Betting",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Standings => Tab::Drivers,
            Tab::Drivers => Tab::Teams,
            Tab::Teams => Tab::Betting,
            Tab::Betting => Tab::Standings,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Standings => Tab::Betting,
            Tab::Drivers => Tab::Standings,
            Tab::Teams => Tab::Drivers,
            Tab::Betting => Tab::Teams,
        }
    }
}

/// Standings tab sub-view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandingsView {
    Drivers,
    Teams,
}

/// Detail panel sub-view on the Drivers and Teams tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailView {
    Stats,
    RaceChart,
    BoxPlot,
}

impl DetailView {
    pub fn next(&self) -> Self {
        match self {
            DetailView::Stats => DetailView::RaceChart,
            DetailView::RaceChart => DetailView::BoxPlot,
            DetailView::BoxPlot => DetailView::Stats,
        }
    }
}

/// Betting tab sub-view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BettingView {
    Groups,
    GroupDetail,
    Races,
    BetForm,
    BetShow,
    Evaluated,
    CreateGroup,
    JoinGroup,
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    LoginButton,
    RegisterButton,
}

/// Transient bet form contents, held only while the form is open.
#[derive(Debug, Clone, Default)]
pub struct BetForm {
    pub race_id: String,
    pub top_3: [String; 3],
    pub last_5: String,
    pub last_10: String,
    pub fastest_lap: String,
    pub focus: usize,
    /// True when editing an existing bet (PUT instead of POST)
    pub editing: bool,
}

/// Number of editable fields in the bet form
pub const BET_FORM_FIELDS: usize = 6;

impl BetForm {
    pub fn from_bet(race_id: &str, bet: &Bet) -> Self {
        Self {
            race_id: race_id.to_string(),
            top_3: bet.bet_top_3.clone(),
            last_5: bet.bet_last_5.clone(),
            last_10: bet.bet_last_10.clone(),
            fastest_lap: bet.bet_fastest_lap.clone(),
            focus: 0,
            editing: true,
        }
    }

    pub fn field_mut(&mut self, index: usize) -> &mut String {
        match index {
            0..=2 => &mut self.top_3[index],
            3 => &mut self.last_5,
            4 => &mut self.last_10,
            _ => &mut self.fastest_lap,
        }
    }

    pub fn focused_field_mut(&mut self) -> &mut String {
        let focus = self.focus.min(BET_FORM_FIELDS - 1);
        self.field_mut(focus)
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % BET_FORM_FIELDS;
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + BET_FORM_FIELDS - 1) % BET_FORM_FIELDS;
    }

    pub fn is_complete(&self) -> bool {
        self.top_3.iter().all(|f| !f.trim().is_empty())
            && !self.last_5.trim().is_empty()
            && !self.last_10.trim().is_empty()
            && !self.fastest_lap.trim().is_empty()
    }

    pub fn payload(&self, group_id: Option<i64>) -> BetPayload {
        BetPayload {
            race: if self.editing { None } else { Some(self.race_id.clone()) },
            group: if self.editing { None } else { group_id },
            bet_top_3: self.top_3.clone(),
            bet_last_5: self.last_5.trim().to_string(),
            bet_last_10: self.last_10.trim().to_string(),
            bet_fastest_lap: self.fastest_lap.trim().to_string(),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background fetch tasks back to the main loop.
///
/// Variants carrying a generation number belong to a fetch superseded by
/// newer input when the number no longer matches; those results are
/// discarded instead of applied.
enum FetchResult {
    Championship(i32, Result<(Vec<DriverStandingRow>, Vec<TeamStandingRow>), String>),
    Drivers(Result<Vec<Driver>, String>),
    Teams(Result<Vec<Team>, String>),
    DriverDetail(u64, Result<Box<(DriverDetail, Vec<RaceResult>, Vec<SeasonBoxPlot>)>, String>),
    CompareDriver(u64, Result<(Vec<RaceResult>, Vec<SeasonBoxPlot>), String>),
    TeamDetail(u64, Result<Box<(TeamDetail, Vec<RaceResult>, Vec<SeasonBoxPlot>)>, String>),
    Groups(Result<Vec<GroupSummary>, String>),
    GroupInfo(u64, Result<GroupInfo, String>),
    RacesToBet(Result<Vec<RaceToBet>, String>),
    BetLoaded(String, Result<Bet, String>),
    Evaluated(u64, Result<EvaluatedBetsResponse, String>),
    /// Outcome of the profile liveness probe guarding the betting views
    AuthProbe(bool),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub authed: AuthedClient,
    session: Arc<Mutex<Session>>,

    // UI state
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Standings tab
    pub standings_view: StandingsView,
    pub standings_season: i32,
    pub standings_selection: usize,
    pub driver_standings: Vec<DriverStandingRow>,
    pub team_standings: Vec<TeamStandingRow>,
    pub standings_loading: bool,
    pub standings_error: Option<String>,

    // Drivers tab
    pub drivers: Vec<Driver>,
    pub drivers_error: Option<String>,
    pub driver_selection: usize,
    pub detail_view: DetailView,
    pub driver_detail: Option<DriverDetail>,
    pub driver_races: Vec<RaceResult>,
    pub driver_box_plots: Vec<SeasonBoxPlot>,
    pub driver_detail_error: Option<String>,
    pub driver_detail_loading: bool,
    /// Driver compared against the selected one, by catalog index
    pub compare_selection: Option<usize>,
    pub compare_races: Vec<RaceResult>,
    pub compare_box_plots: Vec<SeasonBoxPlot>,
    driver_generation: u64,

    // Teams tab
    pub teams: Vec<Team>,
    pub teams_error: Option<String>,
    pub team_selection: usize,
    pub team_detail_view: DetailView,
    pub team_detail: Option<TeamDetail>,
    pub team_races: Vec<RaceResult>,
    pub team_box_plots: Vec<SeasonBoxPlot>,
    pub team_detail_error: Option<String>,
    team_generation: u64,

    // Betting tab
    pub betting_view: BettingView,
    pub betting_authorized: bool,
    /// Username mirror for synchronous render code; the session owns the truth
    pub display_username: Option<String>,
    pub groups: Vec<GroupSummary>,
    pub group_selection: usize,
    pub group_info: Option<GroupInfo>,
    pub races_to_bet: Vec<RaceToBet>,
    pub race_selection: usize,
    pub current_bet: Option<Bet>,
    pub evaluated: Option<EvaluatedBetsResponse>,
    pub bet_form: BetForm,
    pub group_name_input: String,
    pub betting_error: Option<String>,
    pub betting_loading: bool,
    group_generation: u64,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchResult>,
    fetch_tx: mpsc::Sender<FetchResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let state_dir = Config::state_dir()?;
        let session = Session::new(Box::new(FileTokenStore::new(state_dir)));
        Self::with_session(config, session)
    }

    /// Create an application around an already-constructed session.
    /// The session store is injected here; nothing in the app reaches for
    /// ambient global state.
    pub fn with_session(config: Config, session: Session) -> Result<Self> {
        let api = ApiClient::new(&config.resolved_base_url())?;
        let display_username = session.username().map(str::to_string);
        let session = Arc::new(Mutex::new(session));
        let authed = AuthedClient::new(api.clone(), Arc::clone(&session));

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_username = std::env::var("F1INSIGHT_USERNAME")
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var("F1INSIGHT_PASSWORD").unwrap_or_default();

        Ok(Self {
            config,
            api,
            authed,
            session,

            state: AppState::Normal,
            current_tab: Tab::Standings,
            focus: Focus::List,
            search_query: String::new(),

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            standings_view: StandingsView::Drivers,
            standings_season: DEFAULT_SEASON,
            standings_selection: 0,
            driver_standings: Vec::new(),
            team_standings: Vec::new(),
            standings_loading: false,
            standings_error: None,

            drivers: Vec::new(),
            drivers_error: None,
            driver_selection: 0,
            detail_view: DetailView::Stats,
            driver_detail: None,
            driver_races: Vec::new(),
            driver_box_plots: Vec::new(),
            driver_detail_error: None,
            driver_detail_loading: false,
            compare_selection: None,
            compare_races: Vec::new(),
            compare_box_plots: Vec::new(),
            driver_generation: 0,

            teams: Vec::new(),
            teams_error: None,
            team_selection: 0,
            team_detail_view: DetailView::Stats,
            team_detail: None,
            team_races: Vec::new(),
            team_box_plots: Vec::new(),
            team_detail_error: None,
            team_generation: 0,

            betting_view: BettingView::Groups,
            betting_authorized: false,
            display_username,
            groups: Vec::new(),
            group_selection: 0,
            group_info: None,
            races_to_bet: Vec::new(),
            race_selection: 0,
            current_bet: None,
            evaluated: None,
            bet_form: BetForm::default(),
            group_name_input: String::new(),
            betting_error: None,
            betting_loading: false,
            group_generation: 0,

            fetch_rx: rx,
            fetch_tx: tx,

            status_message: None,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_authenticated()
    }

    pub async fn username(&self) -> Option<String> {
        self.session.lock().await.username().map(str::to_string)
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login (or registration) with the credentials from the form
    pub async fn attempt_login(&mut self, register: bool) -> Result<()> {
        let username = self.login_username.trim().to_string();
        let password = self.login_password.clone();

        if username.is_empty() || password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        let outcome = if register {
            self.api.register(&username, &password).await
        } else {
            self.api.login(&username, &password).await
        };

        match outcome {
            Ok(pair) => {
                {
                    let mut session = self.session.lock().await;
                    if let Err(e) = session.login(&username, &pair.access, &pair.refresh) {
                        warn!(error = %e, "Failed to persist session tokens");
                    }
                }

                if let Err(e) = CredentialStore::store(&username, &password) {
                    warn!(error = %e, "Failed to store credentials");
                }

                self.config.last_username = Some(username);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.state = AppState::Normal;
                self.betting_authorized = true;
                self.display_username = Some(self.config.last_username.clone().unwrap_or_default());
                info!(register, "Login successful");
                self.refresh_betting();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let message = if e.is_unauthorized() {
                    "Invalid username or password".to_string()
                } else {
                    e.to_string()
                };
                self.login_error = Some(message);
                Err(e.into())
            }
        }
    }

    /// Fill the password field from the OS keychain if we remembered one
    pub fn prefill_stored_password(&mut self) {
        if self.login_password.is_empty() && !self.login_username.is_empty() {
            if let Ok(password) = CredentialStore::get_password(self.login_username.trim()) {
                self.login_password = password;
            }
        }
    }

    pub async fn logout(&mut self) {
        self.session.lock().await.logout();
        self.betting_authorized = false;
        self.display_username = None;
        self.groups.clear();
        self.group_info = None;
        self.evaluated = None;
        self.status_message = Some("Logged out".to_string());
        info!("Logged out");
    }

    // =========================================================================
    // Catalog fetches
    // =========================================================================

    /// Spawn background fetches for everything the catalog tabs show
    pub fn refresh_catalog(&mut self) {
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.current_drivers().await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::Drivers(result)).await;
        });

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = api.current_teams().await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::Teams(result)).await;
        });

        self.refresh_standings();
        self.status_message = Some("Refreshing data...".to_string());
    }

    /// Fetch both championship tables for the selected season
    pub fn refresh_standings(&mut self) {
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        let season = self.standings_season;
        self.standings_loading = true;
        self.standings_error = None;
        tokio::spawn(async move {
            let result = futures::future::try_join(
                api.driver_championship(season),
                api.team_championship(season),
            )
            .await
            .map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::Championship(season, result)).await;
        });
    }

    /// Step the standings season and reload both tables
    pub fn change_standings_season(&mut self, delta: i32) {
        self.standings_season += delta;
        self.standings_selection = 0;
        self.refresh_standings();
    }

    /// Drivers filtered by the search query
    pub fn filtered_drivers(&self) -> Vec<&Driver> {
        if self.search_query.is_empty() {
            self.drivers.iter().collect()
        } else {
            self.drivers
                .iter()
                .filter(|d| {
                    contains_ignore_case(&d.full_name(), &self.search_query)
                        || d.team
                            .as_deref()
                            .map(|t| contains_ignore_case(t, &self.search_query))
                            .unwrap_or(false)
                })
                .collect()
        }
    }

    /// Load detail, season standings and box plots for the selected driver.
    /// Bumps the generation counter so a response for a previously selected
    /// driver can never overwrite this one.
    pub fn load_driver_detail(&mut self) {
        let driver = match self.filtered_drivers().get(self.driver_selection) {
            Some(d) => (*d).clone(),
            None => return,
        };

        self.driver_generation += 1;
        let generation = self.driver_generation;
        self.driver_detail_loading = true;
        self.driver_detail_error = None;

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        let season = self.standings_season;
        tokio::spawn(async move {
            let result = futures::future::try_join3(
                api.driver_detail(&driver.driver_id),
                api.driver_standings(&driver.driver_id, season),
                api.driver_box_plots(&driver.driver_id),
            )
            .await
            .map(|(detail, races, plots)| Box::new((detail, races, plots)))
            .map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::DriverDetail(generation, result)).await;
        });
    }

    /// Mark the currently selected driver as the comparison partner and
    /// fetch their chart data under the same generation.
    pub fn set_compare_driver(&mut self, index: usize) {
        let driver = match self.filtered_drivers().get(index) {
            Some(d) => (*d).clone(),
            None => return,
        };
        self.compare_selection = Some(index);

        let generation = self.driver_generation;
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        let season = self.standings_season;
        tokio::spawn(async move {
            let result = futures::future::try_join(
                api.driver_standings(&driver.driver_id, season),
                api.driver_box_plots(&driver.driver_id),
            )
            .await
            .map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::CompareDriver(generation, result)).await;
        });
    }

    pub fn clear_compare(&mut self) {
        self.compare_selection = None;
        self.compare_races.clear();
        self.compare_box_plots.clear();
    }

    /// Name of the driver at a catalog index, for chart labels
    pub fn driver_name_at(&self, index: Option<usize>) -> Option<String> {
        index
            .and_then(|i| self.filtered_drivers().get(i).map(|d| d.full_name()))
    }

    pub fn load_team_detail(&mut self) {
        let team = match self.teams.get(self.team_selection) {
            Some(t) => t.clone(),
            None => return,
        };

        self.team_generation += 1;
        let generation = self.team_generation;
        self.team_detail_error = None;

        let api = self.api.clone();
        let tx = self.fetch_tx.clone();
        let season = self.standings_season;
        tokio::spawn(async move {
            let result = futures::future::try_join3(
                api.team_detail(&team.team_id),
                api.team_standings(&team.team_id, season),
                api.team_box_plots(&team.team_id),
            )
            .await
            .map(|(detail, races, plots)| Box::new((detail, races, plots)))
            .map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::TeamDetail(generation, result)).await;
        });
    }

    // =========================================================================
    // Betting fetches
    // =========================================================================

    /// Entering the betting tab: probe the session first, then load groups.
    /// An unauthorized probe routes to the login overlay, the way the
    /// original front end redirected its private routes.
    pub fn enter_betting(&mut self) {
        let authed = self.authed.clone();
        let tx = self.fetch_tx.clone();
        self.betting_loading = true;
        tokio::spawn(async move {
            let ok = authed.profile_probe().await.is_ok();
            let _ = tx.send(FetchResult::AuthProbe(ok)).await;
        });
    }

    /// Reload the group list
    pub fn refresh_betting(&mut self) {
        let authed = self.authed.clone();
        let tx = self.fetch_tx.clone();
        self.betting_loading = true;
        self.betting_error = None;
        tokio::spawn(async move {
            let result = authed.all_groups().await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::Groups(result)).await;
        });
    }

    /// Groups the logged-in user is a member of
    pub fn my_groups(&self, username: &str) -> Vec<&GroupSummary> {
        self.groups
            .iter()
            .filter(|g| g.members.iter().any(|m| m == username))
            .collect()
    }

    /// The group list the current betting view shows: the full catalog when
    /// joining, otherwise only the user's own groups. `group_selection`
    /// always indexes this list.
    pub fn visible_groups(&self) -> Vec<&GroupSummary> {
        if self.betting_view == BettingView::JoinGroup {
            self.groups.iter().collect()
        } else {
            let username = self.display_username.clone().unwrap_or_default();
            self.my_groups(&username)
        }
    }

    pub fn selected_group(&self) -> Option<&GroupSummary> {
        self.visible_groups().get(self.group_selection).copied()
    }

    pub fn open_group(&mut self) {
        let group_id = match self.selected_group() {
            Some(g) => g.group_id,
            None => return,
        };

        self.group_generation += 1;
        let generation = self.group_generation;
        self.group_info = None;
        self.betting_error = None;
        self.betting_view = BettingView::GroupDetail;

        let authed = self.authed.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = authed.group_info(group_id).await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::GroupInfo(generation, result)).await;
        });
    }

    pub fn load_races_to_bet(&mut self) {
        self.betting_view = BettingView::Races;
        self.race_selection = 0;
        self.betting_error = None;

        let authed = self.authed.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = authed.available_races().await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::RacesToBet(result)).await;
        });
    }

    /// Load the user's bet for the selected race into the show view
    pub fn load_bet(&mut self) {
        let race_id = match self.races_to_bet.get(self.race_selection) {
            Some(r) => r.id.clone(),
            None => return,
        };
        self.current_bet = None;
        self.betting_view = BettingView::BetShow;
        self.betting_error = None;

        let authed = self.authed.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = authed.show_bet(&race_id).await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::BetLoaded(race_id, result)).await;
        });
    }

    /// Open a blank bet form for the selected race
    pub fn start_bet(&mut self) {
        if let Some(race) = self.races_to_bet.get(self.race_selection) {
            self.bet_form = BetForm {
                race_id: race.id.clone(),
                ..BetForm::default()
            };
            self.betting_view = BettingView::BetForm;
            self.betting_error = None;
        }
    }

    /// Open the bet form pre-filled with the currently shown bet
    pub fn edit_bet(&mut self) {
        let bet = match self.current_bet.clone() {
            Some(b) => b,
            None => return,
        };
        let race_id = match self.races_to_bet.get(self.race_selection) {
            Some(r) => r.id.clone(),
            None => return,
        };
        self.bet_form = BetForm::from_bet(&race_id, &bet);
        self.betting_view = BettingView::BetForm;
        self.betting_error = None;
    }

    /// Submit the bet form: POST for new bets, PUT when editing
    pub async fn submit_bet(&mut self) {
        if !self.bet_form.is_complete() {
            self.betting_error = Some("All fields are required".to_string());
            return;
        }
        let group_id = self.selected_group().map(|g| g.group_id);
        let payload = self.bet_form.payload(group_id);

        let outcome = if self.bet_form.editing {
            self.authed.update_bet(&self.bet_form.race_id, &payload).await
        } else {
            self.authed.create_bet(&payload).await
        };

        match outcome {
            Ok(_) => {
                self.status_message = Some("Bet saved".to_string());
                self.betting_view = BettingView::Races;
            }
            Err(e) => {
                warn!(error = %e, "Failed to save bet");
                self.betting_error = Some(e.to_string());
            }
        }
    }

    pub async fn delete_bet(&mut self) {
        let race_id = match self.races_to_bet.get(self.race_selection) {
            Some(r) => r.id.clone(),
            None => return,
        };
        match self.authed.delete_bet(&race_id).await {
            Ok(()) => {
                self.current_bet = None;
                self.status_message = Some("Bet deleted".to_string());
                self.betting_view = BettingView::Races;
            }
            Err(e) => {
                warn!(error = %e, "Failed to delete bet");
                self.betting_error = Some(e.to_string());
            }
        }
    }

    pub fn load_evaluated_bets(&mut self) {
        let group_name = match self.selected_group() {
            Some(g) => g.group_name.clone(),
            None => return,
        };
        self.group_generation += 1;
        let generation = self.group_generation;
        self.evaluated = None;
        self.betting_view = BettingView::Evaluated;
        self.betting_error = None;

        let authed = self.authed.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = authed.evaluated_bets(&group_name).await.map_err(|e| e.to_string());
            let _ = tx.send(FetchResult::Evaluated(generation, result)).await;
        });
    }

    pub async fn create_group(&mut self) {
        let name = self.group_name_input.trim().to_string();
        if name.is_empty() {
            self.betting_error = Some("Group name required".to_string());
            return;
        }
        match self.authed.create_group(&name).await {
            Ok(_) => {
                self.status_message = Some(format!("Group '{}' created", name));
                self.group_name_input.clear();
                self.betting_view = BettingView::Groups;
                self.refresh_betting();
            }
            Err(e) => {
                warn!(error = %e, "Failed to create group");
                self.betting_error = Some(e.to_string());
            }
        }
    }

    pub async fn join_group(&mut self) {
        let (name, join_id) = match self.selected_group() {
            Some(g) => (g.group_name.clone(), g.join_link.clone()),
            None => return,
        };
        match self.authed.join_group(&name, join_id.as_deref()).await {
            Ok(_) => {
                self.status_message = Some(format!("Joined '{}'", name));
                self.betting_view = BettingView::Groups;
                self.refresh_betting();
            }
            Err(e) => {
                warn!(error = %e, "Failed to join group");
                self.betting_error = Some(e.to_string());
            }
        }
    }

    pub async fn leave_group(&mut self) {
        let name = match self.selected_group() {
            Some(g) => g.group_name.clone(),
            None => return,
        };
        match self.authed.leave_group(&name).await {
            Ok(_) => {
                self.status_message = Some(format!("Left '{}'", name));
                self.betting_view = BettingView::Groups;
                self.refresh_betting();
            }
            Err(e) => {
                warn!(error = %e, "Failed to leave group");
                self.betting_error = Some(e.to_string());
            }
        }
    }

    // =========================================================================
    // Background task processing
    // =========================================================================

    /// Drain the channel and apply completed fetches
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.fetch_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_fetch_result(result);
        }
    }

    fn process_fetch_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::Championship(season, result) => {
                // A season switch supersedes any in-flight table fetch
                if season != self.standings_season {
                    debug!(season, "Discarding stale standings response");
                    return;
                }
                self.standings_loading = false;
                match result {
                    Ok((drivers, teams)) => {
                        self.driver_standings = drivers;
                        self.team_standings = teams;
                        self.status_message = None;
                    }
                    Err(e) => self.standings_error = Some(e),
                }
            }
            FetchResult::Drivers(result) => match result {
                Ok(drivers) => {
                    self.drivers = drivers;
                    self.driver_selection = 0;
                    self.drivers_error = None;
                }
                Err(e) => self.drivers_error = Some(e),
            },
            FetchResult::Teams(result) => match result {
                Ok(teams) => {
                    self.teams = teams;
                    self.team_selection = 0;
                    self.teams_error = None;
                }
                Err(e) => self.teams_error = Some(e),
            },
            FetchResult::DriverDetail(generation, result) => {
                if generation != self.driver_generation {
                    debug!(generation, "Discarding stale driver detail response");
                    return;
                }
                self.driver_detail_loading = false;
                match result {
                    Ok(data) => {
                        let (detail, races, plots) = *data;
                        self.driver_detail = Some(detail);
                        self.driver_races = races;
                        self.driver_box_plots = plots;
                    }
                    Err(e) => self.driver_detail_error = Some(e),
                }
            }
            FetchResult::CompareDriver(generation, result) => {
                if generation != self.driver_generation {
                    debug!(generation, "Discarding stale comparison response");
                    return;
                }
                match result {
                    Ok((races, plots)) => {
                        self.compare_races = races;
                        self.compare_box_plots = plots;
                    }
                    Err(e) => self.driver_detail_error = Some(e),
                }
            }
            FetchResult::TeamDetail(generation, result) => {
                if generation != self.team_generation {
                    debug!(generation, "Discarding stale team detail response");
                    return;
                }
                match result {
                    Ok(data) => {
                        let (detail, races, plots) = *data;
                        self.team_detail = Some(detail);
                        self.team_races = races;
                        self.team_box_plots = plots;
                    }
                    Err(e) => self.team_detail_error = Some(e),
                }
            }
            FetchResult::Groups(result) => {
                self.betting_loading = false;
                match result {
                    Ok(groups) => {
                        self.groups = groups;
                        if self.group_selection >= self.groups.len() {
                            self.group_selection = 0;
                        }
                        self.betting_error = None;
                    }
                    Err(e) => self.betting_error = Some(e),
                }
            }
            FetchResult::GroupInfo(generation, result) => {
                if generation != self.group_generation {
                    debug!(generation, "Discarding stale group info response");
                    return;
                }
                match result {
                    Ok(info) => self.group_info = Some(info),
                    Err(e) => self.betting_error = Some(e),
                }
            }
            FetchResult::RacesToBet(result) => match result {
                Ok(races) => {
                    self.races_to_bet = races;
                    self.betting_error = None;
                }
                Err(e) => self.betting_error = Some(e),
            },
            FetchResult::BetLoaded(race_id, result) => match result {
                Ok(bet) => self.current_bet = Some(bet),
                Err(e) => {
                    debug!(race_id, error = %e, "No bet to show");
                    self.betting_error = Some(e);
                }
            },
            FetchResult::Evaluated(generation, result) => {
                if generation != self.group_generation {
                    debug!(generation, "Discarding stale evaluated bets response");
                    return;
                }
                match result {
                    Ok(data) => self.evaluated = Some(data),
                    Err(e) => self.betting_error = Some(e),
                }
            }
            FetchResult::AuthProbe(ok) => {
                self.betting_loading = false;
                self.betting_authorized = ok;
                if ok {
                    self.refresh_betting();
                } else {
                    // Not logged in (or refresh failed): route to login
                    self.start_login();
                }
            }
        }
    }
}

// ============================================================================
// Input validation
// ============================================================================

/// Whether a character may be appended to the username field
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && !c.is_control()
}

/// Whether a character may be appended to the password field
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && !c.is_control()
}

/// Whether a character may be appended to a bet form or group name field
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && !c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::models::GroupStandingsEntry;

    fn test_app() -> App {
        let session = Session::new(Box::new(MemoryTokenStore::default()));
        App::with_session(Config::default(), session).unwrap()
    }

    // -------------------------------------------------------------------------
    // Tab tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next_wraps() {
        assert_eq!(Tab::Standings.next(), Tab::Drivers);
        assert_eq!(Tab::Drivers.next(), Tab::Teams);
        assert_eq!(Tab::Teams.next(), Tab::Betting);
        assert_eq!(Tab::Betting.next(), Tab::Standings);
    }

    #[test]
    fn test_tab_prev_wraps() {
        assert_eq!(Tab::Standings.prev(), Tab::Betting);
        assert_eq!(Tab::Betting.prev(), Tab::Teams);
        assert_eq!(Tab::Teams.prev(), Tab::Drivers);
        assert_eq!(Tab::Drivers.prev(), Tab::Standings);
    }

    // -------------------------------------------------------------------------
    // Input validation tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        assert!(!can_add_username_char(0, '\n'));
        assert!(!can_add_username_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, 'a'));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    // -------------------------------------------------------------------------
    // Bet form tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_bet_form_field_cycle() {
        let mut form = BetForm::default();
        assert_eq!(form.focus, 0);
        for _ in 0..BET_FORM_FIELDS {
            form.next_field();
        }
        assert_eq!(form.focus, 0);
        form.prev_field();
        assert_eq!(form.focus, BET_FORM_FIELDS - 1);
    }

    #[test]
    fn test_bet_form_completeness() {
        let mut form = BetForm::default();
        assert!(!form.is_complete());

        form.top_3 = ["ver".into(), "nor".into(), "lec".into()];
        form.last_5 = "str".into();
        form.last_10 = "alb".into();
        form.fastest_lap = "nor".into();
        assert!(form.is_complete());

        form.last_5 = "   ".into();
        assert!(!form.is_complete());
    }

    #[test]
    fn test_bet_form_payload_addressing() {
        let mut form = BetForm {
            race_id: "monza-2026".into(),
            top_3: ["a".into(), "b".into(), "c".into()],
            last_5: "d".into(),
            last_10: "e".into(),
            fastest_lap: "f".into(),
            focus: 0,
            editing: false,
        };

        // New bets carry race and group
        let payload = form.payload(Some(7));
        assert_eq!(payload.race.as_deref(), Some("monza-2026"));
        assert_eq!(payload.group, Some(7));

        // Updates are addressed by URL, not body
        form.editing = true;
        let payload = form.payload(Some(7));
        assert!(payload.race.is_none());
        assert!(payload.group.is_none());
    }

    // -------------------------------------------------------------------------
    // Generation counter tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_stale_driver_detail_is_discarded() {
        let mut app = test_app();
        app.driver_generation = 3;

        let stale = FetchResult::DriverDetail(
            2,
            Ok(Box::new((DriverDetail::default(), vec![], vec![]))),
        );
        app.process_fetch_result(stale);
        assert!(app.driver_detail.is_none());

        let current = FetchResult::DriverDetail(
            3,
            Ok(Box::new((DriverDetail::default(), vec![], vec![]))),
        );
        app.process_fetch_result(current);
        assert!(app.driver_detail.is_some());
    }

    #[test]
    fn test_stale_standings_season_is_discarded() {
        let mut app = test_app();
        app.standings_season = 2025;

        let stale = FetchResult::Championship(2024, Ok((vec![], vec![])));
        app.process_fetch_result(stale);
        // The loading flag belongs to the 2025 fetch; a stale 2024 response
        // must not clear it
        app.standings_loading = true;
        let stale = FetchResult::Championship(2024, Ok((vec![], vec![])));
        app.process_fetch_result(stale);
        assert!(app.standings_loading);
    }

    #[test]
    fn test_stale_evaluated_bets_discarded() {
        let mut app = test_app();
        app.group_generation = 5;

        let stale = FetchResult::Evaluated(
            4,
            Ok(EvaluatedBetsResponse {
                bets: vec![],
                standings: vec![GroupStandingsEntry { user: "x".into(), points: 1 }],
            }),
        );
        app.process_fetch_result(stale);
        assert!(app.evaluated.is_none());
    }

    #[test]
    fn test_failed_probe_routes_to_login() {
        let mut app = test_app();
        app.process_fetch_result(FetchResult::AuthProbe(false));
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(!app.betting_authorized);
    }

    // -------------------------------------------------------------------------
    // Group filtering
    // -------------------------------------------------------------------------

    #[test]
    fn test_my_groups_filters_by_membership() {
        let mut app = test_app();
        app.groups = vec![
            GroupSummary {
                group_id: 1,
                group_name: "a".into(),
                owner: None,
                created_at: None,
                members: vec!["lando".into(), "oscar".into()],
                join_link: None,
            },
            GroupSummary {
                group_id: 2,
                group_name: "b".into(),
                owner: None,
                created_at: None,
                members: vec!["oscar".into()],
                join_link: None,
            },
        ];
        let mine = app.my_groups("lando");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].group_id, 1);
    }
}
