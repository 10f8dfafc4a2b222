//! F1Insight TUI - a terminal front end for the F1Insight backend.
//!
//! This application provides a fast, keyboard-driven interface for F1
//! championship standings, driver and team statistics with charts, and the
//! prediction-game (betting) features.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use f1insight_tui::api::ApiClient;
use f1insight_tui::app::{App, AppState};
use f1insight_tui::auth::{FileTokenStore, Session};
use f1insight_tui::config::Config;
use f1insight_tui::ui::input::handle_input;
use f1insight_tui::ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name in the state directory
const LOG_FILE: &str = "f1insight.log";

/// Initialize the tracing subscriber.
///
/// Logs go to a file in the state directory, never to the terminal the TUI
/// draws on. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
/// The returned guard must stay alive for the duration of the program.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let state_dir = Config::state_dir().ok()?;
    std::fs::create_dir_all(&state_dir).ok()?;

    let appender = tracing_appender::rolling::never(state_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return cli_login().await;
    }

    let _guard = init_tracing();
    info!("F1Insight TUI starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and start loading catalog data in the background
    let mut app = App::new()?;
    app.refresh_catalog();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("F1Insight TUI shutting down");
    Ok(())
}

/// Headless login: authenticate once and persist the token pair, so the TUI
/// (or scripts driving the API) start from a logged-in session.
async fn cli_login() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    print!("Username: ");
    io::stdout().flush()?;
    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim().to_string();

    let password = rpassword::prompt_password("Password: ")?;

    let api = ApiClient::new(&config.resolved_base_url())?;
    let pair = api.login(&username, &password).await?;

    let state_dir = Config::state_dir()?;
    let mut session = Session::new(Box::new(FileTokenStore::new(state_dir)));
    session.login(&username, &pair.access, &pair.refresh)?;

    let mut config = config;
    config.last_username = Some(username.clone());
    config.save()?;

    println!("Logged in as {}", username);
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
