//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_field_char, can_add_password_char, can_add_username_char, App, AppState, BettingView,
    DetailView, Focus, LoginFocus, StandingsView, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search input
    if matches!(app.state, AppState::Searching) {
        match key.code {
            KeyCode::Esc => {
                app.search_query.clear();
                app.driver_selection = 0;
                app.state = AppState::Normal;
            }
            KeyCode::Enter => {
                app.state = AppState::Normal;
            }
            KeyCode::Backspace => {
                app.search_query.pop();
                app.driver_selection = 0;
            }
            KeyCode::Char(c) if can_add_field_char(app.search_query.len(), c) => {
                app.search_query.push(c);
                app.driver_selection = 0;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Standings;
            return Ok(false);
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Drivers;
            return Ok(false);
        }
        KeyCode::Char('3') => {
            app.current_tab = Tab::Teams;
            return Ok(false);
        }
        KeyCode::Char('4') => {
            app.current_tab = Tab::Betting;
            app.enter_betting();
            return Ok(false);
        }
        KeyCode::Left => {
            app.current_tab = app.current_tab.prev();
            if app.current_tab == Tab::Betting {
                app.enter_betting();
            }
            return Ok(false);
        }
        KeyCode::Right => {
            app.current_tab = app.current_tab.next();
            if app.current_tab == Tab::Betting {
                app.enter_betting();
            }
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout().await;
            return Ok(false);
        }
        KeyCode::Tab if app.current_tab != Tab::Betting => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
            return Ok(false);
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Standings => handle_standings_input(app, key),
        Tab::Drivers => handle_drivers_input(app, key),
        Tab::Teams => handle_teams_input(app, key),
        Tab::Betting => handle_betting_input(app, key).await?,
    }

    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::LoginButton,
                LoginFocus::LoginButton => LoginFocus::RegisterButton,
                LoginFocus::RegisterButton => LoginFocus::Username,
            };
            if app.login_focus == LoginFocus::Password {
                app.prefill_stored_password();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::RegisterButton,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::LoginButton => LoginFocus::Password,
                LoginFocus::RegisterButton => LoginFocus::LoginButton,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
                app.prefill_stored_password();
            }
            LoginFocus::Password | LoginFocus::LoginButton => {
                let _ = app.attempt_login(false).await;
            }
            LoginFocus::RegisterButton => {
                let _ = app.attempt_login(true).await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            _ => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username if can_add_username_char(app.login_username.len(), c) => {
                app.login_username.push(c);
            }
            LoginFocus::Password if can_add_password_char(app.login_password.len(), c) => {
                app.login_password.push(c);
            }
            _ => {}
        },
        _ => {}
    }
    Ok(false)
}

/// Move a selection index within a list of the given length
fn move_selection(selection: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *selection = 0;
        return;
    }
    let current = *selection as isize;
    let next = (current + delta).clamp(0, len as isize - 1);
    *selection = next as usize;
}

fn handle_standings_input(app: &mut App, key: KeyEvent) {
    let len = match app.standings_view {
        StandingsView::Drivers => app.driver_standings.len(),
        StandingsView::Teams => app.team_standings.len(),
    };
    match key.code {
        KeyCode::Up => move_selection(&mut app.standings_selection, len, -1),
        KeyCode::Down => move_selection(&mut app.standings_selection, len, 1),
        KeyCode::PageUp => {
            move_selection(&mut app.standings_selection, len, -(PAGE_SCROLL_SIZE as isize))
        }
        KeyCode::PageDown => {
            move_selection(&mut app.standings_selection, len, PAGE_SCROLL_SIZE as isize)
        }
        KeyCode::Char('d') => {
            app.standings_view = StandingsView::Drivers;
            app.standings_selection = 0;
        }
        KeyCode::Char('t') => {
            app.standings_view = StandingsView::Teams;
            app.standings_selection = 0;
        }
        KeyCode::Char('-') => app.change_standings_season(-1),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_standings_season(1),
        KeyCode::Char('u') => app.refresh_standings(),
        _ => {}
    }
}

fn handle_drivers_input(app: &mut App, key: KeyEvent) {
    let len = app.filtered_drivers().len();
    match key.code {
        KeyCode::Up => {
            move_selection(&mut app.driver_selection, len, -1);
        }
        KeyCode::Down => {
            move_selection(&mut app.driver_selection, len, 1);
        }
        KeyCode::PageUp => {
            move_selection(&mut app.driver_selection, len, -(PAGE_SCROLL_SIZE as isize))
        }
        KeyCode::PageDown => {
            move_selection(&mut app.driver_selection, len, PAGE_SCROLL_SIZE as isize)
        }
        KeyCode::Enter => app.load_driver_detail(),
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('c') => {
            app.set_compare_driver(app.driver_selection);
        }
        KeyCode::Char('C') => app.clear_compare(),
        KeyCode::Char('s') => app.detail_view = DetailView::Stats,
        KeyCode::Char('r') => app.detail_view = DetailView::RaceChart,
        KeyCode::Char('b') => app.detail_view = DetailView::BoxPlot,
        KeyCode::Char('u') => app.refresh_catalog(),
        _ => {}
    }
}

fn handle_teams_input(app: &mut App, key: KeyEvent) {
    let len = app.teams.len();
    match key.code {
        KeyCode::Up => move_selection(&mut app.team_selection, len, -1),
        KeyCode::Down => move_selection(&mut app.team_selection, len, 1),
        KeyCode::PageUp => move_selection(&mut app.team_selection, len, -(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => move_selection(&mut app.team_selection, len, PAGE_SCROLL_SIZE as isize),
        KeyCode::Enter => app.load_team_detail(),
        KeyCode::Char('s') => app.team_detail_view = DetailView::Stats,
        KeyCode::Char('r') => app.team_detail_view = DetailView::RaceChart,
        KeyCode::Char('b') => app.team_detail_view = DetailView::BoxPlot,
        KeyCode::Char('u') => app.refresh_catalog(),
        _ => {}
    }
}

async fn handle_betting_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.betting_view {
        BettingView::Groups => {
            let len = app.visible_groups().len();
            match key.code {
                KeyCode::Up => move_selection(&mut app.group_selection, len, -1),
                KeyCode::Down => move_selection(&mut app.group_selection, len, 1),
                KeyCode::Enter => app.open_group(),
                KeyCode::Char('n') => {
                    app.group_name_input.clear();
                    app.betting_error = None;
                    app.betting_view = BettingView::CreateGroup;
                }
                KeyCode::Char('j') => {
                    app.group_selection = 0;
                    app.betting_error = None;
                    app.betting_view = BettingView::JoinGroup;
                }
                KeyCode::Char('l') => app.leave_group().await,
                KeyCode::Char('u') => app.refresh_betting(),
                _ => {}
            }
        }
        BettingView::GroupDetail => match key.code {
            KeyCode::Esc => app.betting_view = BettingView::Groups,
            KeyCode::Char('r') => app.load_races_to_bet(),
            KeyCode::Char('e') => app.load_evaluated_bets(),
            _ => {}
        },
        BettingView::Races => {
            let len = app.races_to_bet.len();
            match key.code {
                KeyCode::Up => move_selection(&mut app.race_selection, len, -1),
                KeyCode::Down => move_selection(&mut app.race_selection, len, 1),
                KeyCode::Esc => app.betting_view = BettingView::GroupDetail,
                KeyCode::Char('p') => app.start_bet(),
                KeyCode::Char('v') | KeyCode::Char('u') => app.load_bet(),
                KeyCode::Char('x') => app.delete_bet().await,
                _ => {}
            }
        }
        BettingView::BetForm => match key.code {
            KeyCode::Esc => app.betting_view = BettingView::Races,
            KeyCode::Tab | KeyCode::Down => app.bet_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => app.bet_form.prev_field(),
            KeyCode::Enter => app.submit_bet().await,
            KeyCode::Backspace => {
                app.bet_form.focused_field_mut().pop();
            }
            KeyCode::Char(c) => {
                let field = app.bet_form.focused_field_mut();
                if can_add_field_char(field.len(), c) {
                    field.push(c);
                }
            }
            _ => {}
        },
        BettingView::BetShow => match key.code {
            KeyCode::Esc => app.betting_view = BettingView::Races,
            KeyCode::Char('u') => app.edit_bet(),
            KeyCode::Char('x') => app.delete_bet().await,
            _ => {}
        },
        BettingView::Evaluated => {
            if key.code == KeyCode::Esc {
                app.betting_view = BettingView::GroupDetail;
            }
        }
        BettingView::CreateGroup => match key.code {
            KeyCode::Esc => app.betting_view = BettingView::Groups,
            KeyCode::Enter => app.create_group().await,
            KeyCode::Backspace => {
                app.group_name_input.pop();
            }
            KeyCode::Char(c) if can_add_field_char(app.group_name_input.len(), c) => {
                app.group_name_input.push(c);
            }
            _ => {}
        },
        BettingView::JoinGroup => {
            let len = app.visible_groups().len();
            match key.code {
                KeyCode::Up => move_selection(&mut app.group_selection, len, -1),
                KeyCode::Down => move_selection(&mut app.group_selection, len, 1),
                KeyCode::Esc => {
                    app.group_selection = 0;
                    app.betting_view = BettingView::Groups;
                }
                KeyCode::Enter => app.join_group().await,
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_selection_clamps() {
        let mut sel = 0;
        move_selection(&mut sel, 5, -1);
        assert_eq!(sel, 0);
        move_selection(&mut sel, 5, 10);
        assert_eq!(sel, 4);
        move_selection(&mut sel, 0, 1);
        assert_eq!(sel, 0);
    }
}
