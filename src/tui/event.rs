use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, AssignState, SettingsState, Tab, SETTINGS_FIELDS};

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // ── Modals intercept all keys while open ──────────────────────────
    if app.assign_state != AssignState::Hidden {
        handle_assign_key(app, code);
        return;
    }
    if app.settings_state != SettingsState::Hidden {
        handle_settings_key(app, code);
        return;
    }

    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        (KeyCode::Tab, _) => {
            app.active_tab = app.active_tab.next();
            return;
        }
        (KeyCode::BackTab, _) => {
            app.active_tab = app.active_tab.prev();
            return;
        }
        (KeyCode::Char('1'), _) => {
            app.active_tab = Tab::Timetable;
            return;
        }
        (KeyCode::Char('2'), _) => {
            app.active_tab = Tab::Periods;
            return;
        }
        (KeyCode::Char('3'), _) => {
            app.active_tab = Tab::Classes;
            return;
        }
        _ => {}
    }

    match code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.active_list_state_mut().select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.active_list_state_mut().select_prev();
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.active_list_state_mut().selected = 0;
        }
        KeyCode::End | KeyCode::Char('G') => {
            let ls = app.active_list_state_mut();
            if ls.len > 0 {
                ls.selected = ls.len - 1;
            }
        }
        KeyCode::Left | KeyCode::Char('h') if app.active_tab == Tab::Timetable => {
            app.prev_day();
        }
        KeyCode::Right | KeyCode::Char('l') if app.active_tab == Tab::Timetable => {
            app.next_day();
        }
        KeyCode::Char('[') if app.active_tab == Tab::Timetable => {
            app.prev_class();
        }
        KeyCode::Char(']') if app.active_tab == Tab::Timetable => {
            app.next_class();
        }
        KeyCode::Char('a') if app.active_tab == Tab::Timetable && !app.loading => {
            app.open_assign_modal();
        }
        KeyCode::Char('e') if !app.loading => {
            app.open_settings_modal();
        }
        KeyCode::Char('r') if !app.loading => {
            app.needs_refresh = true;
        }
        _ => {}
    }
}

fn handle_assign_key(app: &mut App, code: KeyCode) {
    match app.assign_state {
        AssignState::PickSubject | AssignState::PickTeacher => match code {
            KeyCode::Down | KeyCode::Char('j') => {
                if app.assign_cursor + 1 < app.assign_choices() {
                    app.assign_cursor += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.assign_cursor = app.assign_cursor.saturating_sub(1);
            }
            KeyCode::Enter => app.assign_confirm(),
            KeyCode::Esc => app.assign_state = AssignState::Hidden,
            _ => {}
        },
        AssignState::RoomInput => match code {
            KeyCode::Char(c) => app.assign_room.push(c),
            KeyCode::Backspace => {
                app.assign_room.pop();
            }
            KeyCode::Enter => app.assign_confirm(),
            KeyCode::Esc => app.assign_state = AssignState::Hidden,
            _ => {}
        },
        AssignState::Submitting => {}
        AssignState::Done { .. } => app.assign_state = AssignState::Hidden,
        AssignState::Hidden => {}
    }
}

fn handle_settings_key(app: &mut App, code: KeyCode) {
    match app.settings_state {
        SettingsState::Editing => match code {
            KeyCode::Down | KeyCode::Tab => {
                app.settings_cursor = (app.settings_cursor + 1) % SETTINGS_FIELDS.len();
            }
            KeyCode::Up | KeyCode::BackTab => {
                app.settings_cursor =
                    (app.settings_cursor + SETTINGS_FIELDS.len() - 1) % SETTINGS_FIELDS.len();
            }
            KeyCode::Char(c) => app.settings_fields[app.settings_cursor].push(c),
            KeyCode::Backspace => {
                app.settings_fields[app.settings_cursor].pop();
            }
            KeyCode::Enter => app.submit_settings(),
            KeyCode::Esc => app.settings_state = SettingsState::Hidden,
            _ => {}
        },
        SettingsState::Submitting => {}
        SettingsState::Done { .. } => app.settings_state = SettingsState::Hidden,
        SettingsState::Hidden => {}
    }
}
