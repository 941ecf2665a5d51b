use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{App, AssignState, SettingsState, Tab, SETTINGS_FIELDS};
use crate::schedule::{Cell, DisplayRow, SCHOOL_DAYS};
use chrono::Local;

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
/// Background for the cell under the cursor.
const CURSOR_BG: Color = Color::Rgb(60, 42, 0);
const CURSOR: Color = Color::Rgb(255, 185, 50);
const DIM: Color = Color::DarkGray;
const GOOD: Color = Color::Green;
const WARN: Color = Color::Yellow;
const BAD: Color = Color::Red;

const TIME_COL: u16 = 16;
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    render_clock(f, chunks[0]);

    match app.active_tab {
        Tab::Timetable => render_timetable(f, app, chunks[1]),
        Tab::Periods => render_periods(f, app, chunks[1]),
        Tab::Classes => render_classes(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);

    if app.assign_state != AssignState::Hidden {
        render_assign_modal(f, app);
    } else if app.settings_state != SettingsState::Hidden {
        render_settings_modal(f, app);
    }
}

// ─── Tab Bar ────────────────────────────────────────────────────────────────

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", tab.title()), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let school = app
        .user
        .as_ref()
        .and_then(|u| u.school_name.clone())
        .map(|s| format!(" Skoolway · {s} "))
        .unwrap_or_else(|| " Skoolway ".into());

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(school)
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    f.render_widget(tabs, area);
}

// ─── Clock ──────────────────────────────────────────────────────────────────

fn render_clock(f: &mut Frame, tab_area: Rect) {
    let time_str = format!(" {} ", Local::now().format("%a %b %d  %H:%M:%S"));
    let clock_width = time_str.width() as u16;
    let clock_area = Rect {
        x: tab_area.right().saturating_sub(clock_width),
        y: tab_area.y,
        width: clock_width.min(tab_area.width),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(time_str).style(Style::default().fg(ACCENT)),
        clock_area,
    );
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let sync_hint = app
        .cached_at
        .map(|t| {
            format!(
                "  synced {}",
                t.with_timezone(&Local).format("%b %d %H:%M")
            )
        })
        .unwrap_or_default();

    let spinner = if app.loading {
        format!("{} ", SPINNER[(app.frame_count / 3) as usize % SPINNER.len()])
    } else {
        String::new()
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(
            format!("{spinner}{}", app.status_message),
            Style::default().fg(if app.loading { WARN } else { Color::White }),
        ),
        Span::styled(
            format!(
                "  q:quit  Tab:switch  h/l:day  j/k:row  [/]:class  a:assign  e:settings  r:refresh{}  ",
                sync_hint
            ),
            Style::default().fg(DIM),
        ),
    ]))
    .style(Style::default().bg(HEADER_BG));

    f.render_widget(status, area);
}

// ─── Timetable ──────────────────────────────────────────────────────────────

fn render_timetable(f: &mut Frame, app: &App, area: Rect) {
    let day = app.selected_day();
    let day_tabs: Vec<Line> = SCHOOL_DAYS
        .iter()
        .map(|d| {
            Line::from(format!(
                " {} ({}) ",
                d,
                app.grid.filled_count(*d)
            ))
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    f.render_widget(
        Tabs::new(day_tabs)
            .select(app.day_idx)
            .style(Style::default().fg(DIM))
            .highlight_style(Style::default().fg(CURSOR).add_modifier(Modifier::BOLD)),
        chunks[0],
    );

    let classes = &app.options.classes;
    if app.rows.is_empty() || classes.is_empty() {
        let msg = if app.rows.is_empty() {
            "  No periods configured. Press e to edit timetable settings."
        } else {
            "  No classes found."
        };
        f.render_widget(
            Paragraph::new(msg).block(titled_block(" Timetable ")),
            chunks[1],
        );
        return;
    }

    let col_width = chunks[1]
        .width
        .saturating_sub(TIME_COL + 2)
        .checked_div(classes.len() as u16)
        .unwrap_or(0)
        .saturating_sub(1) as usize;

    let mut header_cells = vec!["Time".to_string()];
    header_cells.extend(classes.iter().map(|c| fit(&c.name, col_width)));
    let header = Row::new(header_cells)
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let day_rows = app.grid.day(day);
    let selected_row = app.row_list_state.selected;

    let rows: Vec<Row> = app
        .rows
        .iter()
        .zip(day_rows)
        .enumerate()
        .map(|(r, (display_row, cells))| {
            let time = format!("{}-{}", display_row.start(), display_row.end());
            let mut row_cells = vec![ratatui::widgets::Cell::from(vec![
                Line::from(Span::styled(
                    fit(display_row.label(), TIME_COL as usize),
                    Style::default().fg(Color::White),
                )),
                Line::from(Span::styled(time, Style::default().fg(DIM))),
            ])];

            for (c, cell) in cells.iter().enumerate() {
                let under_cursor = r == selected_row && c == app.class_cursor;
                row_cells.push(grid_cell(cell, col_width, under_cursor));
            }

            let style = if display_row.is_break() {
                Style::default().fg(DIM)
            } else {
                Style::default()
            };
            Row::new(row_cells).style(style).height(2)
        })
        .collect();

    let mut widths = vec![Constraint::Length(TIME_COL)];
    widths.extend(classes.iter().map(|_| Constraint::Fill(1)));

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(SELECTED_BG))
        .block(titled_block(&format!(" {} ", day_name(day))));

    let mut state = ratatui::widgets::TableState::default();
    state.select(Some(selected_row));
    f.render_stateful_widget(table, chunks[1], &mut state);
}

fn grid_cell(cell: &Cell, width: usize, under_cursor: bool) -> ratatui::widgets::Cell<'static> {
    let bg = if under_cursor { CURSOR_BG } else { Color::Reset };
    let lines = match cell {
        Cell::Break => vec![Line::from(Span::styled(
            fit(cell.subject_name(), width),
            Style::default().fg(DIM).add_modifier(Modifier::ITALIC),
        ))],
        Cell::Filled(filled) => vec![
            Line::from(Span::styled(
                fit(&filled.subject_name, width),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                fit(&format!("{} · {}", filled.teacher_name, filled.room), width),
                Style::default().fg(DIM),
            )),
        ],
        Cell::Empty => vec![Line::from(Span::styled(
            cell.subject_name().to_string(),
            Style::default().fg(if under_cursor { CURSOR } else { DIM }),
        ))],
    };
    ratatui::widgets::Cell::from(lines).style(Style::default().bg(bg))
}

fn day_name(day: chrono::Weekday) -> &'static str {
    match day {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

// ─── Periods ────────────────────────────────────────────────────────────────

fn render_periods(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let cfg = &app.config;
    let breaks_total: u32 = app
        .rows
        .iter()
        .filter_map(|r| match r {
            DisplayRow::Break(b) => Some(b.duration_minutes),
            DisplayRow::Period(_) => None,
        })
        .sum();
    let day_span = match (app.rows.first(), app.rows.last()) {
        (Some(first), Some(last)) => format!("{} to {}", first.start(), last.end()),
        _ => "-".into(),
    };

    let summary = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                format!("  {} periods", cfg.period_count),
                Style::default().fg(ACCENT),
            ),
            Span::styled("  |  ", Style::default().fg(DIM)),
            Span::styled(
                format!(
                    "{} min each",
                    cfg.period_duration_minutes
                        .unwrap_or(crate::schedule::layout::DEFAULT_PERIOD_MINUTES)
                ),
                Style::default().fg(Color::White),
            ),
            Span::styled("  |  ", Style::default().fg(DIM)),
            Span::styled(format!("{breaks_total} min of breaks"), Style::default().fg(WARN)),
        ]),
        Line::from(Span::styled(
            format!("  School day runs {day_span}"),
            Style::default().fg(DIM),
        )),
    ])
    .block(titled_block(" Settings  [e: edit] "));
    f.render_widget(summary, chunks[0]);

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let is_selected = i == app.period_list_state.selected;
            let marker = if is_selected { "> " } else { "  " };
            let bg = if is_selected { SELECTED_BG } else { Color::Reset };
            match row {
                DisplayRow::Period(p) => ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(ACCENT)),
                    Span::styled(
                        format!("{:<4}", format!("P{}", p.period_index)),
                        Style::default().fg(ACCENT).bg(bg),
                    ),
                    Span::styled(
                        format!("{:<16}", p.time()),
                        Style::default().fg(Color::White).bg(bg),
                    ),
                    Span::styled(p.label.clone(), Style::default().fg(Color::White).bg(bg)),
                ])),
                DisplayRow::Break(b) => ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(ACCENT)),
                    Span::styled("    ", Style::default().bg(bg)),
                    Span::styled(
                        format!("{:<16}", format!("{} – {}", b.start, b.end)),
                        Style::default().fg(DIM).bg(bg),
                    ),
                    Span::styled(
                        format!("{} ({} min)", b.label, b.duration_minutes),
                        Style::default().fg(WARN).bg(bg).add_modifier(Modifier::ITALIC),
                    ),
                ])),
            }
        })
        .collect();

    let list = List::new(items).block(titled_block(&format!(
        " Day layout ({}) ",
        app.rows.len()
    )));

    app.period_list_state
        .inner
        .select(Some(app.period_list_state.selected));
    f.render_stateful_widget(list, chunks[1], &mut app.period_list_state.inner);
}

// ─── Classes ────────────────────────────────────────────────────────────────

fn render_classes(f: &mut Frame, app: &mut App, area: Rect) {
    let periods_per_week = app.config.period_count as usize * SCHOOL_DAYS.len();

    let items: Vec<ListItem> = app
        .options
        .classes
        .iter()
        .enumerate()
        .map(|(i, class)| {
            let lessons = app.weekly_lessons(i);
            let free = periods_per_week.saturating_sub(lessons);
            let is_selected = i == app.class_list_state.selected;
            let marker = if is_selected { "> " } else { "  " };
            let style = if is_selected {
                Style::default().bg(SELECTED_BG).fg(Color::White)
            } else {
                Style::default().fg(Color::White)
            };
            let fill_color = match (lessons, free) {
                (0, _) => BAD,
                (_, 0) => GOOD,
                _ => WARN,
            };

            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(ACCENT)),
                Span::styled(format!("{:<24}", class.name), style.add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  {lessons}/{periods_per_week} lessons"),
                    Style::default().fg(fill_color),
                ),
                Span::styled(format!("  {free} free"), Style::default().fg(DIM)),
            ]))
        })
        .collect();

    let list = List::new(items).block(titled_block(&format!(
        " Classes ({}) ",
        app.options.classes.len()
    )));

    app.class_list_state
        .inner
        .select(Some(app.class_list_state.selected));
    f.render_stateful_widget(list, area, &mut app.class_list_state.inner);
}

// ─── Modals ─────────────────────────────────────────────────────────────────

fn render_assign_modal(f: &mut Frame, app: &App) {
    let area = centered(f.area(), 60, 16);
    f.render_widget(Clear, area);

    let heading = app
        .assign_target
        .as_ref()
        .map(|t| {
            format!(
                " {} · {} · Period {} ",
                t.class_name,
                day_name(t.day),
                t.period_index
            )
        })
        .unwrap_or_else(|| " Assign lesson ".into());

    let body: Vec<Line> = match &app.assign_state {
        AssignState::PickSubject => pick_list(
            "Subject",
            app.options.subjects.iter().map(|s| s.name.as_str()),
            app.assign_cursor,
        ),
        AssignState::PickTeacher => pick_list(
            "Teacher",
            app.options.teachers.iter().map(|t| t.name.as_str()),
            app.assign_cursor,
        ),
        AssignState::RoomInput => vec![
            Line::from(Span::styled("Room (optional)", Style::default().fg(ACCENT))),
            Line::from(""),
            Line::from(vec![
                Span::raw("> "),
                Span::styled(app.assign_room.clone(), Style::default().fg(Color::White)),
                Span::styled("_", Style::default().fg(CURSOR)),
            ]),
            Line::from(""),
            Line::from(Span::styled("Enter: schedule  Esc: cancel", Style::default().fg(DIM))),
        ],
        AssignState::Submitting => vec![Line::from(Span::styled(
            "Scheduling…",
            Style::default().fg(WARN),
        ))],
        AssignState::Done { success, message } => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(if *success { GOOD } else { BAD }),
        ))],
        AssignState::Hidden => Vec::new(),
    };

    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(titled_block(&heading)),
        area,
    );
}

fn pick_list<'a>(
    title: &str,
    names: impl Iterator<Item = &'a str>,
    cursor: usize,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(title.to_string(), Style::default().fg(ACCENT))),
        Line::from(""),
    ];
    for (i, name) in names.enumerate() {
        let (marker, style) = if i == cursor {
            ("> ", Style::default().fg(Color::White).bg(SELECTED_BG))
        } else {
            ("  ", Style::default().fg(Color::White))
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(ACCENT)),
            Span::styled(name.to_string(), style),
        ]));
    }
    lines
}

fn render_settings_modal(f: &mut Frame, app: &App) {
    let area = centered(f.area(), 56, 12);
    f.render_widget(Clear, area);

    let mut body: Vec<Line> = Vec::new();
    match &app.settings_state {
        SettingsState::Editing => {
            for (i, label) in SETTINGS_FIELDS.iter().enumerate() {
                let active = i == app.settings_cursor;
                body.push(Line::from(vec![
                    Span::styled(
                        if active { "> " } else { "  " },
                        Style::default().fg(ACCENT),
                    ),
                    Span::styled(format!("{label:<22}"), Style::default().fg(DIM)),
                    Span::styled(
                        app.settings_fields[i].clone(),
                        Style::default()
                            .fg(Color::White)
                            .bg(if active { SELECTED_BG } else { Color::Reset }),
                    ),
                    if active {
                        Span::styled("_", Style::default().fg(CURSOR))
                    } else {
                        Span::raw("")
                    },
                ]));
            }
            body.push(Line::from(""));
            if let Some(err) = &app.settings_error {
                body.push(Line::from(Span::styled(err.clone(), Style::default().fg(BAD))));
            }
            body.push(Line::from(Span::styled(
                "Up/Down: field  Enter: save  Esc: cancel",
                Style::default().fg(DIM),
            )));
        }
        SettingsState::Submitting => {
            body.push(Line::from(Span::styled("Saving…", Style::default().fg(WARN))));
        }
        SettingsState::Done { success, message } => {
            body.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(if *success { GOOD } else { BAD }),
            )));
        }
        SettingsState::Hidden => {}
    }

    f.render_widget(
        Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .block(titled_block(" Timetable settings ")),
        area,
    );
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_style(Style::default().fg(ACCENT))
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Truncate to a display width, marking the cut with `…`.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_truncates_by_display_width() {
        assert_eq!(fit("Math", 10), "Math");
        assert_eq!(fit("Mathematics", 6), "Mathe…");
        assert_eq!(fit("数学数学", 5), "数学…");
        assert_eq!(fit("Art", 0), "");
    }
}
