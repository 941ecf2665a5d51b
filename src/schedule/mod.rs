//! Timetable construction: the period layout (periods interleaved with
//! breaks) and the day × row × class lesson grid built on top of it.
//!
//! Both builders are pure. Callers re-run them in full whenever the config,
//! slot list or class list changes.

pub mod clock;
pub mod grid;
pub mod layout;
pub mod validate;

use chrono::Weekday;

pub use clock::ClockTime;
pub use grid::{build_grid_from_slots, Cell, FilledCell, Grid};
pub use layout::{build_periods_display, BreakRow, DisplayRow, PeriodRow};
pub use validate::validate_config;

/// The grid's fixed day axis. Weekends are never represented.
pub const SCHOOL_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

/// Placeholder shown for anything without a value.
pub const DASH: &str = "—";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid time '{0}', expected HH:mm")]
    InvalidTime(String),
    #[error("period count must be between {min} and {max}, got {got}")]
    PeriodCount { min: u32, max: u32, got: u32 },
    #[error("period duration must be between {min} and {max} minutes, got {got}")]
    PeriodDuration { min: u32, max: u32, got: u32 },
    #[error("break after period {after} is outside 1..={period_count}")]
    BreakPosition { after: u32, period_count: u32 },
    #[error("break after period {after} lasts {got} minutes, max is {max}")]
    BreakDuration { after: u32, got: u32, max: u32 },
}

/// Backend day number (1 = Monday) for a school day.
pub fn day_number(day: Weekday) -> u8 {
    day.number_from_monday() as u8
}
