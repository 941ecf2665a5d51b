use std::collections::HashMap;

use super::{ClockTime, ScheduleError};
use crate::models::{BreakDefinition, TimetableConfig};

pub const DEFAULT_START_TIME: &str = "08:00";
pub const DEFAULT_PERIOD_MINUTES: u32 = 45;

/// Upper bound on rows reserved before building; `periodCount` comes straight
/// from the backend.
const MAX_RESERVED_ROWS: usize = 64;

// ─── Display Rows ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRow {
    pub row_index: usize,
    /// 1-based.
    pub period_index: u32,
    pub label: String,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl PeriodRow {
    /// `"08:00 – 08:45"`
    pub fn time(&self) -> String {
        format!("{} – {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakRow {
    pub row_index: usize,
    pub label: String,
    pub duration_minutes: u32,
    pub start: ClockTime,
    pub end: ClockTime,
}

/// One row of the rendered timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayRow {
    Period(PeriodRow),
    Break(BreakRow),
}

impl DisplayRow {
    pub fn row_index(&self) -> usize {
        match self {
            Self::Period(p) => p.row_index,
            Self::Break(b) => b.row_index,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Period(p) => &p.label,
            Self::Break(b) => &b.label,
        }
    }

    pub fn start(&self) -> ClockTime {
        match self {
            Self::Period(p) => p.start,
            Self::Break(b) => b.start,
        }
    }

    pub fn end(&self) -> ClockTime {
        match self {
            Self::Period(p) => p.end,
            Self::Break(b) => b.end,
        }
    }

    pub fn period_index(&self) -> Option<u32> {
        match self {
            Self::Period(p) => Some(p.period_index),
            Self::Break(_) => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break(_))
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Lay out a school day: `period_count` periods of uniform length starting at
/// the configured first start time, with a break row inserted after each
/// period that has a positive-length break registered.
///
/// An absent config yields no rows. A start time that is not `HH:mm` is the
/// only error; everything else is taken as given.
pub fn build_periods_display(
    config: Option<&TimetableConfig>,
) -> Result<Vec<DisplayRow>, ScheduleError> {
    let Some(config) = config else {
        return Ok(Vec::new());
    };

    let start = config
        .first_period_start_time
        .as_deref()
        .unwrap_or(DEFAULT_START_TIME);
    let period_minutes = config
        .period_duration_minutes
        .unwrap_or(DEFAULT_PERIOD_MINUTES);

    // Later definitions for the same period overwrite earlier ones.
    let breaks: HashMap<u32, &BreakDefinition> = config
        .breaks
        .iter()
        .map(|b| (b.after_period_index, b))
        .collect();

    let mut clock = ClockTime::parse(start)?;
    let mut rows = Vec::with_capacity(reserved_rows(config));

    for period_index in 1..=config.period_count {
        let period_start = clock;
        clock = clock.advance(period_minutes);
        rows.push(DisplayRow::Period(PeriodRow {
            row_index: rows.len(),
            period_index,
            label: format!("Period {period_index}"),
            start: period_start,
            end: clock,
        }));

        if let Some(b) = breaks.get(&period_index).filter(|b| b.duration_minutes > 0) {
            let break_start = clock;
            clock = clock.advance(b.duration_minutes);
            rows.push(DisplayRow::Break(BreakRow {
                row_index: rows.len(),
                label: b.label.clone(),
                duration_minutes: b.duration_minutes,
                start: break_start,
                end: clock,
            }));
        }
    }

    Ok(rows)
}

fn reserved_rows(config: &TimetableConfig) -> usize {
    (config.period_count as usize)
        .saturating_add(config.breaks.len())
        .min(MAX_RESERVED_ROWS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brk(after: u32, minutes: u32, label: &str) -> BreakDefinition {
        BreakDefinition {
            after_period_index: after,
            duration_minutes: minutes,
            label: label.into(),
        }
    }

    fn config(count: u32, minutes: u32, start: &str, breaks: Vec<BreakDefinition>) -> TimetableConfig {
        TimetableConfig {
            period_count: count,
            period_duration_minutes: Some(minutes),
            first_period_start_time: Some(start.into()),
            breaks,
        }
    }

    #[test]
    fn short_break_between_two_periods() {
        let cfg = config(2, 40, "08:00", vec![brk(1, 10, "Short break")]);
        let rows = build_periods_display(Some(&cfg)).unwrap();

        assert_eq!(rows.len(), 3);
        match &rows[0] {
            DisplayRow::Period(p) => {
                assert_eq!(p.period_index, 1);
                assert_eq!(p.time(), "08:00 – 08:40");
                assert_eq!(p.label, "Period 1");
            }
            other => panic!("expected period, got {other:?}"),
        }
        match &rows[1] {
            DisplayRow::Break(b) => {
                assert_eq!(b.label, "Short break");
                assert_eq!(b.duration_minutes, 10);
            }
            other => panic!("expected break, got {other:?}"),
        }
        match &rows[2] {
            DisplayRow::Period(p) => {
                assert_eq!(p.period_index, 2);
                assert_eq!(p.time(), "08:50 – 09:30");
            }
            other => panic!("expected period, got {other:?}"),
        }
    }

    #[test]
    fn absent_config_yields_no_rows() {
        assert_eq!(build_periods_display(None).unwrap(), Vec::new());
    }

    #[test]
    fn defaults_apply_when_fields_are_missing() {
        let cfg = TimetableConfig {
            period_count: 2,
            ..Default::default()
        };
        let rows = build_periods_display(Some(&cfg)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].start().to_string(), "08:00");
        assert_eq!(rows[0].end().to_string(), "08:45");
        assert_eq!(rows[1].end().to_string(), "09:30");
    }

    #[test]
    fn zero_length_and_out_of_range_breaks_are_skipped() {
        let cfg = config(3, 45, "09:00", vec![brk(1, 0, "Nothing"), brk(7, 30, "Never")]);
        let rows = build_periods_display(Some(&cfg)).unwrap();

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| !r.is_break()));
    }

    #[test]
    fn duplicate_break_definition_last_one_wins() {
        let cfg = config(
            2,
            45,
            "08:00",
            vec![brk(1, 10, "First"), brk(1, 25, "Lunch")],
        );
        let rows = build_periods_display(Some(&cfg)).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].label(), "Lunch");
        assert_eq!(rows[2].start().to_string(), "09:10");
    }

    #[test]
    fn rows_are_contiguous_and_indexed_in_order() {
        let cfg = config(
            6,
            50,
            "07:45",
            vec![brk(2, 15, "Recess"), brk(4, 40, "Lunch"), brk(6, 5, "After")],
        );
        let rows = build_periods_display(Some(&cfg)).unwrap();

        let periods: Vec<u32> = rows.iter().filter_map(DisplayRow::period_index).collect();
        assert_eq!(periods, vec![1, 2, 3, 4, 5, 6]);

        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.row_index(), i);
        }
        for pair in rows.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
        // A break appears right after its period.
        assert_eq!(rows[2].label(), "Recess");
        assert_eq!(rows[5].label(), "Lunch");
        assert_eq!(rows.last().map(|r| r.label()), Some("After"));
    }

    #[test]
    fn long_day_runs_past_midnight_without_wrapping() {
        let cfg = config(2, 60, "23:00", Vec::new());
        let rows = build_periods_display(Some(&cfg)).unwrap();

        match &rows[1] {
            DisplayRow::Period(p) => assert_eq!(p.time(), "24:00 – 25:00"),
            other => panic!("expected period, got {other:?}"),
        }
    }

    #[test]
    fn malformed_start_time_fails_fast() {
        let cfg = config(3, 45, "8am", Vec::new());
        assert_eq!(
            build_periods_display(Some(&cfg)),
            Err(ScheduleError::InvalidTime("8am".into()))
        );
    }

    #[test]
    fn zero_periods_yield_no_rows_even_with_breaks() {
        let cfg = config(0, 45, "08:00", vec![brk(1, 10, "Break")]);
        assert!(build_periods_display(Some(&cfg)).unwrap().is_empty());
    }

    #[test]
    fn reservation_is_capped_for_huge_period_counts() {
        let cfg = config(u32::MAX, 45, "08:00", vec![brk(1, 10, "Break")]);
        assert_eq!(reserved_rows(&cfg), MAX_RESERVED_ROWS);

        let cfg = config(6, 45, "08:00", vec![brk(2, 15, "Recess"), brk(4, 40, "Lunch")]);
        assert_eq!(reserved_rows(&cfg), 8);
    }
}
