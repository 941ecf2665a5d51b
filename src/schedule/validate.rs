use super::layout::{DEFAULT_PERIOD_MINUTES, DEFAULT_START_TIME};
use super::{ClockTime, ScheduleError};
use crate::models::TimetableConfig;

pub const MIN_PERIODS: u32 = 1;
pub const MAX_PERIODS: u32 = 15;
pub const MIN_PERIOD_MINUTES: u32 = 10;
pub const MAX_PERIOD_MINUTES: u32 = 180;
pub const MAX_BREAK_MINUTES: u32 = 120;

/// Range checks applied before a config is sent back to the server.
///
/// The layout builder itself accepts anything; this is what the settings
/// editor enforces.
pub fn validate_config(config: &TimetableConfig) -> Result<(), ScheduleError> {
    let count = config.period_count;
    if !(MIN_PERIODS..=MAX_PERIODS).contains(&count) {
        return Err(ScheduleError::PeriodCount {
            min: MIN_PERIODS,
            max: MAX_PERIODS,
            got: count,
        });
    }

    let minutes = config
        .period_duration_minutes
        .unwrap_or(DEFAULT_PERIOD_MINUTES);
    if !(MIN_PERIOD_MINUTES..=MAX_PERIOD_MINUTES).contains(&minutes) {
        return Err(ScheduleError::PeriodDuration {
            min: MIN_PERIOD_MINUTES,
            max: MAX_PERIOD_MINUTES,
            got: minutes,
        });
    }

    ClockTime::parse(
        config
            .first_period_start_time
            .as_deref()
            .unwrap_or(DEFAULT_START_TIME),
    )?;

    for b in &config.breaks {
        if !(1..=count).contains(&b.after_period_index) {
            return Err(ScheduleError::BreakPosition {
                after: b.after_period_index,
                period_count: count,
            });
        }
        if b.duration_minutes > MAX_BREAK_MINUTES {
            return Err(ScheduleError::BreakDuration {
                after: b.after_period_index,
                got: b.duration_minutes,
                max: MAX_BREAK_MINUTES,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BreakDefinition;

    fn valid() -> TimetableConfig {
        TimetableConfig {
            period_count: 7,
            period_duration_minutes: Some(45),
            first_period_start_time: Some("08:15".into()),
            breaks: vec![BreakDefinition {
                after_period_index: 3,
                duration_minutes: 20,
                label: "Recess".into(),
            }],
        }
    }

    #[test]
    fn accepts_a_typical_day() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn rejects_period_count_out_of_range() {
        let mut cfg = valid();
        cfg.period_count = 0;
        assert!(matches!(
            validate_config(&cfg),
            Err(ScheduleError::PeriodCount { got: 0, .. })
        ));
        cfg.period_count = 16;
        assert!(matches!(
            validate_config(&cfg),
            Err(ScheduleError::PeriodCount { got: 16, .. })
        ));
    }

    #[test]
    fn rejects_bad_duration_and_time() {
        let mut cfg = valid();
        cfg.period_duration_minutes = Some(5);
        assert!(matches!(
            validate_config(&cfg),
            Err(ScheduleError::PeriodDuration { got: 5, .. })
        ));

        let mut cfg = valid();
        cfg.first_period_start_time = Some("quarter past eight".into());
        assert!(matches!(
            validate_config(&cfg),
            Err(ScheduleError::InvalidTime(_))
        ));
    }

    #[test]
    fn rejects_misplaced_or_overlong_breaks() {
        let mut cfg = valid();
        cfg.breaks[0].after_period_index = 8;
        assert_eq!(
            validate_config(&cfg),
            Err(ScheduleError::BreakPosition { after: 8, period_count: 7 })
        );

        let mut cfg = valid();
        cfg.breaks[0].duration_minutes = 121;
        assert!(matches!(
            validate_config(&cfg),
            Err(ScheduleError::BreakDuration { got: 121, .. })
        ));
    }
}
