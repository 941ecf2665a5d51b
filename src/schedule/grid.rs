use std::collections::HashMap;

use chrono::Weekday;

use super::{day_number, DisplayRow, DASH, SCHOOL_DAYS};
use crate::models::{LessonSlot, SchoolClass};

// ─── Cells ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledCell {
    pub subject_name: String,
    pub teacher_name: String,
    pub room: String,
    pub slot_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Break,
    Filled(FilledCell),
    Empty,
}

impl Cell {
    pub fn subject_name(&self) -> &str {
        match self {
            Self::Break => "Break",
            Self::Filled(c) => &c.subject_name,
            Self::Empty => DASH,
        }
    }

    pub fn teacher_name(&self) -> &str {
        match self {
            Self::Filled(c) => &c.teacher_name,
            Self::Break | Self::Empty => DASH,
        }
    }

    pub fn room(&self) -> &str {
        match self {
            Self::Filled(c) => &c.room,
            Self::Break | Self::Empty => DASH,
        }
    }

    pub fn slot_id(&self) -> Option<&str> {
        match self {
            Self::Filled(c) => Some(&c.slot_id),
            Self::Break | Self::Empty => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Self::Break)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

// ─── Grid ───────────────────────────────────────────────────────────────────

/// `days[day][display_row][class]`, always `5 × rows × classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    days: Vec<Vec<Vec<Cell>>>,
}

impl Grid {
    pub fn days(&self) -> &[Vec<Vec<Cell>>] {
        &self.days
    }

    /// Rows of one school day. Weekends have no rows.
    pub fn day(&self, day: Weekday) -> &[Vec<Cell>] {
        SCHOOL_DAYS
            .iter()
            .position(|d| *d == day)
            .and_then(|i| self.days.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn cell(&self, day: Weekday, row: usize, class: usize) -> Option<&Cell> {
        self.day(day).get(row)?.get(class)
    }

    /// Number of lessons placed on a given day.
    pub fn filled_count(&self, day: Weekday) -> usize {
        self.day(day)
            .iter()
            .flatten()
            .filter(|c| matches!(c, Cell::Filled(_)))
            .count()
    }
}

impl Default for Grid {
    /// Five school days with no rows.
    fn default() -> Self {
        Self {
            days: vec![Vec::new(); SCHOOL_DAYS.len()],
        }
    }
}

// ─── Builder ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotKey<'a> {
    day: u8,
    period: u32,
    class_id: &'a str,
}

impl<'a> SlotKey<'a> {
    fn of(slot: &'a LessonSlot) -> Option<Self> {
        Some(Self {
            day: slot.day_of_week?,
            period: slot.period_index?,
            class_id: slot.class_id.as_deref()?,
        })
    }
}

/// Place lesson slots into the day × row × class grid.
///
/// Break rows become break cells for every class regardless of the slots.
/// A period cell is filled when a slot matches its day, period and class;
/// otherwise it is empty. Slots missing any of those fields never match, and
/// on a duplicate key the last slot wins.
pub fn build_grid_from_slots(
    slots: &[LessonSlot],
    classes: &[SchoolClass],
    rows: &[DisplayRow],
) -> Grid {
    let lookup: HashMap<SlotKey<'_>, &LessonSlot> = slots
        .iter()
        .filter_map(|s| SlotKey::of(s).map(|k| (k, s)))
        .collect();

    let days = SCHOOL_DAYS
        .iter()
        .map(|&day| {
            let day = day_number(day);
            rows.iter()
                .map(|row| match row {
                    DisplayRow::Break(_) => vec![Cell::Break; classes.len()],
                    DisplayRow::Period(p) => classes
                        .iter()
                        .map(|class| {
                            let key = SlotKey {
                                day,
                                period: p.period_index,
                                class_id: &class.id,
                            };
                            lookup.get(&key).map_or(Cell::Empty, |s| filled(s))
                        })
                        .collect(),
                })
                .collect()
        })
        .collect();

    Grid { days }
}

fn filled(slot: &LessonSlot) -> Cell {
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| DASH.into());
    Cell::Filled(FilledCell {
        subject_name: or_dash(&slot.subject_name),
        teacher_name: or_dash(&slot.teacher_name),
        room: or_dash(&slot.room),
        slot_id: slot.id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreakDefinition, TimetableConfig};
    use crate::schedule::build_periods_display;

    fn rows() -> Vec<DisplayRow> {
        let cfg = TimetableConfig {
            period_count: 2,
            period_duration_minutes: Some(40),
            first_period_start_time: Some("08:00".into()),
            breaks: vec![BreakDefinition {
                after_period_index: 1,
                duration_minutes: 10,
                label: "Short break".into(),
            }],
        };
        build_periods_display(Some(&cfg)).unwrap()
    }

    fn class(id: &str) -> SchoolClass {
        SchoolClass {
            id: id.into(),
            name: format!("Class {id}"),
        }
    }

    fn slot(id: &str, day: u8, period: u32, class_id: &str, subject: &str) -> LessonSlot {
        LessonSlot {
            id: id.into(),
            class_id: Some(class_id.into()),
            day_of_week: Some(day),
            period_index: Some(period),
            subject_name: Some(subject.into()),
            teacher_name: Some("Mr X".into()),
            room: None,
        }
    }

    #[test]
    fn single_slot_lands_on_monday_only() {
        let grid = build_grid_from_slots(&[slot("s1", 1, 1, "A", "Math")], &[class("A")], &rows());

        assert_eq!(
            grid.cell(Weekday::Mon, 0, 0),
            Some(&Cell::Filled(FilledCell {
                subject_name: "Math".into(),
                teacher_name: "Mr X".into(),
                room: "—".into(),
                slot_id: "s1".into(),
            }))
        );
        let tuesday = grid.cell(Weekday::Tue, 0, 0).unwrap();
        assert!(tuesday.is_empty());
        assert_eq!(tuesday.subject_name(), "—");
        assert_eq!(tuesday.teacher_name(), "—");
        assert_eq!(tuesday.room(), "—");
    }

    #[test]
    fn shape_is_fixed_even_without_slots() {
        let classes = [class("A"), class("B"), class("C")];
        let rows = rows();
        let grid = build_grid_from_slots(&[], &classes, &rows);

        assert_eq!(grid.days().len(), 5);
        for day in grid.days() {
            assert_eq!(day.len(), rows.len());
            for row in day {
                assert_eq!(row.len(), classes.len());
            }
        }
        assert_eq!(grid.filled_count(Weekday::Wed), 0);
    }

    #[test]
    fn no_classes_gives_empty_rows() {
        let grid = build_grid_from_slots(&[slot("s1", 1, 1, "A", "Math")], &[], &rows());
        assert!(grid.days().iter().flatten().all(Vec::is_empty));
    }

    #[test]
    fn break_rows_ignore_slots() {
        // A slot pointing at the period number the break follows does not
        // bleed into the break row.
        let slots = [slot("s1", 2, 1, "A", "Math")];
        let grid = build_grid_from_slots(&slots, &[class("A"), class("B")], &rows());

        for day in SCHOOL_DAYS {
            for c in 0..2 {
                let cell = grid.cell(day, 1, c).unwrap();
                assert!(cell.is_break());
                assert_eq!(cell.subject_name(), "Break");
                assert_eq!(cell.slot_id(), None);
            }
        }
    }

    #[test]
    fn period_after_break_maps_to_its_own_index() {
        let slots = [slot("s2", 5, 2, "B", "Art")];
        let grid = build_grid_from_slots(&slots, &[class("A"), class("B")], &rows());

        assert_eq!(grid.cell(Weekday::Fri, 2, 1).unwrap().subject_name(), "Art");
        assert!(grid.cell(Weekday::Fri, 2, 0).unwrap().is_empty());
        assert!(grid.cell(Weekday::Fri, 0, 1).unwrap().is_empty());
    }

    #[test]
    fn duplicate_slot_last_one_wins() {
        let slots = [slot("s1", 3, 1, "A", "Math"), slot("s9", 3, 1, "A", "Physics")];
        let grid = build_grid_from_slots(&slots, &[class("A")], &rows());

        let cell = grid.cell(Weekday::Wed, 0, 0).unwrap();
        assert_eq!(cell.subject_name(), "Physics");
        assert_eq!(cell.slot_id(), Some("s9"));
    }

    #[test]
    fn malformed_and_weekend_slots_never_match() {
        let mut no_day = slot("s1", 1, 1, "A", "Math");
        no_day.day_of_week = None;
        let mut no_class = slot("s2", 1, 1, "A", "Math");
        no_class.class_id = None;
        let saturday = slot("s3", 6, 1, "A", "Math");
        let unknown_class = slot("s4", 1, 1, "Z", "Math");

        let grid = build_grid_from_slots(
            &[no_day, no_class, saturday, unknown_class],
            &[class("A")],
            &rows(),
        );
        assert!(SCHOOL_DAYS.iter().all(|&d| grid.filled_count(d) == 0));
        assert!(grid.day(Weekday::Sat).is_empty());
    }

    #[test]
    fn class_order_is_column_order() {
        let slots = [slot("s1", 1, 2, "A", "Math"), slot("s2", 1, 2, "B", "Art")];
        let grid = build_grid_from_slots(&slots, &[class("B"), class("A")], &rows());

        assert_eq!(grid.cell(Weekday::Mon, 2, 0).unwrap().subject_name(), "Art");
        assert_eq!(grid.cell(Weekday::Mon, 2, 1).unwrap().subject_name(), "Math");
    }

    #[test]
    fn class_ids_containing_separators_do_not_collide() {
        let slots = [slot("s1", 1, 1, "1-A", "Math")];
        let grid = build_grid_from_slots(&slots, &[class("1-A"), class("A")], &rows());

        assert_eq!(grid.cell(Weekday::Mon, 0, 0).unwrap().slot_id(), Some("s1"));
        assert!(grid.cell(Weekday::Mon, 0, 1).unwrap().is_empty());
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let slots = [slot("s1", 1, 1, "A", "Math"), slot("s2", 4, 2, "B", "Art")];
        let classes = [class("A"), class("B")];
        let rows = rows();

        assert_eq!(
            build_grid_from_slots(&slots, &classes, &rows),
            build_grid_from_slots(&slots, &classes, &rows)
        );
    }
}
