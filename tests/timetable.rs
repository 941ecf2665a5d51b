use chrono::Weekday;
use serde_json::json;

use skoolway_tui::models::{LessonSlot, ScheduleOptions, TimetableConfig};
use skoolway_tui::schedule::{
    build_grid_from_slots, build_periods_display, Cell, DisplayRow, SCHOOL_DAYS,
};

fn config() -> TimetableConfig {
    serde_json::from_value(json!({
        "periodCount": 5,
        "periodDurationMinutes": 45,
        "firstPeriodStartTime": "08:00",
        "breaks": [
            { "afterPeriodIndex": 2, "durationMinutes": 15, "label": "Recess" },
            { "afterPeriodIndex": 4, "durationMinutes": 30, "label": "Lunch" }
        ]
    }))
    .unwrap()
}

fn options() -> ScheduleOptions {
    serde_json::from_value(json!({
        "classes": [
            { "id": "c-7a", "name": "7A" },
            { "id": "c-7b", "name": "7B" }
        ],
        "subjects": [{ "id": "math", "name": "Math" }],
        "teachers": [{ "id": "t-1", "name": "Ms Okafor" }]
    }))
    .unwrap()
}

fn slots() -> Vec<LessonSlot> {
    serde_json::from_value(json!([
        { "id": "s1", "classId": "c-7a", "dayOfWeek": 1, "periodIndex": 1,
          "subjectName": "Math", "teacherName": "Ms Okafor", "room": "R1" },
        { "id": "s2", "classId": "c-7b", "dayOfWeek": 3, "periodIndex": 5,
          "subjectName": "History", "teacherName": "Mr Lind" },
        { "id": "s3", "classId": "c-7a", "periodIndex": 3,
          "subjectName": "Orphan" }
    ]))
    .unwrap()
}

#[test]
fn backend_payloads_become_a_full_week() {
    let rows = build_periods_display(Some(&config())).unwrap();
    let options = options();
    let grid = build_grid_from_slots(&slots(), &options.classes, &rows);

    let layout: Vec<String> = rows
        .iter()
        .map(|r| match r {
            DisplayRow::Period(p) => format!("P{} {}", p.period_index, p.time()),
            DisplayRow::Break(b) => format!("{} {}", b.label, b.duration_minutes),
        })
        .collect();
    assert_eq!(
        layout,
        vec![
            "P1 08:00 – 08:45",
            "P2 08:45 – 09:30",
            "Recess 15",
            "P3 09:45 – 10:30",
            "P4 10:30 – 11:15",
            "Lunch 30",
            "P5 11:45 – 12:30",
        ]
    );

    assert_eq!(grid.days().len(), SCHOOL_DAYS.len());
    for day in SCHOOL_DAYS {
        assert_eq!(grid.day(day).len(), rows.len());
        assert!(grid.day(day)[2].iter().all(Cell::is_break));
        assert!(grid.day(day)[5].iter().all(Cell::is_break));
    }

    let monday = grid.cell(Weekday::Mon, 0, 0).unwrap();
    assert_eq!(monday.subject_name(), "Math");
    assert_eq!(monday.room(), "R1");

    let wednesday = grid.cell(Weekday::Wed, 6, 1).unwrap();
    assert_eq!(wednesday.subject_name(), "History");
    assert_eq!(wednesday.room(), "—");
    assert_eq!(wednesday.slot_id(), Some("s2"));

    let placed: usize = SCHOOL_DAYS.iter().map(|&d| grid.filled_count(d)).sum();
    assert_eq!(placed, 2, "slot without a day must not be placed");
}

#[test]
fn empty_inputs_still_give_five_days() {
    let grid = build_grid_from_slots(&[], &[], &build_periods_display(None).unwrap());
    assert_eq!(grid.days().len(), 5);
    assert!(grid.days().iter().all(Vec::is_empty));
}
