use serde::{Deserialize, Serialize};

// ─── Timetable Config ───────────────────────────────────────────────────────

/// Tenant-level timetable settings as served by `GET /api/schedule/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableConfig {
    #[serde(default)]
    pub period_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_duration_minutes: Option<u32>,
    /// Wall-clock `HH:mm`, 24-hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_period_start_time: Option<String>,
    #[serde(default)]
    pub breaks: Vec<BreakDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakDefinition {
    pub after_period_index: u32,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default = "default_break_label")]
    pub label: String,
}

fn default_break_label() -> String {
    "Break".into()
}

// ─── Lesson Slots ───────────────────────────────────────────────────────────

/// One lesson assignment from `GET /api/schedule/slots`.
///
/// The keying fields are optional so that a malformed entry is still accepted
/// by the decoder; it simply never matches a grid cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSlot {
    pub id: String,
    #[serde(default)]
    pub class_id: Option<String>,
    /// 1 = Monday .. 5 = Friday.
    #[serde(default)]
    pub day_of_week: Option<u8>,
    /// 1-based.
    #[serde(default)]
    pub period_index: Option<u32>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub teacher_name: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
}

/// Body of `POST /api/schedule/slots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLessonSlot {
    pub class_id: String,
    pub day_of_week: u8,
    pub period_index: u32,
    pub subject_id: String,
    pub teacher_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

// ─── Options ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: String,
    pub name: String,
}

/// Pick lists from `GET /api/schedule/options`. Class order is the grid's
/// column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub classes: Vec<SchoolClass>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
}

// ─── User / Session ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub school_name: Option<String>,
}
