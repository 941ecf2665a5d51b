pub mod event;
pub mod ui;

use crate::api::{ScheduleBundle, SkoolwayClient};
use crate::cache::{save_cache, CacheData};
use crate::models::*;
use crate::schedule::{
    build_grid_from_slots, build_periods_display, day_number, validate_config, Cell, DisplayRow,
    Grid, SCHOOL_DAYS,
};
use chrono::{DateTime, Datelike, Utc, Weekday};
use ratatui::widgets::ListState as RListState;
use tokio::sync::oneshot;
use tracing::{info, warn};

// ─── Modals ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum AssignState {
    #[default]
    Hidden,
    PickSubject,
    PickTeacher,
    /// Free-text room, may be left blank.
    RoomInput,
    Submitting,
    Done { success: bool, message: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SettingsState {
    #[default]
    Hidden,
    Editing,
    Submitting,
    Done { success: bool, message: String },
}

/// The empty cell a new lesson is being assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTarget {
    pub class_id: String,
    pub class_name: String,
    pub day: Weekday,
    pub period_index: u32,
}

pub const SETTINGS_FIELDS: [&str; 3] = [
    "Periods per day",
    "Period length (min)",
    "First period starts",
];

pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

// ─── Background Fetch Result ─────────────────────────────────────────────────

pub struct FetchResult {
    pub user: Option<User>,
    pub bundle: Option<ScheduleBundle>,
    pub fetched_at: DateTime<Utc>,
    /// Non-fatal error message to show in the status bar.
    pub error: Option<String>,
}

// ─── Navigation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Timetable,
    Periods,
    Classes,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Timetable, Tab::Periods, Tab::Classes];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Timetable => "Timetable",
            Tab::Periods => "Periods",
            Tab::Classes => "Classes",
        }
    }

    pub fn next(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        Tab::ALL[(idx + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        if idx == 0 {
            Tab::ALL[Tab::ALL.len() - 1]
        } else {
            Tab::ALL[idx - 1]
        }
    }
}

// ─── App State ──────────────────────────────────────────────────────────────

pub struct App {
    pub client: SkoolwayClient,
    pub running: bool,
    pub active_tab: Tab,

    // Data
    pub user: Option<User>,
    pub config: TimetableConfig,
    pub options: ScheduleOptions,
    pub slots: Vec<LessonSlot>,

    // Derived, rebuilt in full on every data change
    pub rows: Vec<DisplayRow>,
    pub grid: Grid,

    // UI state
    pub day_idx: usize,
    pub row_list_state: ListState,
    pub class_cursor: usize,
    pub period_list_state: ListState,
    pub class_list_state: ListState,

    // Status
    pub status_message: String,
    pub loading: bool,
    pub needs_refresh: bool,
    pub cached_at: Option<DateTime<Utc>>,

    // Background fetch channel
    pub fetch_rx: Option<oneshot::Receiver<FetchResult>>,

    // Assign-lesson modal
    pub assign_state: AssignState,
    pub assign_target: Option<SlotTarget>,
    pub assign_subject: Option<usize>,
    pub assign_teacher: Option<usize>,
    pub assign_cursor: usize,
    pub assign_room: String,

    // Settings modal
    pub settings_state: SettingsState,
    pub settings_fields: [String; 3],
    pub settings_cursor: usize,
    pub settings_error: Option<String>,

    pub action_rx: Option<oneshot::Receiver<ActionResult>>,

    // Incremented each frame; used to drive the loading spinner.
    pub frame_count: u64,
}

/// Tracks logical selection plus a persistent ratatui scroll offset.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    /// Move down, clamped at the last item.
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    /// Move up, clamped at the first item.
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new(client: SkoolwayClient) -> Self {
        Self {
            client,
            running: true,
            active_tab: Tab::Timetable,
            user: None,
            config: TimetableConfig::default(),
            options: ScheduleOptions::default(),
            slots: Vec::new(),
            rows: Vec::new(),
            grid: Grid::default(),
            day_idx: today_idx(Utc::now().weekday()),
            row_list_state: ListState::new(),
            class_cursor: 0,
            period_list_state: ListState::new(),
            class_list_state: ListState::new(),
            status_message: "Loading...".into(),
            loading: true,
            needs_refresh: false,
            cached_at: None,
            fetch_rx: None,
            assign_state: AssignState::Hidden,
            assign_target: None,
            assign_subject: None,
            assign_teacher: None,
            assign_cursor: 0,
            assign_room: String::new(),
            settings_state: SettingsState::Hidden,
            settings_fields: Default::default(),
            settings_cursor: 0,
            settings_error: None,
            action_rx: None,
            frame_count: 0,
        }
    }

    pub fn selected_day(&self) -> Weekday {
        SCHOOL_DAYS[self.day_idx.min(SCHOOL_DAYS.len() - 1)]
    }

    pub fn next_day(&mut self) {
        self.day_idx = (self.day_idx + 1) % SCHOOL_DAYS.len();
    }

    pub fn prev_day(&mut self) {
        self.day_idx = (self.day_idx + SCHOOL_DAYS.len() - 1) % SCHOOL_DAYS.len();
    }

    pub fn next_class(&mut self) {
        if self.class_cursor + 1 < self.options.classes.len() {
            self.class_cursor += 1;
        }
    }

    pub fn prev_class(&mut self) {
        self.class_cursor = self.class_cursor.saturating_sub(1);
    }

    pub fn selected_row(&self) -> Option<&DisplayRow> {
        self.rows.get(self.row_list_state.selected)
    }

    pub fn selected_cell(&self) -> Option<&Cell> {
        self.grid
            .cell(self.selected_day(), self.row_list_state.selected, self.class_cursor)
    }

    /// Replace the schedule inputs and rebuild rows and grid from scratch.
    pub fn set_schedule(&mut self, bundle: ScheduleBundle) -> bool {
        self.config = bundle.config;
        self.options = bundle.options;
        self.slots = bundle.slots;
        self.rebuild_timetable()
    }

    /// Re-run both builders against the current config, classes and slots.
    /// Returns `false` when the config could not be laid out.
    pub fn rebuild_timetable(&mut self) -> bool {
        let ok = match build_periods_display(Some(&self.config)) {
            Ok(rows) => {
                self.rows = rows;
                true
            }
            Err(e) => {
                warn!(error = %e, "timetable config rejected");
                self.rows = Vec::new();
                self.status_message = format!("Timetable config error: {e}");
                false
            }
        };
        self.grid = build_grid_from_slots(&self.slots, &self.options.classes, &self.rows);

        self.row_list_state.set_len(self.rows.len());
        self.period_list_state.set_len(self.rows.len());
        self.class_list_state.set_len(self.options.classes.len());
        self.class_cursor = self
            .class_cursor
            .min(self.options.classes.len().saturating_sub(1));
        ok
    }

    /// Populate app state from a previously saved cache without making any
    /// network requests.
    pub fn load_from_cache(&mut self, cache: CacheData) {
        self.user = cache.user;
        self.cached_at = Some(cache.cached_at);
        self.loading = false;
        let ok = self.set_schedule(ScheduleBundle {
            config: cache.config,
            options: cache.options,
            slots: cache.slots,
        });

        if ok {
            let synced = cache
                .cached_at
                .with_timezone(&chrono::Local)
                .format("%b %d %H:%M");
            self.status_message = format!(
                "Hi, {}! Showing cached timetable from {synced}; press r to refresh.",
                self.display_name()
            );
        }
    }

    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.name.clone())
            .unwrap_or_else(|| "Admin".into())
    }

    /// Spawn a background task that fetches the session and schedule data
    /// without blocking the event loop. No-ops if a fetch is already running.
    pub fn start_fetch(&mut self) {
        if self.fetch_rx.is_some() {
            return;
        }
        let client = self.client.clone();
        let (tx, rx) = oneshot::channel();
        self.fetch_rx = Some(rx);
        self.loading = true;
        self.status_message = "Syncing in background…".into();
        tokio::spawn(async move {
            let result = fetch_schedule_data(client).await;
            let _ = tx.send(result);
        });
    }

    /// Check the background fetch channel without blocking. Returns `true`
    /// and applies the result to app state when data has arrived.
    pub fn poll_fetch_result(&mut self) -> bool {
        let result = match self.fetch_rx.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(r) => r,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.fetch_rx = None;
                    self.loading = false;
                    return false;
                }
            },
        };
        self.fetch_rx = None;
        self.apply_fetch_result(result);
        true
    }

    pub fn apply_fetch_result(&mut self, result: FetchResult) {
        self.loading = false;
        if result.user.is_some() {
            self.user = result.user;
        }

        let mut ok = true;
        if let Some(bundle) = result.bundle {
            self.cached_at = Some(result.fetched_at);
            ok = self.set_schedule(bundle);
        }

        if let Some(err) = result.error {
            self.status_message = format!("Sync error: {err}");
        } else if ok {
            let synced = result
                .fetched_at
                .with_timezone(&chrono::Local)
                .format("%b %d %H:%M");
            self.status_message = format!(
                "Welcome, {}! {} classes, {} lessons. Synced {synced}.",
                self.display_name(),
                self.options.classes.len(),
                self.slots.len()
            );
        }
    }

    // ── Assign lesson ───────────────────────────────────────────────────

    /// Open the assign modal for the selected cell. Only empty period cells
    /// can take a new lesson.
    pub fn open_assign_modal(&mut self) {
        let Some(DisplayRow::Period(period)) = self.selected_row() else {
            self.status_message = "Breaks cannot hold lessons.".into();
            return;
        };
        let period_index = period.period_index;

        let Some(class) = self.options.classes.get(self.class_cursor) else {
            self.status_message = "No classes to schedule.".into();
            return;
        };

        match self.selected_cell() {
            Some(Cell::Empty) => {}
            Some(Cell::Filled(f)) => {
                self.status_message = format!("Already taken by {}.", f.subject_name);
                return;
            }
            _ => return,
        }

        if self.options.subjects.is_empty() || self.options.teachers.is_empty() {
            self.status_message = "Add subjects and teachers before scheduling.".into();
            return;
        }

        self.assign_target = Some(SlotTarget {
            class_id: class.id.clone(),
            class_name: class.name.clone(),
            day: self.selected_day(),
            period_index,
        });
        self.assign_subject = None;
        self.assign_teacher = None;
        self.assign_cursor = 0;
        self.assign_room.clear();
        self.assign_state = AssignState::PickSubject;
    }

    /// Length of the pick list the assign modal is currently showing.
    pub fn assign_choices(&self) -> usize {
        match self.assign_state {
            AssignState::PickSubject => self.options.subjects.len(),
            AssignState::PickTeacher => self.options.teachers.len(),
            _ => 0,
        }
    }

    /// Confirm the current assign step and advance to the next one.
    pub fn assign_confirm(&mut self) {
        match self.assign_state {
            AssignState::PickSubject => {
                self.assign_subject = Some(self.assign_cursor);
                self.assign_cursor = 0;
                self.assign_state = AssignState::PickTeacher;
            }
            AssignState::PickTeacher => {
                self.assign_teacher = Some(self.assign_cursor);
                self.assign_cursor = 0;
                self.assign_state = AssignState::RoomInput;
            }
            AssignState::RoomInput => self.start_assign(),
            _ => {}
        }
    }

    /// Body for `POST /api/schedule/slots` from the modal's choices.
    pub fn assign_request(&self) -> Option<NewLessonSlot> {
        let target = self.assign_target.as_ref()?;
        let subject = self.options.subjects.get(self.assign_subject?)?;
        let teacher = self.options.teachers.get(self.assign_teacher?)?;
        let room = self.assign_room.trim();
        Some(NewLessonSlot {
            class_id: target.class_id.clone(),
            day_of_week: day_number(target.day),
            period_index: target.period_index,
            subject_id: subject.id.clone(),
            teacher_id: teacher.id.clone(),
            room: (!room.is_empty()).then(|| room.to_string()),
        })
    }

    fn start_assign(&mut self) {
        let Some(body) = self.assign_request() else {
            self.assign_state = AssignState::Done {
                success: false,
                message: "Incomplete lesson: pick a subject and a teacher.".into(),
            };
            return;
        };
        self.assign_state = AssignState::Submitting;
        let client = self.client.clone();
        self.spawn_action(async move {
            match client.create_slot(&body).await {
                Ok(slot) => {
                    info!(slot_id = %slot.id, "lesson created");
                    ActionResult {
                        success: true,
                        message: "Lesson scheduled! Press any key to close.".into(),
                    }
                }
                Err(e) => ActionResult {
                    success: false,
                    message: format!("Scheduling failed: {e}"),
                },
            }
        });
    }

    // ── Settings ────────────────────────────────────────────────────────

    pub fn open_settings_modal(&mut self) {
        self.settings_fields = [
            self.config.period_count.to_string(),
            self.config
                .period_duration_minutes
                .map(|m| m.to_string())
                .unwrap_or_default(),
            self.config.first_period_start_time.clone().unwrap_or_default(),
        ];
        self.settings_cursor = 0;
        self.settings_error = None;
        self.settings_state = SettingsState::Editing;
    }

    /// Build the config the settings form describes and validate it. Breaks
    /// that now fall after the last period are dropped.
    pub fn settings_draft(&self) -> Result<TimetableConfig, String> {
        let [count, minutes, start] = &self.settings_fields;
        let period_count = count
            .trim()
            .parse::<u32>()
            .map_err(|_| "Periods per day must be a whole number.".to_string())?;
        let period_duration_minutes = match minutes.trim() {
            "" => None,
            m => Some(
                m.parse::<u32>()
                    .map_err(|_| "Period length must be a whole number of minutes.".to_string())?,
            ),
        };
        let first_period_start_time = match start.trim() {
            "" => None,
            s => Some(s.to_string()),
        };

        let draft = TimetableConfig {
            period_count,
            period_duration_minutes,
            first_period_start_time,
            breaks: self
                .config
                .breaks
                .iter()
                .filter(|b| b.after_period_index <= period_count)
                .cloned()
                .collect(),
        };
        validate_config(&draft).map_err(|e| e.to_string())?;
        Ok(draft)
    }

    pub fn submit_settings(&mut self) {
        let draft = match self.settings_draft() {
            Ok(d) => d,
            Err(e) => {
                self.settings_error = Some(e);
                return;
            }
        };
        self.settings_error = None;
        self.settings_state = SettingsState::Submitting;
        let client = self.client.clone();
        self.spawn_action(async move {
            match client.update_schedule_config(&draft).await {
                Ok(_) => {
                    info!(periods = draft.period_count, "timetable settings saved");
                    ActionResult {
                        success: true,
                        message: "Settings saved! Press any key to close.".into(),
                    }
                }
                Err(e) => ActionResult {
                    success: false,
                    message: format!("Saving settings failed: {e}"),
                },
            }
        });
    }

    // ── Background actions ──────────────────────────────────────────────

    fn spawn_action<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = ActionResult> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.action_rx = Some(rx);
        tokio::spawn(async move {
            let _ = tx.send(task.await);
        });
    }

    /// Poll for a completed modal action. Returns true when done.
    pub fn poll_action_result(&mut self) -> bool {
        let result = match self.action_rx.as_mut() {
            None => return false,
            Some(rx) => match rx.try_recv() {
                Ok(r) => r,
                Err(oneshot::error::TryRecvError::Empty) => return false,
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.action_rx = None;
                    return false;
                }
            },
        };
        self.action_rx = None;
        self.finish_action(result);
        true
    }

    pub fn finish_action(&mut self, result: ActionResult) {
        let ActionResult { success, message } = result;
        if self.assign_state == AssignState::Submitting {
            self.assign_state = AssignState::Done { success, message };
        } else if self.settings_state == SettingsState::Submitting {
            self.settings_state = SettingsState::Done { success, message };
        }
        if success {
            self.needs_refresh = true;
        }
    }

    pub fn active_list_state_mut(&mut self) -> &mut ListState {
        match self.active_tab {
            Tab::Timetable => &mut self.row_list_state,
            Tab::Periods => &mut self.period_list_state,
            Tab::Classes => &mut self.class_list_state,
        }
    }

    /// Lessons scheduled for a class across the whole week.
    pub fn weekly_lessons(&self, class_idx: usize) -> usize {
        SCHOOL_DAYS
            .iter()
            .flat_map(|&d| self.grid.day(d))
            .filter(|row| matches!(row.get(class_idx), Some(Cell::Filled(_))))
            .count()
    }
}

fn today_idx(today: Weekday) -> usize {
    SCHOOL_DAYS.iter().position(|d| *d == today).unwrap_or(0)
}

// ─── Background fetch (runs in a spawned task) ───────────────────────────────

async fn fetch_schedule_data(client: SkoolwayClient) -> FetchResult {
    let mut result = FetchResult {
        user: None,
        bundle: None,
        fetched_at: Utc::now(),
        error: None,
    };

    match client.get_me().await {
        Ok(user) => result.user = Some(user),
        Err(e) => {
            result.error = Some(format!("fetching session: {e}"));
            return result;
        }
    }

    match client.fetch_schedule_bundle().await {
        Ok(bundle) => result.bundle = Some(bundle),
        Err(e) => {
            result.error = Some(format!("fetching timetable: {e}"));
            return result;
        }
    }

    result.fetched_at = Utc::now();
    info!("timetable synced");

    // Save cache from within the background task so the main thread never blocks.
    if let Some(bundle) = &result.bundle {
        let cache = CacheData {
            cached_at: result.fetched_at,
            user: result.user.clone(),
            config: bundle.config.clone(),
            options: bundle.options.clone(),
            slots: bundle.slots.clone(),
        };
        if let Err(e) = save_cache(&cache) {
            result.error = Some(format!("saving cache: {e}"));
        }
    }

    result
}
