use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Month,
    Week,
    Day,
    Schedule,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week => "week",
            ViewMode::Day => "day",
            ViewMode::Schedule => "schedule",
        }
    }

    /// Lenient query-parameter parse: anything unrecognized means month,
    /// matching what the server-side routing does with a bad `view`.
    pub fn from_query(value: &str) -> Self {
        value.parse().unwrap_or(ViewMode::Month)
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "month" => Ok(ViewMode::Month),
            "week" => Ok(ViewMode::Week),
            "day" => Ok(ViewMode::Day),
            "schedule" => Ok(ViewMode::Schedule),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

/// Calendar envelope returned by `GET /api/calendar`. The server is
/// authoritative for all five dates: month length and week-start convention
/// are never recomputed client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarPayload {
    pub current_date: NaiveDate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub prev_date: NaiveDate,
    pub next_date: NaiveDate,
    #[serde(default)]
    pub is_coach: bool,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(flatten)]
    pub data: ViewData,
}

impl CalendarPayload {
    pub fn view(&self) -> ViewMode {
        self.data.view()
    }
}

/// View-specific payload shape, tagged by `view`. Exactly one shape per
/// payload; an unknown tag is a decode error rather than an empty calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ViewData {
    Month {
        #[serde(default)]
        calendar_days: Vec<CalendarDay>,
    },
    Week {
        #[serde(default)]
        week_days: Vec<WeekDayHeader>,
        #[serde(default, deserialize_with = "null_as_empty")]
        week_days_data: Vec<WeekDay>,
        #[serde(default)]
        time_slots: Vec<String>,
    },
    Day {
        #[serde(default, deserialize_with = "null_as_empty")]
        events: Vec<RawSessionEvent>,
        #[serde(default)]
        time_slots: Vec<String>,
    },
    Schedule {
        #[serde(default, deserialize_with = "null_as_empty")]
        training_days: Vec<ScheduleDay>,
    },
}

impl ViewData {
    pub fn view(&self) -> ViewMode {
        match self {
            ViewData::Month { .. } => ViewMode::Month,
            ViewData::Week { .. } => ViewMode::Week,
            ViewData::Day { .. } => ViewMode::Day,
            ViewData::Schedule { .. } => ViewMode::Schedule,
        }
    }
}

/// Column header of the week grid ("Mon" / "24").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDayHeader {
    pub name: String,
    pub day: String,
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub is_today: bool,
    #[serde(default)]
    pub is_other_month: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<RawSessionEvent>,
}

/// One day bucket of the week view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekDay {
    pub name: String,
    pub day: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_today: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<RawSessionEvent>,
}

/// A session as it appears inside a calendar payload. `time` is a display
/// string, either "HH:MM" or "HH:MM - HH:MM"; the adaptation pipeline parses
/// it, the model keeps it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSessionEvent {
    pub id: i64,
    pub title: String,
    pub time: String,
    #[serde(default)]
    pub coach: String,
    #[serde(default, deserialize_with = "lenient_index")]
    pub color_index: Option<i64>,
    #[serde(default)]
    pub user_id: String,
}

/// Coach-facing agenda shape carried by the `schedule` view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trainings: Vec<TrainingView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingView {
    pub id: i64,
    pub group_name: String,
    pub start_time: String,
    pub end_time: String,
    pub coach_name: String,
    #[serde(default)]
    pub participants: i64,
    #[serde(default)]
    pub participant_names: String,
    #[serde(default)]
    pub max_participants: i64,
    #[serde(default)]
    pub can_register: bool,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default, deserialize_with = "lenient_index")]
    pub color_index: Option<i64>,
}

/// Session detail record fetched on demand for the modal. Discarded when
/// the modal closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDetails {
    pub training: Training,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub participants_count: i64,
    #[serde(default)]
    pub is_coach: bool,
    #[serde(default)]
    pub is_training_coach: bool,
    #[serde(default)]
    pub can_mark_attendance: bool,
    #[serde(default)]
    pub is_registered: bool,
    #[serde(default)]
    pub can_register: bool,
    #[serde(default)]
    pub is_full: bool,
    #[serde(default)]
    pub is_past: bool,
    #[serde(default)]
    pub current_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: i64,
    pub group_name: String,
    pub training_date: String,
    pub start_time: String,
    pub end_time: String,
    pub coach_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub max_participants: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub student_id: i64,
    pub student_name: String,
    #[serde(default)]
    pub created_at: String,
}

/// Ad hoc status object returned by `GET /api/check-registration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationStatus {
    #[serde(default)]
    pub registered: bool,
    #[serde(default)]
    pub attendance: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: i64,
}

/// Day buckets routinely arrive with `events: null` instead of an empty
/// array; both decode to an empty vector.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `color_index` is occasionally missing or garbage; anything that is not a
/// plain integer becomes `None` and falls back to the first palette entry.
fn lenient_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_i64())
}
