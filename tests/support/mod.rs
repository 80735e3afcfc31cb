#![allow(dead_code)]

use std::sync::Mutex;

use serde_json::{Value, json};
use training_calendar_client::controller::UserPrompt;
use training_calendar_client::identity::IdentitySource;

/// Identity stub with a fixed token and/or legacy id.
pub struct FixedIdentity {
    pub token: Option<String>,
    pub legacy: Option<String>,
}

impl FixedIdentity {
    pub fn token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            legacy: None,
        }
    }

    pub fn legacy(user_id: &str) -> Self {
        Self {
            token: None,
            legacy: Some(user_id.to_string()),
        }
    }

    pub fn none() -> Self {
        Self {
            token: None,
            legacy: None,
        }
    }
}

impl IdentitySource for FixedIdentity {
    fn current_token(&self) -> Option<String> {
        self.token.clone()
    }

    fn legacy_user_id(&self) -> Option<String> {
        if self.token.is_some() {
            return None;
        }
        self.legacy.clone()
    }
}

/// Prompt double that answers every confirmation the same way and records
/// everything shown to the user.
pub struct RecordingPrompt {
    pub confirm_answer: bool,
    pub confirmations: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub fn answering(confirm_answer: bool) -> Self {
        Self {
            confirm_answer,
            confirmations: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl UserPrompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.confirmations.lock().unwrap().push(message.to_string());
        self.confirm_answer
    }

    fn notify(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

pub fn month_payload() -> Value {
    json!({
        "view": "month",
        "current_date": "2024-06-10",
        "start_date": "2024-06-01",
        "end_date": "2024-06-30",
        "prev_date": "2024-05-01",
        "next_date": "2024-07-01",
        "is_coach": false,
        "user_name": "Ann",
        "user_id": "7",
        "calendar_days": [
            {
                "date": "2024-06-10",
                "is_today": true,
                "is_other_month": false,
                "events": [
                    {"id": 42, "title": "WOD", "time": "18:00 - 19:30", "coach": "Kate", "color_index": 2, "user_id": "7"}
                ]
            },
            {"date": "2024-06-11", "is_today": false, "is_other_month": false, "events": null}
        ]
    })
}

pub fn week_payload() -> Value {
    json!({
        "view": "week",
        "current_date": "2024-06-12",
        "start_date": "2024-06-10",
        "end_date": "2024-06-16",
        "prev_date": "2024-06-03",
        "next_date": "2024-06-17",
        "is_coach": false,
        "user_name": "Ann",
        "user_id": "7",
        "week_days_data": [
            {"name": "Mon", "day": 10, "date": "2024-06-10", "is_today": false, "events": null},
            {"name": "Tue", "day": 11, "date": "2024-06-11", "is_today": false, "events": []},
            {"name": "Wed", "day": 12, "date": "2024-06-12", "is_today": true, "events": [
                {"id": 1, "title": "WOD", "time": "18:00 - 19:30", "coach": "Kate", "color_index": 0, "user_id": "7"},
                {"id": 2, "title": "Open Gym", "time": "18:30 - 20:00", "coach": "Tom", "color_index": 1, "user_id": "7"}
            ]},
            {"name": "Thu", "day": 13, "date": "2024-06-13", "is_today": false, "events": []},
            {"name": "Fri", "day": 14, "date": "2024-06-14", "is_today": false, "events": []},
            {"name": "Sat", "day": 15, "date": "2024-06-15", "is_today": false, "events": []},
            {"name": "Sun", "day": 16, "date": "2024-06-16", "is_today": false, "events": []}
        ]
    })
}

pub fn details_payload(training_id: i64) -> Value {
    json!({
        "training": {
            "id": training_id,
            "group_name": "CrossFit",
            "training_date": "2024-06-10",
            "start_time": "18:00",
            "end_time": "19:30",
            "coach_name": "Kate",
            "description": "Conditioning",
            "max_participants": 12
        },
        "participants": [
            {"student_id": 5, "student_name": "Ann", "created_at": "2024-06-01T10:00:00Z"}
        ],
        "participants_count": 1,
        "is_coach": false,
        "is_training_coach": false,
        "can_mark_attendance": false,
        "is_registered": false,
        "can_register": true,
        "is_full": false,
        "is_past": false,
        "current_time": "2024-06-09T12:00:00Z"
    })
}
