use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;

use crate::client::CalendarClient;
use crate::error::ApiError;
use crate::events::{AdaptedEvents, DisplayEvent, adapt_events};
use crate::identity::IdentitySource;
use crate::models::{CalendarPayload, TrainingDetails, ViewMode};

/// Blocking confirmation/alert surface of the host UI. Injected so flows
/// can be driven headless in tests.
pub trait UserPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
    fn notify(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    LoadError,
}

/// Detail-modal sub-state, orthogonal to the load phase. A failed detail
/// fetch keeps the modal open so the error stays visible.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    LoadingDetail,
    DetailShown(TrainingDetails),
    DetailFailed,
}

/// A ticketed calendar fetch. Outcomes carry the ticket back so the
/// controller can discard responses that a newer navigation superseded.
pub struct LoadRequest {
    ticket: u64,
    view: ViewMode,
    date: Option<NaiveDate>,
    legacy_user_id: Option<String>,
    client: Arc<CalendarClient>,
}

impl LoadRequest {
    pub async fn fetch(self) -> LoadOutcome {
        let result = self
            .client
            .fetch_calendar(self.view, self.date, self.legacy_user_id.as_deref())
            .await;
        LoadOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

pub struct LoadOutcome {
    ticket: u64,
    result: Result<CalendarPayload, ApiError>,
}

pub struct DetailRequest {
    ticket: u64,
    training_id: i64,
    client: Arc<CalendarClient>,
}

impl DetailRequest {
    pub async fn fetch(self) -> DetailOutcome {
        let result = self.client.training_details(self.training_id).await;
        DetailOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

pub struct DetailOutcome {
    ticket: u64,
    result: Result<TrainingDetails, ApiError>,
}

enum Credential {
    Token,
    Legacy(String),
}

/// Owns the current view mode, anchor date, loaded payload and modal state;
/// orchestrates loads, navigation and the registration flows.
pub struct CalendarController {
    client: Arc<CalendarClient>,
    identity: Arc<dyn IdentitySource>,
    prompts: Arc<dyn UserPrompt>,
    view: ViewMode,
    anchor: NaiveDate,
    payload: Option<CalendarPayload>,
    adapted: AdaptedEvents,
    phase: LoadPhase,
    error: Option<String>,
    modal: ModalState,
    load_seq: u64,
    detail_seq: u64,
}

impl CalendarController {
    pub fn new(
        client: Arc<CalendarClient>,
        identity: Arc<dyn IdentitySource>,
        prompts: Arc<dyn UserPrompt>,
    ) -> Self {
        Self {
            client,
            identity,
            prompts,
            view: ViewMode::Month,
            anchor: Local::now().date_naive(),
            payload: None,
            adapted: AdaptedEvents::default(),
            phase: LoadPhase::Idle,
            error: None,
            modal: ModalState::Closed,
            load_seq: 0,
            detail_seq: 0,
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn payload(&self) -> Option<&CalendarPayload> {
        self.payload.as_ref()
    }

    pub fn events(&self) -> &[DisplayEvent] {
        &self.adapted.events
    }

    pub fn skipped_events(&self) -> usize {
        self.adapted.skipped
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }

    /// Issue a ticketed calendar fetch and move to `Loading`. The caller
    /// drives the request to completion and feeds the outcome back through
    /// [`apply_load`](Self::apply_load).
    pub fn begin_load(&mut self, view: ViewMode, date: Option<NaiveDate>) -> LoadRequest {
        self.load_seq += 1;
        self.phase = LoadPhase::Loading;
        self.error = None;
        LoadRequest {
            ticket: self.load_seq,
            view,
            date,
            legacy_user_id: self.identity.legacy_user_id(),
            client: Arc::clone(&self.client),
        }
    }

    /// Apply a resolved fetch. Outcomes from superseded tickets are dropped
    /// so a stale slow response can never clobber a newer one.
    pub fn apply_load(&mut self, outcome: LoadOutcome) {
        if outcome.ticket != self.load_seq {
            debug!(
                ticket = outcome.ticket,
                latest = self.load_seq,
                "discarding stale calendar response"
            );
            return;
        }
        match outcome.result {
            Ok(payload) => {
                self.view = payload.view();
                // The week grid anchors at the echoed week start; day and
                // month anchor at the echoed current date.
                self.anchor = match self.view {
                    ViewMode::Week => payload.start_date,
                    _ => payload.current_date,
                };
                self.adapted = adapt_events(&payload);
                self.payload = Some(payload);
                self.phase = LoadPhase::Loaded;
                self.error = None;
            }
            Err(err) => {
                self.payload = None;
                self.adapted = AdaptedEvents::default();
                self.phase = LoadPhase::LoadError;
                self.error = Some(format!("Failed to load calendar: {}", err.user_message()));
            }
        }
    }

    /// Linear load for sequential drivers: begin, fetch, apply.
    pub async fn load(&mut self, view: ViewMode, date: Option<NaiveDate>) {
        let request = self.begin_load(view, date);
        let outcome = request.fetch().await;
        self.apply_load(outcome);
    }

    /// Switch view mode. Re-selecting the current mode is a no-op: no
    /// fetch, no state change. Returns whether a load was issued.
    pub async fn change_view(&mut self, view: ViewMode) -> bool {
        if view == self.view {
            return false;
        }
        self.load(view, Some(self.anchor)).await;
        true
    }

    /// Navigate backwards using the server-echoed boundary date.
    pub async fn navigate_prev(&mut self) {
        let Some(date) = self.payload.as_ref().map(|p| p.prev_date) else {
            return;
        };
        self.load(self.view, Some(date)).await;
    }

    /// Navigate forwards using the server-echoed boundary date.
    pub async fn navigate_next(&mut self) {
        let Some(date) = self.payload.as_ref().map(|p| p.next_date) else {
            return;
        };
        self.load(self.view, Some(date)).await;
    }

    /// Open the detail modal for a session and issue the ticketed fetch.
    pub fn begin_details(&mut self, training_id: i64) -> DetailRequest {
        self.detail_seq += 1;
        self.modal = ModalState::LoadingDetail;
        DetailRequest {
            ticket: self.detail_seq,
            training_id,
            client: Arc::clone(&self.client),
        }
    }

    pub fn apply_details(&mut self, outcome: DetailOutcome) {
        if outcome.ticket != self.detail_seq {
            debug!(
                ticket = outcome.ticket,
                latest = self.detail_seq,
                "discarding stale detail response"
            );
            return;
        }
        if self.modal == ModalState::Closed {
            // The modal was dismissed while the fetch was in flight.
            return;
        }
        match outcome.result {
            Ok(details) => self.modal = ModalState::DetailShown(details),
            Err(err) => {
                self.error = Some(format!(
                    "Failed to load session details: {}",
                    err.user_message()
                ));
                self.modal = ModalState::DetailFailed;
            }
        }
    }

    pub async fn show_details(&mut self, training_id: i64) {
        let request = self.begin_details(training_id);
        let outcome = request.fetch().await;
        self.apply_details(outcome);
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    /// Register for the session currently shown in the modal. Aborts with an
    /// instructive prompt, before any network call, when no identity is
    /// available. Returns whether the registration went through.
    pub async fn register(&mut self) -> bool {
        self.submit_registration(RegistrationAction::Register).await
    }

    /// Cancel the registration for the session currently shown in the modal.
    pub async fn cancel_registration(&mut self) -> bool {
        self.submit_registration(RegistrationAction::Cancel).await
    }

    async fn submit_registration(&mut self, action: RegistrationAction) -> bool {
        let ModalState::DetailShown(details) = &self.modal else {
            return false;
        };
        let training_id = details.training.id;

        let Some(credential) = self.available_credential() else {
            self.prompts.notify(&ApiError::MissingIdentity.user_message());
            return false;
        };
        if !self.prompts.confirm(action.confirmation()) {
            return false;
        }

        let legacy = match &credential {
            Credential::Token => None,
            Credential::Legacy(user_id) => Some(user_id.as_str()),
        };
        let result = match action {
            RegistrationAction::Register => self.client.register(training_id, legacy).await,
            RegistrationAction::Cancel => self.client.cancel(training_id, legacy).await,
        };

        match result {
            Ok(_) => {
                self.prompts.notify(action.success_message());
                self.close_modal();
                self.load(self.view, Some(self.anchor)).await;
                true
            }
            Err(err) => {
                self.prompts
                    .notify(&format!("{}: {}", action.failure_prefix(), err.user_message()));
                false
            }
        }
    }

    fn available_credential(&self) -> Option<Credential> {
        if self.identity.current_token().is_some() {
            return Some(Credential::Token);
        }
        self.identity.legacy_user_id().map(Credential::Legacy)
    }

    /// Heading for the navigation chrome, derived from the server-echoed
    /// boundary dates.
    pub fn heading(&self) -> String {
        let Some(payload) = &self.payload else {
            return String::new();
        };
        match payload.view() {
            ViewMode::Day => format_full_date(payload.current_date),
            _ => format!(
                "{} – {}",
                format_day_month(payload.start_date),
                format_day_month_year(payload.end_date)
            ),
        }
    }
}

#[derive(Clone, Copy)]
enum RegistrationAction {
    Register,
    Cancel,
}

impl RegistrationAction {
    fn confirmation(self) -> &'static str {
        match self {
            RegistrationAction::Register => "Register for this session?",
            RegistrationAction::Cancel => "Cancel your registration for this session?",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            RegistrationAction::Register => "You are registered for the session.",
            RegistrationAction::Cancel => "Your registration was cancelled.",
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            RegistrationAction::Register => "Registration failed",
            RegistrationAction::Cancel => "Cancellation failed",
        }
    }
}

fn format_full_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {} {}",
        date.format("%A"),
        date.day(),
        date.format("%B"),
        date.year()
    )
}

fn format_day_month(date: NaiveDate) -> String {
    format!("{} {}", date.day(), date.format("%B"))
}

fn format_day_month_year(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), date.format("%B"), date.year())
}
