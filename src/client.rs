use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;
use url::{Url, form_urlencoded};

use crate::error::ApiError;
use crate::identity::IdentitySource;
use crate::models::{AuthResponse, CalendarPayload, RegistrationStatus, TrainingDetails, ViewMode};

/// Header carrying the host-supplied identity payload on every request that
/// has one available.
pub const INIT_DATA_HEADER: &str = "X-Telegram-Init-Data";

/// Thin client over the calendar REST backend. One method per server
/// capability; all responses are surfaced as typed models or `ApiError`.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: Arc<Url>,
    identity: Arc<dyn IdentitySource>,
}

impl CalendarClient {
    pub fn new(base_url: Url, identity: Arc<dyn IdentitySource>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Arc::new(base_url),
            identity,
        }
    }

    /// Fetch a calendar payload. The identity token travels in a header when
    /// available; otherwise `legacy_user_id` (if provided) is attached as a
    /// query parameter for the deprecated testing flow.
    pub async fn fetch_calendar(
        &self,
        view: ViewMode,
        date: Option<NaiveDate>,
        legacy_user_id: Option<&str>,
    ) -> Result<CalendarPayload, ApiError> {
        let token = self.identity_token();
        let mut query: Vec<(&str, String)> = vec![("view", view.to_string())];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if token.is_none() && let Some(user_id) = legacy_user_id {
            query.push(("user_id", user_id.to_string()));
        }
        let url =
            Url::parse_with_params(&format!("{}/calendar", self.base_url), &query).unwrap();

        let request = Self::with_token(self.http.get(url.as_str()), token.as_deref());
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    /// Fetch the detail record for one session. Identity goes in the header
    /// only; this endpoint has no legacy query fallback.
    pub async fn training_details(&self, training_id: i64) -> Result<TrainingDetails, ApiError> {
        let request = Self::with_token(
            self.http
                .get(format!("{}/training/{training_id}", self.base_url)),
            self.identity_token().as_deref(),
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    pub async fn register(
        &self,
        training_id: i64,
        legacy_user_id: Option<&str>,
    ) -> Result<String, ApiError> {
        self.submit("register", training_id, legacy_user_id).await
    }

    pub async fn cancel(
        &self,
        training_id: i64,
        legacy_user_id: Option<&str>,
    ) -> Result<String, ApiError> {
        self.submit("cancel", training_id, legacy_user_id).await
    }

    /// Registration mutations are form-encoded; their success bodies are
    /// plain text, never JSON.
    async fn submit(
        &self,
        action: &str,
        training_id: i64,
        legacy_user_id: Option<&str>,
    ) -> Result<String, ApiError> {
        let token = self.identity_token();
        let mut form = form_urlencoded::Serializer::new(String::new());
        form.append_pair("training_id", &training_id.to_string());
        if token.is_none() && let Some(user_id) = legacy_user_id {
            form.append_pair("user_id", user_id);
        }

        let request = Self::with_token(
            self.http
                .post(format!("{}/{action}", self.base_url))
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form.finish()),
            token.as_deref(),
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.text().await?)
    }

    pub async fn check_registration(
        &self,
        training_id: i64,
    ) -> Result<RegistrationStatus, ApiError> {
        let url = Url::parse_with_params(
            &format!("{}/check-registration", self.base_url),
            &[("training_id", training_id.to_string())],
        )
        .unwrap();
        let request = Self::with_token(self.http.get(url.as_str()), self.identity_token().as_deref());
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    /// Resolve the numeric user id from the identity token, server-side.
    pub async fn authenticate(&self) -> Result<AuthResponse, ApiError> {
        let request = Self::with_token(
            self.http.post(format!("{}/auth", self.base_url)),
            self.identity_token().as_deref(),
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    /// Introspection endpoint for the identity token. Only served by
    /// development deployments; production returns 404.
    pub async fn debug_init_data(&self) -> Result<Value, ApiError> {
        let request = Self::with_token(
            self.http.get(format!("{}/debug/initdata", self.base_url)),
            self.identity_token().as_deref(),
        );
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    fn identity_token(&self) -> Option<String> {
        let token = self.identity.current_token();
        if token.is_none() {
            debug!("issuing request without identity token");
        }
        token
    }

    fn with_token(
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header(INIT_DATA_HEADER, token),
            None => request,
        }
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ApiError::Http {
            status,
            message: extract_message(status, &body),
        }
    }
}

/// Error bodies arrive either as a bare string or as a structured object
/// with a `message` field; probe both before falling back to the code.
fn extract_message(status: u16, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {status}");
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if value.is_object() {
            return value.to_string();
        }
    }
    trimmed.to_string()
}
