use thiserror::Error;

/// Failures surfaced by the calendar API client and the registration flows.
///
/// Per-event parse failures are not represented here: the adaptation
/// pipeline drops malformed events silently (see `events`).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach server")]
    Unreachable(#[source] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("malformed response body")]
    Decode(#[source] reqwest::Error),
    #[error("no identity available")]
    MissingIdentity,
}

impl ApiError {
    /// User-facing message for the host UI. Transient; cleared on the next
    /// successful load.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unreachable(_) => {
                "Cannot reach the server. Check your connection and try again.".into()
            }
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Decode(_) => "The server returned an unexpected response.".into(),
            ApiError::MissingIdentity => {
                "Sign-in required. Please open the calendar through the bot's \
                 \"Open calendar\" button, not a plain browser tab."
                    .into()
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Unreachable(err)
        }
    }
}
