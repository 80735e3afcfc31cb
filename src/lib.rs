pub mod client;
pub mod controller;
pub mod error;
pub mod events;
pub mod identity;
pub mod models;
pub mod settings;

use std::sync::Arc;

use tracing::info;

use crate::client::CalendarClient;
use crate::controller::{CalendarController, UserPrompt};
use crate::identity::{HostRuntime, IdentityProvider, IdentitySource};
use crate::settings::Settings;

/// Fully wired client core: settings, identity provider, API client and
/// view-state controller. The embedding renderer owns the event loop and
/// drives `controller` from it.
pub struct App {
    pub settings: Settings,
    pub identity: Arc<IdentityProvider>,
    pub client: Arc<CalendarClient>,
    pub controller: CalendarController,
}

impl App {
    /// Compose the client core from environment settings. `host` is the
    /// chat-platform runtime when embedded, `None` when running in a plain
    /// browser tab (where only the deprecated legacy flow can work).
    pub fn bootstrap(
        host: Option<Arc<dyn HostRuntime>>,
        prompts: Arc<dyn UserPrompt>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let settings = Settings::from_env()?;

        let env_filter = if settings.debug { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .without_time()
            .init();

        let identity = Arc::new(IdentityProvider::new(
            host,
            settings.allow_legacy_user_id,
            settings.legacy_user_id.clone(),
        ));
        identity.refresh();

        let client = Arc::new(CalendarClient::new(
            settings.api_base_url.clone(),
            Arc::clone(&identity) as Arc<dyn IdentitySource>,
        ));
        let controller = CalendarController::new(
            Arc::clone(&client),
            Arc::clone(&identity) as Arc<dyn IdentitySource>,
            prompts,
        );

        info!("calendar client ready, backend at {}", settings.api_base_url);
        Ok(Self {
            settings,
            identity,
            client,
            controller,
        })
    }
}
