use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

/// Where the signed identity payload for outbound requests comes from.
///
/// Injected into the client and controller so tests can substitute a fixed
/// token instead of reaching into ambient host state.
pub trait IdentitySource: Send + Sync {
    fn current_token(&self) -> Option<String>;

    /// Deprecated plain user-id fallback for local testing. `None` unless
    /// the provider has it explicitly enabled and no token is available.
    fn legacy_user_id(&self) -> Option<String> {
        None
    }
}

/// The chat-platform runtime object the mini-app is embedded in. The token
/// it hands out may be populated asynchronously after startup.
pub trait HostRuntime: Send + Sync {
    fn init_data(&self) -> Option<String>;
}

const HOST_RECHECK_DELAY: Duration = Duration::from_millis(500);

#[derive(Default)]
struct IdentityState {
    manual: Option<String>,
    host_token: Option<String>,
    recheck_scheduled: bool,
}

/// Resolves the identity token in order: manual override, then the token
/// last read from the host runtime. Nothing is ever written to durable
/// storage.
pub struct IdentityProvider {
    host: Option<Arc<dyn HostRuntime>>,
    allow_legacy: bool,
    legacy_user_id: Option<String>,
    state: Arc<Mutex<IdentityState>>,
}

impl IdentityProvider {
    pub fn new(
        host: Option<Arc<dyn HostRuntime>>,
        allow_legacy: bool,
        legacy_user_id: Option<String>,
    ) -> Self {
        Self {
            host,
            allow_legacy,
            legacy_user_id,
            state: Arc::new(Mutex::new(IdentityState::default())),
        }
    }

    /// Re-read the token from the host runtime. If the host is present but
    /// has not populated its token yet, schedule a single re-check after a
    /// short delay; callers are not blocked and keep seeing "absent" until
    /// the re-check lands.
    pub fn refresh(&self) {
        if self.read_host_token() {
            return;
        }
        let Some(host) = self.host.clone() else {
            warn!("host runtime not available; requests will carry no identity token");
            return;
        };

        let mut state = self.state.lock().expect("identity state poisoned");
        if state.recheck_scheduled {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime; skipping delayed identity re-check");
            return;
        };
        state.recheck_scheduled = true;
        drop(state);

        let shared = Arc::clone(&self.state);
        handle.spawn(async move {
            tokio::time::sleep(HOST_RECHECK_DELAY).await;
            let token = host.init_data().filter(|data| !data.trim().is_empty());
            let mut state = shared.lock().expect("identity state poisoned");
            if token.is_some() {
                state.host_token = token;
                debug!("identity token appeared after delayed re-check");
            } else {
                warn!("host runtime present but identity token still empty after re-check");
            }
            state.recheck_scheduled = false;
        });
    }

    /// Reads the host token into the cache. Returns true when a non-empty
    /// token was found.
    fn read_host_token(&self) -> bool {
        let token = self
            .host
            .as_ref()
            .and_then(|host| host.init_data())
            .filter(|data| !data.trim().is_empty());
        let found = token.is_some();
        let mut state = self.state.lock().expect("identity state poisoned");
        if found {
            state.host_token = token;
        }
        found
    }

    /// Manually supplied token, e.g. pasted into the debug page when testing
    /// outside the host app. Rejects blank input.
    pub fn apply_manual(&self, data: &str) -> bool {
        let trimmed = data.trim();
        if trimmed.is_empty() {
            return false;
        }
        let mut state = self.state.lock().expect("identity state poisoned");
        state.manual = Some(trimmed.to_string());
        true
    }

    pub fn clear_manual(&self) {
        let mut state = self.state.lock().expect("identity state poisoned");
        state.manual = None;
    }
}

impl IdentitySource for IdentityProvider {
    fn current_token(&self) -> Option<String> {
        let state = self.state.lock().expect("identity state poisoned");
        state.manual.clone().or_else(|| state.host_token.clone())
    }

    fn legacy_user_id(&self) -> Option<String> {
        if !self.allow_legacy || self.current_token().is_some() {
            return None;
        }
        let id = self.legacy_user_id.clone()?;
        warn!("using deprecated plain user_id fallback; request will not be authenticated");
        Some(id)
    }
}
