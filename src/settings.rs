use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: Url,
    pub debug: bool,
    /// Enables the deprecated plain user-id fallback for requests issued
    /// without a host identity token. Off by default; meant for local
    /// testing against a development backend only.
    pub allow_legacy_user_id: bool,
    pub legacy_user_id: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix
            .add_source(Environment::with_prefix("APP").separator("_"))
            .set_default("api_base_url", "http://localhost:8080/api")?
            .set_default("debug", false)?
            .set_default("allow_legacy_user_id", false)?
            .set_default("legacy_user_id", None::<String>)?
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults() {
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_base_url.as_str(), "http://localhost:8080/api");
        assert!(!settings.debug);
        assert!(!settings.allow_legacy_user_id);
        assert!(settings.legacy_user_id.is_none());
    }
}
