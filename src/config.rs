//! Run configuration, resolved once at startup.

use crate::error::ConfigError;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the Supabase project URL.
pub const SUPABASE_URL_VAR: &str = "SUPABASE_URL";
/// Environment variable holding the Supabase service-role key.
pub const SUPABASE_SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";

/// Bucket that holds every avatar.
pub const DEFAULT_BUCKET: &str = "profile-pictures";

/// Connection settings for the Supabase project (storage + database).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project URL, without trailing slash.
    pub url: String,
    /// Service-role key, used for both `apikey` and bearer auth.
    pub service_key: String,
    /// Storage bucket name.
    pub bucket: String,
}

impl StoreConfig {
    /// Reads the store settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the store settings through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = required(&lookup, SUPABASE_URL_VAR)?;
        let service_key = required(&lookup, SUPABASE_SERVICE_KEY_VAR)?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
            bucket: DEFAULT_BUCKET.to_string(),
        })
    }

    /// Overrides the bucket name.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }
}

/// Everything the generation job needs.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key, for both vision and image generation.
    pub openai_api_key: String,
    /// Storage and database settings.
    pub store: StoreConfig,
}

impl Config {
    /// Reads the full configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the full configuration through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let openai_api_key = required(&lookup, OPENAI_API_KEY_VAR)?;
        let store = StoreConfig::from_lookup(&lookup)?;
        Ok(Self {
            openai_api_key,
            store,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingVar(var))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_lookup(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_SERVICE_KEY", "service"),
        ]))
        .unwrap();

        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.store.url, "https://abc.supabase.co");
        assert_eq!(config.store.bucket, DEFAULT_BUCKET);
    }

    #[test]
    fn test_missing_openai_key() {
        let err = Config::from_lookup(env(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("OPENAI_API_KEY")));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = StoreConfig::from_lookup(env(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("SUPABASE_SERVICE_KEY")));
    }

    #[test]
    fn test_store_config_without_openai_key() {
        let store = StoreConfig::from_lookup(env(&[
            ("SUPABASE_URL", "https://abc.supabase.co"),
            ("SUPABASE_SERVICE_KEY", "service"),
        ]))
        .unwrap()
        .with_bucket("other");
        assert_eq!(store.bucket, "other");
    }
}
