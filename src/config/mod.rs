#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::google_places::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::core::{ColumnNames, ConfigProvider, UnresolvedPolicy};
use crate::utils::error::{GeoEnrichError, Result};
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use toml_config::TomlConfig;

/// Checked in order; the first non-empty value wins.
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_PLACES_API_KEY", "GOOGLE_MAPS_API_KEY"];

pub const DEFAULT_REQUEST_LIMIT: u64 = 1000;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(200);

pub fn api_key_from_env(env: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| env(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

/// `places.csv` -> `places.geojson`, next to the input.
pub fn default_output_path(input_path: &str) -> String {
    Path::new(input_path)
        .with_extension("geojson")
        .to_string_lossy()
        .into_owned()
}

/// Fully resolved run configuration.
#[derive(Clone)]
pub struct Settings {
    pub input_path: String,
    pub output_path: String,
    pub api_key: String,
    pub places_base_url: String,
    pub timeout: Duration,
    pub request_limit: u64,
    pub request_delay: Duration,
    pub columns: ColumnNames,
    pub unresolved: UnresolvedPolicy,
}

impl Settings {
    pub fn new(input_path: impl Into<String>, api_key: impl Into<String>) -> Self {
        let input_path = input_path.into();
        Self {
            output_path: default_output_path(&input_path),
            input_path,
            api_key: api_key.into(),
            places_base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            request_limit: DEFAULT_REQUEST_LIMIT,
            request_delay: DEFAULT_REQUEST_DELAY,
            columns: ColumnNames::default(),
            unresolved: UnresolvedPolicy::default(),
        }
    }

    /// Resolves the key: environment first, then the config file.
    pub fn resolve_api_key(
        file: Option<&TomlConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String> {
        api_key_from_env(env)
            .or_else(|| file.and_then(TomlConfig::api_key).map(str::to_string))
            .ok_or_else(|| GeoEnrichError::MissingConfigError {
                field: API_KEY_VARS[0].to_string(),
            })
    }

    pub fn apply_file(&mut self, file: &TomlConfig) {
        if let Some(places) = &file.places {
            if let Some(base_url) = &places.base_url {
                self.places_base_url = base_url.clone();
            }
            if let Some(timeout) = places.timeout_seconds {
                self.timeout = Duration::from_secs(timeout);
            }
        }
        if let Some(limits) = &file.limits {
            if let Some(limit) = limits.request_limit {
                self.request_limit = limit;
            }
            if let Some(delay) = limits.request_delay_ms {
                self.request_delay = Duration::from_millis(delay);
            }
        }
        if let Some(input) = &file.input {
            if let Some(title) = &input.title_column {
                self.columns.title = title.clone();
            }
            if let Some(url) = &input.url_column {
                self.columns.url = url.clone();
            }
        }
        if let Some(output) = &file.output {
            if let Some(path) = &output.path {
                self.output_path = path.clone();
            }
            if let Some(policy) = output.unresolved {
                self.unresolved = policy;
            }
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("input_path", &self.input_path)
            .field("output_path", &self.output_path)
            .field("api_key", &"<redacted>")
            .field("places_base_url", &self.places_base_url)
            .field("timeout", &self.timeout)
            .field("request_limit", &self.request_limit)
            .field("request_delay", &self.request_delay)
            .field("columns", &self.columns)
            .field("unresolved", &self.unresolved)
            .finish()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_blank(API_KEY_VARS[0], &self.api_key)?;
        validation::validate_path("input", &self.input_path)?;
        validation::validate_path("output.path", &self.output_path)?;
        validation::validate_distinct_output("output.path", &self.input_path, &self.output_path)?;
        validation::validate_base_url("places.base_url", &self.places_base_url)?;
        validation::validate_timeout("places.timeout_seconds", self.timeout)?;
        validation::validate_non_blank("input.title_column", &self.columns.title)?;
        validation::validate_non_blank("input.url_column", &self.columns.url)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    fn request_limit(&self) -> u64 {
        self.request_limit
    }

    fn request_delay(&self) -> Duration {
        self.request_delay
    }

    fn unresolved_policy(&self) -> UnresolvedPolicy {
        self.unresolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::new("data/Favourite places.csv", "key");
        assert_eq!(settings.output_path, "data/Favourite places.geojson");
        assert_eq!(settings.request_limit, 1000);
        assert_eq!(settings.request_delay, Duration::from_millis(200));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.unresolved, UnresolvedPolicy::Emit);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_api_key_precedence() {
        let file = TomlConfig::from_toml_str_with_env("[places]\napi_key = \"file-key\"\n", |_| None)
            .unwrap();

        let key = Settings::resolve_api_key(
            Some(&file),
            env_of(&[("GOOGLE_MAPS_API_KEY", "maps"), ("GOOGLE_PLACES_API_KEY", "places")]),
        )
        .unwrap();
        assert_eq!(key, "places");

        let key = Settings::resolve_api_key(
            Some(&file),
            env_of(&[("GOOGLE_PLACES_API_KEY", "  "), ("GOOGLE_MAPS_API_KEY", "maps")]),
        )
        .unwrap();
        assert_eq!(key, "maps");

        let key = Settings::resolve_api_key(Some(&file), env_of(&[])).unwrap();
        assert_eq!(key, "file-key");
    }

    #[test]
    fn test_missing_api_key() {
        let err = Settings::resolve_api_key(None, env_of(&[])).unwrap_err();
        match err {
            GeoEnrichError::MissingConfigError { field } => {
                assert_eq!(field, "GOOGLE_PLACES_API_KEY")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_apply_file() {
        let file = TomlConfig::from_toml_str_with_env(
            r#"
[limits]
request_limit = 2
request_delay_ms = 0

[output]
unresolved = "skip"
"#,
            |_| None,
        )
        .unwrap();

        let mut settings = Settings::new("places.csv", "key");
        settings.apply_file(&file);
        assert_eq!(settings.request_limit, 2);
        assert_eq!(settings.request_delay, Duration::ZERO);
        assert_eq!(settings.unresolved, UnresolvedPolicy::Skip);
        assert_eq!(settings.output_path, "places.geojson");
    }

    #[test]
    fn test_validation_failures() {
        let mut settings = Settings::new("places.csv", "key");
        settings.places_base_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::new("places.csv", "key");
        settings.output_path = "places.csv".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::new("places.csv", "key");
        settings.timeout = Duration::ZERO;
        assert!(settings.validate().is_err());

        let mut settings = Settings::new("places.csv", "key");
        settings.request_limit = 0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let settings = Settings::new("places.csv", "super-secret");
        assert!(!format!("{:?}", settings).contains("super-secret"));
    }
}
