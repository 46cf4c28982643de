use crate::domain::model::UnresolvedPolicy;
use crate::utils::error::{GeoEnrichError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every section and key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub places: Option<PlacesConfig>,
    pub limits: Option<LimitsConfig>,
    pub input: Option<InputConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacesConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    pub request_limit: Option<u64>,
    pub request_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    pub title_column: Option<String>,
    pub url_column: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub unresolved: Option<UnresolvedPolicy>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GeoEnrichError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_toml_str_with_env(content, |name| std::env::var(name).ok())
    }

    pub fn from_toml_str_with_env(
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let processed_content = substitute_env_vars(content, env);

        toml::from_str(&processed_content).map_err(|e| GeoEnrichError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Key from `[places] api_key`, unless it still holds an unset `${VAR}`.
    pub fn api_key(&self) -> Option<&str> {
        self.places
            .as_ref()
            .and_then(|places| places.api_key.as_deref())
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.contains("${"))
    }
}

/// Replaces `${VAR}` with the variable's value; unknown variables stay as written.
fn substitute_env_vars(content: &str, env: impl Fn(&str) -> Option<String>) -> String {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        env(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .into_owned()
}
