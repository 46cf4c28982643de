use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::core::UnresolvedPolicy;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "geo-enrich")]
#[command(
    about = "Enrich a CSV of places with addresses and GPS coordinates and write GeoJSON",
    long_about = "Reads a CSV of places (e.g. a Google Maps saved places export), looks up \
                  each row with the Google Places API and writes a GeoJSON FeatureCollection.\n\n\
                  Requires GOOGLE_PLACES_API_KEY (or GOOGLE_MAPS_API_KEY) in the environment, \
                  a .env file, or [places] api_key in the config file."
)]
pub struct CliConfig {
    /// Input CSV file
    pub input: String,

    /// Output GeoJSON file [default: input path with .geojson extension]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional TOML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Maximum number of Places API requests for this run [default: 1000]
    #[arg(long)]
    pub request_limit: Option<u64>,

    /// Minimum spacing between requests in milliseconds [default: 200]
    #[arg(long)]
    pub request_delay_ms: Option<u64>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Column holding the place title [default: Title]
    #[arg(long)]
    pub title_column: Option<String>,

    /// Column holding the Google Maps URL [default: URL]
    #[arg(long)]
    pub url_column: Option<String>,

    /// What to do with rows that could not be located [default: emit]
    #[arg(long, value_enum)]
    pub unresolved: Option<UnresolvedPolicy>,

    /// Places API base URL
    #[arg(long)]
    pub places_base_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, help = "Log CPU and memory usage after each stage")]
    pub monitor: bool,
}

impl CliConfig {
    pub fn load_config_file(&self) -> Result<Option<TomlConfig>> {
        self.config
            .as_deref()
            .map(|path| {
                tracing::info!("📁 Loading configuration from: {}", path);
                TomlConfig::from_file(path)
            })
            .transpose()
    }

    /// Layers defaults, the config file, and flags, in that order.
    pub fn resolve(&self, env: impl Fn(&str) -> Option<String>) -> Result<Settings> {
        let file = self.load_config_file()?;
        let api_key = Settings::resolve_api_key(file.as_ref(), env)?;

        let mut settings = Settings::new(self.input.clone(), api_key);
        if let Some(file) = &file {
            settings.apply_file(file);
        }
        self.apply_flags(&mut settings);
        Ok(settings)
    }

    fn apply_flags(&self, settings: &mut Settings) {
        if let Some(output) = &self.output {
            settings.output_path = output.clone();
        }
        if let Some(limit) = self.request_limit {
            settings.request_limit = limit;
        }
        if let Some(delay) = self.request_delay_ms {
            settings.request_delay = Duration::from_millis(delay);
        }
        if let Some(timeout) = self.timeout_secs {
            settings.timeout = Duration::from_secs(timeout);
        }
        if let Some(title) = &self.title_column {
            settings.columns.title = title.clone();
        }
        if let Some(url) = &self.url_column {
            settings.columns.url = url.clone();
        }
        if let Some(policy) = self.unresolved {
            settings.unresolved = policy;
        }
        if let Some(base_url) = &self.places_base_url {
            settings.places_base_url = base_url.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::GeoEnrichError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn key_env(name: &str) -> Option<String> {
        (name == "GOOGLE_PLACES_API_KEY").then(|| "env-key".to_string())
    }

    #[test]
    fn test_parse_minimal_args() {
        let cli = CliConfig::try_parse_from(["geo-enrich", "places.csv"]).unwrap();
        let settings = cli.resolve(key_env).unwrap();

        assert_eq!(settings.input_path, "places.csv");
        assert_eq!(settings.output_path, "places.geojson");
        assert_eq!(settings.api_key, "env-key");
        assert_eq!(settings.request_limit, 1000);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[limits]\nrequest_limit = 50\nrequest_delay_ms = 10\n\n[output]\nunresolved = \"skip\""
        )
        .unwrap();

        let cli = CliConfig::try_parse_from([
            "geo-enrich",
            "places.csv",
            "--config",
            file.path().to_str().unwrap(),
            "--request-limit",
            "2",
            "--unresolved",
            "emit",
            "-o",
            "out.geojson",
            "--log-format",
            "json",
        ])
        .unwrap();
        let settings = cli.resolve(key_env).unwrap();

        assert_eq!(settings.request_limit, 2);
        assert_eq!(settings.request_delay, Duration::from_millis(10));
        assert_eq!(settings.unresolved, UnresolvedPolicy::Emit);
        assert_eq!(settings.output_path, "out.geojson");
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_key_fails_resolution() {
        let cli = CliConfig::try_parse_from(["geo-enrich", "places.csv"]).unwrap();
        let err = cli.resolve(|_| None).unwrap_err();
        assert!(matches!(err, GeoEnrichError::MissingConfigError { .. }));
    }

    #[test]
    fn test_missing_config_file() {
        let cli = CliConfig::try_parse_from([
            "geo-enrich",
            "places.csv",
            "--config",
            "/nonexistent/geo-enrich.toml",
        ])
        .unwrap();
        assert!(matches!(
            cli.resolve(key_env).unwrap_err(),
            GeoEnrichError::IoError(_)
        ));
    }

    #[test]
    fn test_input_is_required() {
        assert!(CliConfig::try_parse_from(["geo-enrich"]).is_err());
    }
}
