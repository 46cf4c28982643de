use crate::utils::error::{GeoEnrichError, Result};
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> GeoEnrichError {
    GeoEnrichError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// An http(s) base URL for the Places API, e.g. a mock server in tests.
pub fn validate_base_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("not a URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("scheme must be http or https, got {}", url.scheme()),
        ));
    }
    Ok(())
}

pub fn validate_path(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "path is empty"));
    }
    if value.contains('\0') {
        return Err(invalid(field, value.escape_default(), "path contains a NUL byte"));
    }
    Ok(())
}

/// Whole seconds, since that is how the flag and the config file set it.
pub fn validate_timeout(field: &str, value: Duration) -> Result<()> {
    if value.as_secs() < 1 {
        return Err(invalid(field, format!("{:?}", value), "must be at least 1 second"));
    }
    Ok(())
}

pub fn validate_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "must not be blank"));
    }
    Ok(())
}

/// The GeoJSON must not land on top of the CSV it was built from.
pub fn validate_distinct_output(field: &str, input: &str, output: &str) -> Result<()> {
    if input == output {
        return Err(invalid(field, output, "would overwrite the input file"));
    }
    Ok(())
}
