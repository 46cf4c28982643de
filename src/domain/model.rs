use crate::utils::maps_url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the CSV columns that carry the place title and its Maps link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    pub title: String,
    pub url: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            url: "URL".to_string(),
        }
    }
}

/// One CSV record, fields kept in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRow {
    pub fields: Vec<(String, String)>,
}

impl InputRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value.trim())
    }

    pub fn title(&self, columns: &ColumnNames) -> &str {
        self.get(&columns.title).unwrap_or_default()
    }

    pub fn url(&self, columns: &ColumnNames) -> &str {
        self.get(&columns.url).unwrap_or_default()
    }

    /// Rows without a title and without a URL carry nothing to look up.
    pub fn is_blank(&self, columns: &ColumnNames) -> bool {
        self.title(columns).is_empty() && self.url(columns).is_empty()
    }

    /// The place name encoded in the Maps URL is more precise than a
    /// free-form title, so it wins when present.
    pub fn query(&self, columns: &ColumnNames) -> Option<String> {
        if let Some(name) = maps_url::place_name_from_url(self.url(columns)) {
            return Some(name);
        }
        let title = self.title(columns);
        (!title.is_empty()).then(|| title.to_string())
    }

    /// Short label for log lines.
    pub fn label(&self, columns: &ColumnNames) -> String {
        let title = self.title(columns);
        let url = self.url(columns);
        if !title.is_empty() {
            title.to_string()
        } else if !url.is_empty() {
            url.to_string()
        } else {
            "(no title/url)".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub formatted_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub row: InputRow,
    pub details: PlaceDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    NoQuery,
    NotFound,
    ApiStatus(String),
    RequestFailed(String),
    MissingGeometry,
    BudgetExhausted,
}

impl UnresolvedReason {
    /// Value of the `lookup_status` output property.
    pub fn status(&self) -> &'static str {
        match self {
            Self::NoQuery => "no_query",
            Self::NotFound => "not_found",
            Self::ApiStatus(_) => "api_error",
            Self::RequestFailed(_) => "request_failed",
            Self::MissingGeometry => "missing_geometry",
            Self::BudgetExhausted => "request_limit_reached",
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoQuery => write!(f, "no title or place name to search for"),
            Self::NotFound => write!(f, "no matching place"),
            Self::ApiStatus(status) => write!(f, "Places API returned {}", status),
            Self::RequestFailed(message) => write!(f, "request failed: {}", message),
            Self::MissingGeometry => write!(f, "place has no coordinates"),
            Self::BudgetExhausted => write!(f, "request limit reached"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnresolvedRecord {
    pub row: InputRow,
    pub reason: UnresolvedReason,
}

/// What happens to rows whose lookup did not produce coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum UnresolvedPolicy {
    /// Keep the row as a feature with a null geometry.
    #[default]
    Emit,
    /// Leave the row out of the output.
    Skip,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Enriched(EnrichedRecord),
    Unresolved(UnresolvedRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_read: usize,
    pub enriched: usize,
    pub unresolved: usize,
    pub dropped: usize,
    pub requests_used: u64,
    pub request_limit: u64,
    pub limit_reached: bool,
}

impl RunSummary {
    /// Number of features in the output document.
    pub fn features_written(&self) -> usize {
        self.enriched + self.unresolved - self.dropped
    }
}

/// Result of the enrichment pass, in input order.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentReport {
    pub entries: Vec<Entry>,
    pub summary: RunSummary,
}
