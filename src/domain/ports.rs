use crate::core::budget::RequestBudget;
use crate::domain::model::{
    ColumnNames, EnrichmentReport, InputRow, PlaceDetails, UnresolvedPolicy, UnresolvedReason,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn columns(&self) -> &ColumnNames;
    fn request_limit(&self) -> u64;
    fn request_delay(&self) -> Duration;
    fn unresolved_policy(&self) -> UnresolvedPolicy;
}

/// Failure of a single place lookup.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("request limit reached")]
    BudgetExhausted,

    #[error("no place matches the query")]
    NotFound,

    #[error("Places API status {status}: {}", .message.as_deref().unwrap_or("no details"))]
    ApiStatus {
        status: String,
        message: Option<String>,
    },

    #[error("place has no geometry")]
    MissingGeometry,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl LookupError {
    /// A rejected key fails every later lookup too, so the run stops.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ApiStatus { status, .. } if status == "REQUEST_DENIED")
    }

    pub fn reason(&self) -> UnresolvedReason {
        match self {
            Self::BudgetExhausted => UnresolvedReason::BudgetExhausted,
            Self::NotFound => UnresolvedReason::NotFound,
            Self::ApiStatus { status, .. } => UnresolvedReason::ApiStatus(status.clone()),
            Self::MissingGeometry => UnresolvedReason::MissingGeometry,
            Self::Http(e) => UnresolvedReason::RequestFailed(e.to_string()),
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves a free-text query. Every outbound request must be
    /// acquired from `budget` first.
    async fn lookup(
        &self,
        query: &str,
        budget: &mut RequestBudget,
    ) -> std::result::Result<PlaceDetails, LookupError>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<InputRow>>;
    async fn transform(&self, rows: Vec<InputRow>) -> Result<EnrichmentReport>;
    async fn load(&self, report: &EnrichmentReport) -> Result<String>;
}
