pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{GooglePlacesClient, LocalStorage};
pub use crate::config::Settings;
pub use crate::core::{
    budget::RequestBudget,
    etl::{EtlEngine, RunOutcome},
    pipeline::GeoJsonPipeline,
};
pub use crate::utils::error::{GeoEnrichError, Result};
