pub mod budget;
pub mod enrichment;
pub mod etl;
pub mod geojson;
pub mod pipeline;

pub use crate::domain::model::{
    ColumnNames, EnrichedRecord, EnrichmentReport, Entry, InputRow, PlaceDetails, RunSummary,
    UnresolvedPolicy, UnresolvedReason, UnresolvedRecord,
};
pub use crate::domain::ports::{ConfigProvider, Geocoder, LookupError, Pipeline, Storage};
pub use crate::utils::error::Result;
