use crate::core::budget::RequestBudget;
use crate::core::enrichment::enrich_rows;
use crate::core::geojson::FeatureBuilder;
use crate::core::{ConfigProvider, EnrichmentReport, Geocoder, InputRow, Pipeline, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

/// CSV in, Places lookups, GeoJSON out.
pub struct GeoJsonPipeline<S: Storage, C: ConfigProvider, G: Geocoder> {
    storage: S,
    config: C,
    geocoder: G,
    started_at: DateTime<Utc>,
}

impl<S: Storage, C: ConfigProvider, G: Geocoder> GeoJsonPipeline<S, C, G> {
    pub fn new(storage: S, config: C, geocoder: G) -> Self {
        Self {
            storage,
            config,
            geocoder,
            started_at: Utc::now(),
        }
    }

    /// Pins the `date` stamped on every feature.
    pub fn with_start_time(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    fn parse_rows(&self, data: &[u8]) -> Result<Vec<InputRow>> {
        let columns = self.config.columns();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(data);

        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        let mut blank = 0usize;

        for record in reader.records() {
            let record = record?;
            let row = InputRow::new(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            );
            if row.is_blank(columns) {
                blank += 1;
                continue;
            }
            rows.push(row);
        }

        if blank > 0 {
            tracing::debug!("Ignored {} rows without '{}' or '{}'", blank, columns.title, columns.url);
        }
        Ok(rows)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, G: Geocoder> Pipeline for GeoJsonPipeline<S, C, G> {
    async fn extract(&self) -> Result<Vec<InputRow>> {
        tracing::debug!("Reading CSV from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        self.parse_rows(&data)
    }

    async fn transform(&self, rows: Vec<InputRow>) -> Result<EnrichmentReport> {
        let mut budget = RequestBudget::new(self.config.request_limit(), self.config.request_delay());
        enrich_rows(
            &self.geocoder,
            rows,
            self.config.columns(),
            self.config.unresolved_policy(),
            &mut budget,
        )
        .await
    }

    async fn load(&self, report: &EnrichmentReport) -> Result<String> {
        let date = self.started_at.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let collection = FeatureBuilder::new(self.config.columns(), date).collection(&report.entries);
        let json = collection.to_pretty_json()?;

        tracing::debug!(
            "Writing {} features ({} bytes)",
            collection.features.len(),
            json.len()
        );
        self.storage
            .write_file(self.config.output_path(), json.as_bytes())
            .await?;

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ColumnNames, UnresolvedPolicy};
    use crate::domain::model::PlaceDetails;
    use crate::domain::ports::LookupError;
    use crate::utils::error::GeoEnrichError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                GeoEnrichError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        columns: ColumnNames,
        request_limit: u64,
        policy: UnresolvedPolicy,
    }

    impl MockConfig {
        fn new(request_limit: u64) -> Self {
            Self {
                columns: ColumnNames::default(),
                request_limit,
                policy: UnresolvedPolicy::Emit,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "places.csv"
        }

        fn output_path(&self) -> &str {
            "places.geojson"
        }

        fn columns(&self) -> &ColumnNames {
            &self.columns
        }

        fn request_limit(&self) -> u64 {
            self.request_limit
        }

        fn request_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn unresolved_policy(&self) -> UnresolvedPolicy {
            self.policy
        }
    }

    /// Resolves every query to (1, 2) except "Atlantis".
    struct FixedGeocoder;

    #[async_trait::async_trait]
    impl Geocoder for FixedGeocoder {
        async fn lookup(
            &self,
            query: &str,
            budget: &mut RequestBudget,
        ) -> std::result::Result<PlaceDetails, LookupError> {
            budget.acquire().await?;
            if query == "Atlantis" {
                return Err(LookupError::NotFound);
            }
            Ok(PlaceDetails {
                formatted_address: format!("{}, Somewhere", query),
                latitude: 1.0,
                longitude: 2.0,
                name: query.to_string(),
                country_code: None,
            })
        }
    }

    const CSV: &str = "Title,Note,URL,Comment\n\
Rijksmuseum,,https://www.google.com/maps/place/Rijksmuseum/data=!4m2!3m1!1s0x1:0x2,\n\
,,,\n\
Atlantis,lost,,\n\
\"Café, Bar\",,,\n";

    #[tokio::test]
    async fn test_extract_skips_blank_rows() {
        let storage = MockStorage::with_file("places.csv", CSV);
        let pipeline = GeoJsonPipeline::new(storage, MockConfig::new(10), FixedGeocoder);

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("Title"), Some("Rijksmuseum"));
        assert_eq!(rows[1].get("Note"), Some("lost"));
        assert_eq!(rows[2].get("Title"), Some("Café, Bar"));
    }

    #[tokio::test]
    async fn test_extract_header_only() {
        let storage = MockStorage::with_file("places.csv", "Title,URL\n");
        let pipeline = GeoJsonPipeline::new(storage, MockConfig::new(10), FixedGeocoder);
        assert!(pipeline.extract().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_input() {
        let storage = MockStorage::with_file("other.csv", CSV);
        let pipeline = GeoJsonPipeline::new(storage, MockConfig::new(10), FixedGeocoder);
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, GeoEnrichError::IoError(_)));
    }

    #[tokio::test]
    async fn test_full_pass_writes_feature_collection() {
        let storage = MockStorage::with_file("places.csv", CSV);
        let started_at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let pipeline = GeoJsonPipeline::new(storage.clone(), MockConfig::new(10), FixedGeocoder)
            .with_start_time(started_at);

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();
        let path = pipeline.load(&report).await.unwrap();

        assert_eq!(path, "places.geojson");
        let written = storage.get_file("places.geojson").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&written).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["geometry"]["coordinates"], serde_json::json!([2.0, 1.0]));
        assert_eq!(features[0]["properties"]["date"], "2024-05-01T12:00:00Z");
        assert!(features[1]["geometry"].is_null());
        assert_eq!(features[2]["properties"]["name"], "Café, Bar");
    }

    #[tokio::test]
    async fn test_transform_respects_request_limit() {
        let storage = MockStorage::with_file("places.csv", CSV);
        let pipeline = GeoJsonPipeline::new(storage, MockConfig::new(1), FixedGeocoder);

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();

        assert_eq!(report.summary.requests_used, 1);
        assert_eq!(report.summary.enriched, 1);
        assert!(report.summary.limit_reached);
    }
}
