//! RFC 7946 output document.

use crate::domain::model::{ColumnNames, EnrichedRecord, Entry, InputRow, UnresolvedRecord};
use crate::utils::error::Result;
use crate::utils::maps_url;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NO_LOCATION_COMMENT: &str = "No location information is available for this place";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// `[longitude, latitude]`
    Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Turns enrichment entries into features, stamping each with `date`.
pub struct FeatureBuilder<'a> {
    columns: &'a ColumnNames,
    date: String,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(columns: &'a ColumnNames, date: impl Into<String>) -> Self {
        Self {
            columns,
            date: date.into(),
        }
    }

    pub fn collection<'e>(&self, entries: impl IntoIterator<Item = &'e Entry>) -> FeatureCollection {
        FeatureCollection {
            features: entries.into_iter().map(|entry| self.feature(entry)).collect(),
        }
    }

    pub fn feature(&self, entry: &Entry) -> Feature {
        match entry {
            Entry::Enriched(record) => self.enriched(record),
            Entry::Unresolved(record) => self.unresolved(record),
        }
    }

    fn enriched(&self, record: &EnrichedRecord) -> Feature {
        let details = &record.details;
        let title = record.row.title(self.columns);
        let url = record.row.url(self.columns);

        let mut properties = row_properties(&record.row);
        properties.insert(
            "formatted_address".into(),
            details.formatted_address.clone().into(),
        );
        properties.insert("latitude".into(), details.latitude.into());
        properties.insert("longitude".into(), details.longitude.into());
        let name = if details.name.is_empty() {
            title
        } else {
            details.name.as_str()
        };
        properties.insert("name".into(), name.into());
        if let Some(country_code) = &details.country_code {
            properties.insert("country_code".into(), country_code.clone().into());
        }
        let maps_link = if url.is_empty() {
            maps_url::search_url(title)
        } else {
            url.to_string()
        };
        properties.insert("google_maps_url".into(), maps_link.into());
        self.insert_common(&mut properties, url);

        Feature {
            geometry: Some(Geometry::Point {
                coordinates: [details.longitude, details.latitude],
            }),
            properties,
        }
    }

    fn unresolved(&self, record: &UnresolvedRecord) -> Feature {
        let url = record.row.url(self.columns);

        let mut properties = row_properties(&record.row);
        properties.insert("google_maps_url".into(), url.into());
        self.insert_common(&mut properties, url);
        properties.insert("lookup_status".into(), record.reason.status().into());
        properties.insert("comment".into(), NO_LOCATION_COMMENT.into());

        Feature {
            geometry: None,
            properties,
        }
    }

    fn insert_common(&self, properties: &mut Map<String, Value>, url: &str) {
        if let Some(place_ref) = maps_url::place_ref_from_url(url) {
            properties.insert("place_ref".into(), place_ref.into());
        }
        properties.insert("date".into(), self.date.clone().into());
    }
}

fn row_properties(row: &InputRow) -> Map<String, Value> {
    row.fields
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}
