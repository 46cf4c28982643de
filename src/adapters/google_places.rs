use crate::core::budget::RequestBudget;
use crate::domain::model::PlaceDetails;
use crate::domain::ports::{Geocoder, LookupError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DETAIL_FIELDS: &str = "geometry,formatted_address,name,address_components";

/// Places API client: Find Place from Text, then Place Details.
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        budget: &mut RequestBudget,
    ) -> Result<T, LookupError> {
        budget.acquire().await?;

        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("Places request {}/{}: {}", budget.used(), budget.limit(), url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(http_error)?;

        tracing::debug!("Places response status: {}", response.status());
        response
            .error_for_status()
            .map_err(http_error)?
            .json::<T>()
            .await
            .map_err(http_error)
    }

    /// `place_id` of the best candidate for a free-text query.
    pub async fn find_place_id(
        &self,
        query: &str,
        budget: &mut RequestBudget,
    ) -> Result<String, LookupError> {
        let body: FindPlaceResponse = self
            .get(
                "findplacefromtext/json",
                &[
                    ("input", query),
                    ("inputtype", "textquery"),
                    ("fields", "place_id"),
                ],
                budget,
            )
            .await?;

        match body.status.as_str() {
            "OK" => body
                .candidates
                .into_iter()
                .find_map(|candidate| candidate.place_id)
                .ok_or(LookupError::NotFound),
            "ZERO_RESULTS" => Err(LookupError::NotFound),
            _ => Err(LookupError::ApiStatus {
                status: body.status,
                message: body.error_message,
            }),
        }
    }

    pub async fn place_details(
        &self,
        place_id: &str,
        budget: &mut RequestBudget,
    ) -> Result<PlaceDetails, LookupError> {
        let body: DetailsResponse = self
            .get(
                "details/json",
                &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
                budget,
            )
            .await?;

        if body.status != "OK" {
            return Err(LookupError::ApiStatus {
                status: body.status,
                message: body.error_message,
            });
        }

        let result = body.result.ok_or(LookupError::MissingGeometry)?;
        let (latitude, longitude) = result
            .geometry
            .and_then(|geometry| geometry.location)
            .and_then(|location| Some((location.lat?, location.lng?)))
            .ok_or(LookupError::MissingGeometry)?;

        let country_code = result
            .address_components
            .into_iter()
            .find(|component| component.types.iter().any(|t| t == "country"))
            .and_then(|component| component.short_name);

        Ok(PlaceDetails {
            formatted_address: result.formatted_address.unwrap_or_default(),
            latitude,
            longitude,
            name: result.name.unwrap_or_default(),
            country_code,
        })
    }
}

// reqwest errors carry the request URL, and with it the `key` parameter.
fn http_error(e: reqwest::Error) -> LookupError {
    LookupError::Http(e.without_url())
}

#[async_trait]
impl Geocoder for GooglePlacesClient {
    async fn lookup(
        &self,
        query: &str,
        budget: &mut RequestBudget,
    ) -> Result<PlaceDetails, LookupError> {
        let place_id = self.find_place_id(query, budget).await?;
        self.place_details(&place_id, budget).await
    }
}

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    status: String,
    #[serde(default)]
    candidates: Vec<Candidate>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    geometry: Option<Geometry>,
    formatted_address: Option<String>,
    name: Option<String>,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    short_name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}
