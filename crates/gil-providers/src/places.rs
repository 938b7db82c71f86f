//! Google Places detail lookup.
//!
//! Two round trips: a Text Search to resolve the free-text query to a
//! `place_id`, then a Details call for address, phone and opening hours.
//! Any failure along the way collapses to `None` so the chat layer can fall
//! back to a plain-text answer.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ProviderError;

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";

#[derive(Debug, Clone, Serialize)]
pub struct PlaceDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub location: Option<PlaceLocation>,
    pub opening_hours: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlaceLocation {
    pub lat: f64,
    pub lng: f64,
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<TextSearchResult>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    status: String,
    result: Option<DetailsResult>,
}

#[derive(Debug, Default, Deserialize)]
struct DetailsResult {
    name: Option<String>,
    formatted_address: Option<String>,
    formatted_phone_number: Option<String>,
    geometry: Option<Geometry>,
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<PlaceLocation>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GooglePlaces {
    http: reqwest::Client,
    api_key: String,
}

impl GooglePlaces {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self { http, api_key: api_key.into() }
    }

    /// Resolve a place query to its details, or `None` when the key is unset
    /// or the place cannot be found.
    pub async fn details(&self, query: &str) -> Option<PlaceDetails> {
        if self.api_key.is_empty() {
            return None;
        }
        match self.details_inner(query).await {
            Ok(details) => details,
            Err(e) => {
                warn!(%query, error = %e, "place details failed");
                None
            }
        }
    }

    async fn details_inner(&self, query: &str) -> Result<Option<PlaceDetails>, ProviderError> {
        let search: TextSearchResponse = self
            .http
            .get(TEXT_SEARCH_URL)
            .query(&[("query", query), ("key", &self.api_key), ("language", "ko")])
            .send()
            .await?
            .json()
            .await?;
        if search.status != "OK" {
            return Ok(None);
        }
        let Some(place_id) = search.results.into_iter().next().and_then(|r| r.place_id) else {
            return Ok(None);
        };

        let details: DetailsResponse = self
            .http
            .get(DETAILS_URL)
            .query(&[
                ("place_id", place_id.as_str()),
                ("key", &self.api_key),
                ("language", "ko"),
                ("fields", "name,formatted_address,formatted_phone_number,geometry,opening_hours"),
            ])
            .send()
            .await?
            .json()
            .await?;
        if details.status != "OK" {
            return Ok(None);
        }
        let result = details.result.unwrap_or_default();

        let opening_hours = match result.opening_hours {
            Some(hours) if !hours.weekday_text.is_empty() => hours.weekday_text.join("\n"),
            _ => "운영시간 정보 없음".to_owned(),
        };
        Ok(Some(PlaceDetails {
            name: result.name.unwrap_or_else(|| "이름 없음".to_owned()),
            address: result.formatted_address.unwrap_or_else(|| "주소 없음".to_owned()),
            phone: result.formatted_phone_number.unwrap_or_else(|| "전화번호 없음".to_owned()),
            location: result.geometry.and_then(|g| g.location),
            opening_hours,
        }))
    }
}
