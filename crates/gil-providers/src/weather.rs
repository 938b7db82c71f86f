//! OpenWeather current-conditions lookup.
//!
//! Answers are pre-formatted Korean sentences, failures included, so the chat
//! layer can hand them straight to the user.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;

const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

const NO_KEY_MESSAGE: &str = "❌ OpenWeather API 키가 설정되지 않았습니다.";

#[derive(Debug, Clone)]
pub struct OpenWeather {
    http: reqwest::Client,
    api_key: String,
}

impl OpenWeather {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self { http, api_key: api_key.into() }
    }

    /// Current weather for a city name.
    pub async fn current(&self, location: &str) -> String {
        if self.api_key.is_empty() {
            return NO_KEY_MESSAGE.to_owned();
        }
        let query = [
            ("q", location.to_owned()),
            ("appid", self.api_key.clone()),
            ("lang", "kr".to_owned()),
            ("units", "metric".to_owned()),
        ];
        match self.fetch(&query).await {
            Ok(resp) => describe(resp, Some(location)),
            Err(e) => format!("❌ 날씨 정보 호출 오류: {e}"),
        }
    }

    /// Current weather for a coordinate; the reported city name comes from
    /// the API response.
    pub async fn current_by_coords(&self, lat: f64, lng: f64) -> String {
        if self.api_key.is_empty() {
            return NO_KEY_MESSAGE.to_owned();
        }
        let query = [
            ("lat", lat.to_string()),
            ("lon", lng.to_string()),
            ("appid", self.api_key.clone()),
            ("lang", "kr".to_owned()),
            ("units", "metric".to_owned()),
        ];
        match self.fetch(&query).await {
            Ok(resp) => describe(resp, None),
            Err(e) => format!("❌ 날씨 정보 호출 오류: {e}"),
        }
    }

    async fn fetch(&self, query: &[(&str, String)]) -> Result<WeatherResponse, ProviderError> {
        let resp: WeatherResponse =
            self.http.get(WEATHER_URL).query(query).send().await?.json().await?;
        Ok(resp)
    }
}

fn describe(resp: WeatherResponse, location: Option<&str>) -> String {
    // OpenWeather sends cod as a number on success and a string on error.
    if resp.cod.as_i64() != Some(200) {
        let message = resp.message.unwrap_or_else(|| "알 수 없는 오류".to_owned());
        return format!("❌ 날씨 정보를 가져올 수 없습니다: {message}");
    }
    let Some(desc) = resp.weather.first().map(|w| w.description.as_str()) else {
        return "❌ 날씨 정보 호출 오류: 응답에 날씨 항목이 없습니다".to_owned();
    };
    let Some(main) = resp.main else {
        return "❌ 날씨 정보 호출 오류: 응답에 기온 항목이 없습니다".to_owned();
    };
    let city = match location {
        Some(location) => location,
        None => resp.name.as_deref().unwrap_or("해당 지역"),
    };
    format!(
        "{city} 현재 날씨는 '{desc}', 기온은 {temp}°C (체감 {feels}°C) 입니다.",
        temp = main.temp,
        feels = main.feels_like,
    )
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    cod: Value,
    message: Option<String>,
    #[serde(default)]
    weather: Vec<WeatherEntry>,
    main: Option<MainMetrics>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeatherEntry {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainMetrics {
    temp: f64,
    feels_like: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn success_response_describes_conditions() {
        let raw = r#"{
            "cod": 200,
            "weather": [{"description": "맑음"}],
            "main": {"temp": 23.4, "feels_like": 24.1},
            "name": "Busan"
        }"#;
        let resp: WeatherResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            describe(resp, Some("부산")),
            "부산 현재 날씨는 '맑음', 기온은 23.4°C (체감 24.1°C) 입니다."
        );
    }

    #[test]
    fn coords_variant_uses_api_city_name() {
        let raw = r#"{
            "cod": 200,
            "weather": [{"description": "흐림"}],
            "main": {"temp": 18.0, "feels_like": 17.5},
            "name": "Gangneung"
        }"#;
        let resp: WeatherResponse = serde_json::from_str(raw).unwrap();
        assert!(describe(resp, None).starts_with("Gangneung 현재 날씨는"));
    }

    #[test]
    fn string_cod_is_an_error() {
        let raw = r#"{"cod": "404", "message": "city not found"}"#;
        let resp: WeatherResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            describe(resp, Some("아무데")),
            "❌ 날씨 정보를 가져올 수 없습니다: city not found"
        );
    }

    #[tokio::test]
    async fn missing_key_short_circuits() {
        let client = OpenWeather::new(reqwest::Client::new(), "");
        assert_eq!(client.current("부산").await, NO_KEY_MESSAGE);
    }
}
