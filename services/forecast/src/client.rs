//! HTTP client for the external forecast provider

use common::config::ForecastConfig;
use common::forecast::Location;
use tracing::debug;

use crate::ForecastError;
use crate::models::{ForecastDay, ForecastResponse};

#[derive(Clone)]
pub struct ForecastClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ForecastClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Client for the configured provider, `None` without an API key
    pub fn from_config(config: &ForecastConfig) -> Option<Self> {
        config
            .api_key
            .as_ref()
            .map(|key| Self::new(config.api_url.clone(), key.clone()))
    }

    /// Daily forecast for the next `days` days at `location`
    pub async fn fetch(&self, location: &Location, days: u8) -> Result<Vec<ForecastDay>, ForecastError> {
        let query = format!("{},{}", location.city, location.country);
        let window = days.to_string();
        debug!("Requesting {} day forecast for {}", days, query);

        let response = self
            .http
            .get(format!("{}/forecast.json", self.base_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("days", window.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ForecastError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ForecastResponse = serde_json::from_str(&body)?;
        Ok(payload.forecast.days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn recife() -> Location {
        Location {
            country: "Brazil".to_string(),
            city: "Recife".to_string(),
        }
    }

    fn day(date: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "date": date,
            "day": {
                "maxtemp_c": 31.0,
                "mintemp_c": 22.0,
                "avghumidity": 70.0,
                "daily_chance_of_rain": 20,
                "uv": 8.0,
                "condition": { "text": text }
            }
        })
    }

    #[tokio::test]
    async fn fetch_sends_location_and_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("key", "secret"))
            .and(query_param("q", "Recife,Brazil"))
            .and(query_param("days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "forecast": { "forecastday": [
                    day("2024-05-01", "Sunny"),
                    day("2024-05-02", "Cloudy"),
                    day("2024-05-03", "Light rain")
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri(), "secret");
        let days = client.fetch(&recife(), 3).await.unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[2].day.condition.text, "Light rain");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key invalid"))
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri(), "wrong");
        let err = client.fetch(&recife(), 3).await.unwrap_err();

        assert!(matches!(err, ForecastError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"forecast\": 12}"))
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri(), "secret");
        let err = client.fetch(&recife(), 3).await.unwrap_err();

        assert!(matches!(err, ForecastError::Decode(_)));
    }

    #[test]
    fn from_config_requires_a_key() {
        let mut config = ForecastConfig {
            api_url: "https://api.weatherapi.com/v1/".to_string(),
            api_key: None,
            schedule: "0 0 * * * *".to_string(),
            days: 3,
            enabled: true,
        };
        assert!(ForecastClient::from_config(&config).is_none());

        config.api_key = Some("k".to_string());
        let client = ForecastClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, "https://api.weatherapi.com/v1");
    }
}
