//! Provider payload shapes

use chrono::{NaiveDate, Utc};
use common::forecast::{Forecast, Location};
use serde::Deserialize;
use uuid::Uuid;

use crate::conditions;

/// Body of `GET /forecast.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastResponse {
    pub forecast: ForecastBlock,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastBlock {
    #[serde(rename = "forecastday", default)]
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
}

/// Aggregates for one day
#[derive(Debug, Clone, Deserialize)]
pub struct DaySummary {
    #[serde(rename = "maxtemp_c")]
    pub max_temp_c: f64,
    #[serde(rename = "mintemp_c")]
    pub min_temp_c: f64,
    #[serde(rename = "avghumidity")]
    pub avg_humidity: f64,
    #[serde(rename = "daily_chance_of_rain", default)]
    pub chance_of_rain: f64,
    #[serde(default)]
    pub uv: f64,
    pub condition: ConditionInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionInfo {
    pub text: String,
}

impl ForecastDay {
    /// Build the row cached for `location`; uuid and created_at are left to the database
    pub fn into_forecast(self, location: &Location) -> Forecast {
        let condition_text = self.day.condition.text.trim().to_string();

        Forecast {
            id: 0,
            uuid: Uuid::nil(),
            country: location.country.clone(),
            city: location.city.clone(),
            date: self.date,
            condition: conditions::translate(&condition_text),
            condition_text,
            max_temp_c: self.day.max_temp_c,
            min_temp_c: self.day.min_temp_c,
            avg_humidity: self.day.avg_humidity,
            chance_of_rain: self.day.chance_of_rain.round() as i32,
            uv: self.day.uv,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_payload_maps_to_forecast_rows() {
        let body = serde_json::json!({
            "location": { "name": "Recife", "country": "Brazil" },
            "forecast": { "forecastday": [{
                "date": "2024-05-01",
                "day": {
                    "maxtemp_c": 30.4,
                    "mintemp_c": 23.1,
                    "avghumidity": 78,
                    "daily_chance_of_rain": 86,
                    "uv": 6.0,
                    "condition": { "text": "Moderate rain ", "code": 1189 }
                }
            }]}
        });

        let response: ForecastResponse = serde_json::from_value(body).unwrap();
        let location = Location {
            country: "Brazil".to_string(),
            city: "Recife".to_string(),
        };
        let row = response.forecast.days[0].clone().into_forecast(&location);

        assert_eq!(row.city, "Recife");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(row.condition, "rain");
        assert_eq!(row.condition_text, "Moderate rain");
        assert_eq!(row.avg_humidity, 78.0);
        assert_eq!(row.chance_of_rain, 86);
    }
}
