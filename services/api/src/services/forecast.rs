//! Forecasts for the caller's location

use chrono::Utc;
use common::forecast::Forecast;
use common::store::{Filter, Order};

use super::requester;
use crate::error::ApiResult;
use crate::middleware::AuthUser;
use crate::repositories::Repositories;

#[derive(Clone)]
pub struct ForecastService {
    repos: Repositories,
}

impl ForecastService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Rows for the caller's city from today onward, earliest first.
    /// Users without a location get nothing.
    pub async fn for_user(&self, caller: &AuthUser) -> ApiResult<Vec<Forecast>> {
        let user = requester(&self.repos, caller).await?;
        if user.country.trim().is_empty() || user.city.trim().is_empty() {
            return Ok(Vec::new());
        }

        let today = Utc::now().date_naive();
        Ok(self
            .repos
            .forecasts
            .find(
                Filter::new()
                    .eq("country", user.country.as_str())
                    .eq("city", user.city.as_str())
                    .gte("date", today)
                    .order_by("date", Order::Asc),
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::services::fixtures::member;
    use chrono::{Duration, NaiveDate};
    use common::store::DEFAULTED;
    use uuid::Uuid;

    fn forecast(city: &str, date: NaiveDate) -> Forecast {
        Forecast {
            id: 0,
            uuid: Uuid::nil(),
            country: "Brazil".to_string(),
            city: city.to_string(),
            date,
            condition: "rain".to_string(),
            condition_text: "Patchy rain nearby".to_string(),
            max_temp_c: 29.0,
            min_temp_c: 22.5,
            avg_humidity: 80.0,
            chance_of_rain: 70,
            uv: 6.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn only_upcoming_days_for_the_callers_city() {
        let repos = Repositories::in_memory();
        let service = ForecastService::new(repos.clone());
        let (_, ana) = member(&repos, "ana@example.com", Role::User).await;
        let today = Utc::now().date_naive();

        repos
            .forecasts
            .create_many(
                DEFAULTED,
                vec![
                    forecast("Recife", today + Duration::days(1)),
                    forecast("Recife", today - Duration::days(1)),
                    forecast("Recife", today),
                    forecast("Olinda", today),
                ],
            )
            .await
            .unwrap();

        let dates: Vec<NaiveDate> = service
            .for_user(&ana)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.date)
            .collect();
        assert_eq!(dates, vec![today, today + Duration::days(1)]);
    }

    #[tokio::test]
    async fn users_without_a_city_get_nothing() {
        let repos = Repositories::in_memory();
        let service = ForecastService::new(repos.clone());
        let (mut user, ana) = member(&repos, "ana@example.com", Role::User).await;
        user.city = String::new();
        repos.users.update(&user).await.unwrap();

        assert!(service.for_user(&ana).await.unwrap().is_empty());
    }
}
