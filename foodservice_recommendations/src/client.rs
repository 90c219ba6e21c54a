use anyhow::{bail, Context};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{
    ErrorResponse, FoodSuggestion, PreferenceRecommendResponse, RecommendQuery, RecommendResponse,
    StatusErrorResponse,
};

pub struct FoodServiceClient {
    url: String,
    client: ClientWithMiddleware,
}

impl FoodServiceClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls GET /health endpoint
    pub async fn health(&self) -> anyhow::Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.url))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Service unhealthy {}", response.status())
        }
        Ok(())
    }

    /// Calls GET /recommend endpoint
    /// Returns weather and unranked suggestions for the city
    pub async fn recommend(&self, query: &RecommendQuery) -> anyhow::Result<RecommendResponse> {
        self.get_json("recommend", query).await.map_err(|error| {
            anyhow::anyhow!("Failed to get recommendations {}", error)
        })
    }

    /// Calls GET /prefrecommend endpoint
    /// Returns suggestions ranked against the preference dataset
    pub async fn preference_recommend(
        &self,
        query: &RecommendQuery,
    ) -> anyhow::Result<Vec<FoodSuggestion>> {
        let response: PreferenceRecommendResponse = self
            .get_json("prefrecommend", query)
            .await
            .map_err(|error| anyhow::anyhow!("Failed to get preferred recommendations {}", error))?;
        Ok(response.recommendations)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &RecommendQuery,
    ) -> anyhow::Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.url, endpoint))
            .query(query)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(response.json().await?);
        }

        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        if let Ok(error) = serde_json::from_value::<ErrorResponse>(body.clone()) {
            bail!("{} {}", status, error.error)
        }
        if let Ok(error) = serde_json::from_value::<StatusErrorResponse>(body.clone()) {
            bail!("{} {}", status, error.message)
        }
        bail!("{} {}", status, body)
    }
}

#[cfg(test)]
mod food_service_client_tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::{RecommendQuery, WeatherReading};
    use crate::client::FoodServiceClient;

    #[tokio::test]
    async fn recommend_sends_query_and_reads_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommend"))
            .and(query_param("city", "Pune"))
            .and(query_param("preference", "veg"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "city": "Pune",
                "preference": "veg",
                "cuisine_type": "any",
                "weather": {"main": "Rain", "temp": 22.0},
                "recommendations": [
                    {"name": "Pakora", "description": "Fritters", "restaurants": ["Chai Point"]}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = FoodServiceClient::new(&server.uri()).expect("Failed to create client");
        let query = RecommendQuery {
            preference: Some("veg".to_string()),
            ..RecommendQuery::for_city("Pune")
        };
        let response = client.recommend(&query).await.expect("Failed to recommend");

        assert_eq!(
            response.weather,
            WeatherReading {
                condition: "Rain".to_string(),
                temperature: 22.0,
            }
        );
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].restaurants, vec!["Chai Point"]);
    }

    #[tokio::test]
    async fn recommend_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommend"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "City is required."})),
            )
            .mount(&server)
            .await;

        let client = FoodServiceClient::new(&server.uri()).expect("Failed to create client");
        let error = client
            .recommend(&RecommendQuery::default())
            .await
            .expect_err("Recommended without city");

        assert!(error.to_string().contains("City is required."));
    }

    #[tokio::test]
    async fn preference_recommend_returns_ranked_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/prefrecommend"))
            .and(query_param("city", "Delhi"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "recommendations": [
                    {"name": "Mango Lassi", "description": "Chilled", "restaurants": []},
                    {"name": "Kulfi", "description": "Frozen dessert", "restaurants": []}
                ]
            })))
            .mount(&server)
            .await;

        let client = FoodServiceClient::new(&server.uri()).expect("Failed to create client");
        let recommendations = client
            .preference_recommend(&RecommendQuery::for_city("Delhi"))
            .await
            .expect("Failed to recommend");

        let names: Vec<_> = recommendations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Mango Lassi", "Kulfi"]);
    }

    #[tokio::test]
    async fn preference_recommend_status_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "status": "error",
                "message": "Unexpected response structure from AI."
            })))
            .mount(&server)
            .await;

        let client = FoodServiceClient::new(&server.uri()).expect("Failed to create client");
        let error = client
            .preference_recommend(&RecommendQuery::for_city("Delhi"))
            .await
            .expect_err("Recommended despite error");

        assert!(error
            .to_string()
            .contains("Unexpected response structure from AI."));
    }

    #[tokio::test]
    async fn health_checks_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = FoodServiceClient::new(&server.uri()).expect("Failed to create client");
        client.health().await.expect("Service unhealthy");

        let unreachable = FoodServiceClient::new(&format!("{}/missing", server.uri()))
            .expect("Failed to create client");
        assert!(unreachable.health().await.is_err());
    }
}
