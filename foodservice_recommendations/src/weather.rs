use anyhow::Context;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

use crate::api::WeatherReading;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// Shown to API users, the underlying cause is logged where the lookup fails
    #[error("Could not fetch weather details. Please check the city name.")]
    Unavailable,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for the city, temperature in degrees Celsius
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    weather: Vec<OpenWeatherCondition>,
    main: OpenWeatherMain,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
}

/// Client of the OpenWeatherMap current weather endpoint
pub struct OpenWeatherClient {
    url: String,
    api_key: String,
    client: ClientWithMiddleware,
}

impl OpenWeatherClient {
    pub fn new(url: &str, api_key: &str, max_retries: u32) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    async fn fetch(&self, city: &str) -> anyhow::Result<WeatherReading> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Weather provider responded with {}", response.status())
        }

        let body: OpenWeatherResponse = response
            .json()
            .await
            .context("Failed to parse weather response")?;
        let condition = body
            .weather
            .into_iter()
            .next()
            .context("Weather response without conditions")?
            .main;

        Ok(WeatherReading {
            condition,
            temperature: body.main.temp,
        })
    }
}

#[async_trait::async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, city: &str) -> Result<WeatherReading, WeatherError> {
        self.fetch(city).await.map_err(|err| {
            tracing::warn!("Weather lookup for {} failed: {:#}", city, err);
            WeatherError::Unavailable
        })
    }
}
