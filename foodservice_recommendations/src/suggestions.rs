use std::sync::Arc;

use serde_json::Value;

use crate::api::{FoodSuggestion, GeneratedRecommendations, WeatherReading};
use crate::generative::TextGenerator;
use crate::weather::{WeatherError, WeatherProvider};

pub const DEFAULT_SUGGESTION_COUNT: usize = 25;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error("Error generating food recommendations: no JSON object in AI response.")]
    NoJsonObject,

    #[error("Error generating food recommendations: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected response structure from AI.")]
    UnexpectedStructure,

    #[error("Ambiguous response structure from AI: expected a single top-level key, found {0}.")]
    AmbiguousStructure(usize),

    #[error("Error generating food recommendations: {0}")]
    Generation(anyhow::Error),
}

/// Asks the generative model for food suited to the current weather in a city
pub struct FoodSuggestionGenerator {
    weather_provider: Arc<dyn WeatherProvider>,
    text_generator: Arc<dyn TextGenerator>,
    suggestion_count: usize,
}

impl FoodSuggestionGenerator {
    pub fn new(
        weather_provider: Arc<dyn WeatherProvider>,
        text_generator: Arc<dyn TextGenerator>,
        suggestion_count: usize,
    ) -> Self {
        Self {
            weather_provider,
            text_generator,
            suggestion_count,
        }
    }

    pub async fn recommend_food_for_weather(
        &self,
        city: &str,
        preference: &str,
        cuisine_type: &str,
    ) -> Result<GeneratedRecommendations, SuggestionError> {
        let weather = self.weather_provider.current_weather(city).await?;

        let prompt = build_prompt(
            city,
            &weather,
            preference,
            cuisine_type,
            self.suggestion_count,
        );
        let reply = self
            .text_generator
            .generate(&prompt)
            .await
            .map_err(SuggestionError::Generation)?;
        let food_suggestions = parse_food_suggestions(&reply)?;

        tracing::info!(
            "Generated {} suggestions for {} ({}, {}°C)",
            food_suggestions.len(),
            city,
            weather.condition,
            weather.temperature
        );

        Ok(GeneratedRecommendations {
            city: city.to_string(),
            weather,
            preference: preference.to_string(),
            cuisine_type: cuisine_type.to_string(),
            food_suggestions,
        })
    }
}

pub fn build_prompt(
    city: &str,
    weather: &WeatherReading,
    preference: &str,
    cuisine_type: &str,
    suggestion_count: usize,
) -> String {
    format!(
        "The weather in {city} is {} with a temperature of {}°C. \
         Suggest {suggestion_count} {preference} food items from {cuisine_type} cuisine suitable for this weather \
         and the restaurants in {city} that serve that food items. \
         Return the output in JSON format with name and description and list of restaurants.",
        weather.condition, weather.temperature
    )
}

/// Extracts the suggestion list from a model reply.
///
/// The reply is free text with a JSON object embedded somewhere (often in a markdown fence).
/// Everything between the first `{` and the last `}` is parsed; the object must have exactly
/// one key, whatever its name, holding the list of suggestions. An empty object is an empty list.
/// Items that are not suggestion objects are skipped.
pub fn parse_food_suggestions(reply: &str) -> Result<Vec<FoodSuggestion>, SuggestionError> {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        return Err(SuggestionError::NoJsonObject);
    };
    if end < start {
        return Err(SuggestionError::NoJsonObject);
    }

    let parsed: Value = serde_json::from_str(&reply[start..=end])?;
    let Value::Object(object) = parsed else {
        return Err(SuggestionError::UnexpectedStructure);
    };

    match object.len() {
        0 => Ok(vec![]),
        1 => match object.into_iter().next() {
            Some((_, Value::Array(items))) => Ok(items
                .into_iter()
                .filter_map(|item| match serde_json::from_value(item) {
                    Ok(suggestion) => Some(suggestion),
                    Err(err) => {
                        tracing::warn!("Skipping malformed suggestion in AI response: {}", err);
                        None
                    }
                })
                .collect()),
            _ => Err(SuggestionError::UnexpectedStructure),
        },
        keys => Err(SuggestionError::AmbiguousStructure(keys)),
    }
}
