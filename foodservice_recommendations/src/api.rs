use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Current weather in a city, as reported by the weather provider
pub struct WeatherReading {
    /// Condition label, e.g. "Rain" or "Clear"
    #[serde(rename = "main")]
    pub condition: String,
    /// Temperature in degrees Celsius
    #[serde(rename = "temp")]
    pub temperature: f64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// A single food item suggested by the generative model
pub struct FoodSuggestion {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Restaurants in the requested city that serve the item
    #[serde(default, deserialize_with = "restaurant_names")]
    pub restaurants: Vec<String>,
}

/// Model replies list restaurants in several shapes: a list of names, a list of objects
/// with a `name`, a single comma separated string, or null
fn restaurant_names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    fn name_of(value: Value) -> Option<String> {
        match value {
            Value::String(name) => Some(name),
            Value::Object(mut object) => match object.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    let names: Vec<String> = match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().filter_map(name_of).collect(),
        Value::String(names) => names.split(',').map(str::to_string).collect(),
        value => name_of(value).into_iter().collect(),
    };
    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
/// Entry of the static preference dataset the ranker is trained on
pub struct TrainingItem {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Apiv2Schema)]
/// Query parameters shared by both recommendation endpoints
pub struct RecommendQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// One of veg, non-veg, any. Defaults to any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<String>,
    /// One of the allowed cuisines. Defaults to any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
}

impl RecommendQuery {
    pub fn for_city(city: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Result of asking the generative model for suggestions
pub struct GeneratedRecommendations {
    pub city: String,
    pub weather: WeatherReading,
    pub preference: String,
    pub cuisine_type: String,
    #[serde(rename = "FoodSuggestions")]
    pub food_suggestions: Vec<FoodSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Response of GET /recommend
pub struct RecommendResponse {
    pub city: String,
    pub preference: String,
    pub cuisine_type: String,
    pub weather: WeatherReading,
    pub recommendations: Vec<FoodSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Response of GET /prefrecommend
pub struct PreferenceRecommendResponse {
    pub status: String,
    pub recommendations: Vec<FoodSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Error shape of GET /prefrecommend once the request passed validation
pub struct StatusErrorResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
