use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::normalizer::MatchingPolicy;
use crate::ranker::RankingPolicy;

/// Service configuration, read once at startup from the process environment
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, comma separated, `*` allows any
    pub cors_origin: String,

    pub weather_api_url: String,
    pub weather_api_key: String,
    /// Retries of transient weather failures, none unless configured
    pub weather_max_retries: u32,

    pub genai_api_url: String,
    pub genai_api_key: String,
    pub genai_model: String,
    /// Number of food items requested from the generative model
    pub suggestion_count: usize,

    pub cuisines_file: PathBuf,
    pub training_data_file: PathBuf,

    pub fuzzy_match_threshold: f64,
    pub min_ranked_results: usize,
    pub max_ranked_results: usize,
}

impl Settings {
    /// Reads settings from environment variables such as `WEATHER_API_KEY` or `CORS_ORIGIN`
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    pub fn from_environment(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080_i64)?
            .set_default("cors_origin", "http://localhost:3000")?
            .set_default(
                "weather_api_url",
                "http://api.openweathermap.org/data/2.5/weather",
            )?
            .set_default("weather_api_key", "")?
            .set_default("weather_max_retries", 0_i64)?
            .set_default(
                "genai_api_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("genai_api_key", "")?
            .set_default("genai_model", "gemini-1.5-flash")?
            .set_default("suggestion_count", 25_i64)?
            .set_default("cuisines_file", "data/cuisines.json")?
            .set_default("training_data_file", "data/my_food.json")?
            .set_default("fuzzy_match_threshold", 80.0)?
            .set_default("min_ranked_results", 10_i64)?
            .set_default("max_ranked_results", 20_i64)?
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn matching_policy(&self) -> MatchingPolicy {
        MatchingPolicy {
            threshold: self.fuzzy_match_threshold,
        }
    }

    pub fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy {
            min_results: self.min_ranked_results,
            max_results: self.max_ranked_results,
        }
    }
}
