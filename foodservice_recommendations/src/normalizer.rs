use itertools::Itertools;

use crate::api::RecommendQuery;

pub const VALID_PREFERENCES: [&str; 3] = ["veg", "non-veg", "any"];
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingPolicy {
    /// Best score has to be strictly greater than this to count as a match (0-100 scale)
    pub threshold: f64,
}

impl Default for MatchingPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
        }
    }
}

/// Values accepted for the preference and cuisine_type query parameters
#[derive(Debug, Clone)]
pub struct AllowedValues {
    pub preferences: Vec<String>,
    pub cuisines: Vec<String>,
}

impl AllowedValues {
    pub fn new(cuisines: Vec<String>) -> Self {
        Self {
            preferences: VALID_PREFERENCES.iter().map(|p| p.to_string()).collect(),
            cuisines,
        }
    }
}

/// Returns the allowed value closest to `input`, if it scores above the policy threshold.
/// Ties are resolved in favour of the value listed first.
pub fn fuzzy_match<'a, S: AsRef<str>>(
    input: &str,
    valid_values: &'a [S],
    policy: &MatchingPolicy,
) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in valid_values.iter().map(AsRef::as_ref) {
        let score = similarity_score(input, candidate);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }

    let (matched, score) = best?;
    tracing::debug!(input, matched, score, "Best fuzzy match");
    (score > policy.threshold).then_some(matched)
}

/// Weighted similarity of two strings on a 0-100 scale, case and punctuation insensitive.
///
/// Takes the best of the plain ratio, a token order insensitive ratio and, when one
/// string is much longer than the other, the best ratio of the shorter string against
/// equally long windows of the longer one.
pub fn similarity_score(a: &str, b: &str) -> f64 {
    let a_tokens = tokens(a);
    let b_tokens = tokens(b);
    let a_compact = a_tokens.concat();
    let b_compact = b_tokens.concat();
    if a_compact.is_empty() || b_compact.is_empty() {
        return 0.0;
    }

    let a_len = a_compact.chars().count();
    let b_len = b_compact.chars().count();
    let length_ratio = a_len.max(b_len) as f64 / a_len.min(b_len) as f64;

    let base = ratio(&a_compact, &b_compact);
    let token_sort = ratio(&sorted_tokens(&a_tokens), &sorted_tokens(&b_tokens)) * 0.95;

    if length_ratio < 1.5 {
        return base.max(token_sort);
    }

    let partial_scale = if length_ratio < 8.0 { 0.9 } else { 0.6 };
    let (shorter, longer) = if a_len <= b_len {
        (&a_compact, &b_compact)
    } else {
        (&b_compact, &a_compact)
    };
    base.max(partial_ratio(shorter, longer) * partial_scale)
        .max(token_sort * partial_scale)
}

fn tokens(value: &str) -> Vec<String> {
    value
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

fn sorted_tokens(tokens: &[String]) -> String {
    tokens.iter().sorted().join("")
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_damerau_levenshtein(a, b) * 100.0
}

fn partial_ratio(shorter: &str, longer: &str) -> f64 {
    let longer_chars: Vec<char> = longer.chars().collect();
    let window = shorter.chars().count();
    longer_chars
        .windows(window)
        .map(|w| ratio(shorter, &w.iter().collect::<String>()))
        .fold(0.0, f64::max)
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    MissingParameter(&'static str),

    #[error("Invalid preference. Choose from {0}.")]
    InvalidPreference(String),

    #[error("Invalid cuisine type. Choose from {0}.")]
    InvalidCuisine(String),
}

/// Query parameters after validation, preference and cuisine spelled as in the allow-lists
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub city: String,
    pub preference: String,
    pub cuisine_type: String,
}

pub struct InputValidator {
    allowed_values: AllowedValues,
    policy: MatchingPolicy,
}

impl InputValidator {
    pub fn new(allowed_values: AllowedValues, policy: MatchingPolicy) -> Self {
        Self {
            allowed_values,
            policy,
        }
    }

    /// Checks the city is present and resolves preference and cuisine_type (both default to "any")
    /// to their allowed spelling. Runs before any upstream call is made.
    pub fn validate(
        &self,
        query: RecommendQuery,
        missing_city_message: &'static str,
    ) -> Result<ValidatedRequest, RequestError> {
        let city = query
            .city
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .ok_or(RequestError::MissingParameter(missing_city_message))?;

        let preference = query.preference.unwrap_or_else(|| "any".to_string());
        let preference = fuzzy_match(&preference, &self.allowed_values.preferences, &self.policy)
            .ok_or_else(|| {
                RequestError::InvalidPreference(self.allowed_values.preferences.join(", "))
            })?;

        let cuisine_type = query.cuisine_type.unwrap_or_else(|| "any".to_string());
        let cuisine_type = fuzzy_match(&cuisine_type, &self.allowed_values.cuisines, &self.policy)
            .ok_or_else(|| RequestError::InvalidCuisine(self.allowed_values.cuisines.join(", ")))?;

        Ok(ValidatedRequest {
            city,
            preference: preference.to_string(),
            cuisine_type: cuisine_type.to_string(),
        })
    }
}


#[cfg(test)]
mod input_validator_tests {
    use crate::api::RecommendQuery;
    use crate::normalizer::{
        AllowedValues, InputValidator, MatchingPolicy, RequestError, ValidatedRequest,
    };

    const MISSING_CITY: &str = "City is required.";

    fn validator() -> InputValidator {
        InputValidator::new(
            AllowedValues::new(vec!["Any".to_string(), "Indian".to_string()]),
            MatchingPolicy::default(),
        )
    }

    #[test]
    fn defaults_preference_and_cuisine_to_any() {
        let validated = validator()
            .validate(RecommendQuery::for_city("Pune"), MISSING_CITY)
            .expect("Valid query rejected");
        assert_eq!(
            validated,
            ValidatedRequest {
                city: "Pune".to_string(),
                preference: "any".to_string(),
                cuisine_type: "Any".to_string(),
            }
        );
    }

    #[test]
    fn missing_or_blank_city_is_rejected() {
        let result = validator().validate(RecommendQuery::default(), MISSING_CITY);
        assert_eq!(result, Err(RequestError::MissingParameter(MISSING_CITY)));

        let result = validator().validate(RecommendQuery::for_city("  "), MISSING_CITY);
        assert_eq!(result, Err(RequestError::MissingParameter(MISSING_CITY)));
    }

    #[test]
    fn invalid_choices_list_valid_values() {
        let query = RecommendQuery {
            preference: Some("purple".to_string()),
            ..RecommendQuery::for_city("Pune")
        };
        let error = validator()
            .validate(query, MISSING_CITY)
            .expect_err("Invalid preference accepted");
        assert_eq!(
            error.to_string(),
            "Invalid preference. Choose from veg, non-veg, any."
        );

        let query = RecommendQuery {
            cuisine_type: Some("klingon".to_string()),
            ..RecommendQuery::for_city("Pune")
        };
        let error = validator()
            .validate(query, MISSING_CITY)
            .expect_err("Invalid cuisine accepted");
        assert_eq!(error.to_string(), "Invalid cuisine type. Choose from Any, Indian.");
    }

    #[test]
    fn near_misses_are_corrected() {
        let query = RecommendQuery {
            city: Some("Pune".to_string()),
            preference: Some("Veg ".to_string()),
            cuisine_type: Some("indain".to_string()),
        };
        let validated = validator()
            .validate(query, MISSING_CITY)
            .expect("Valid query rejected");
        assert_eq!(validated.preference, "veg");
        assert_eq!(validated.cuisine_type, "Indian");
    }
}
