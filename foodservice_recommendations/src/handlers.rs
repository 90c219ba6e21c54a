use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{api_v2_operation, web};

use crate::api::{
    ErrorResponse, PreferenceRecommendResponse, RecommendQuery, RecommendResponse,
    StatusErrorResponse, STATUS_ERROR, STATUS_SUCCESS,
};
use crate::normalizer::InputValidator;
use crate::ranker::PreferenceRanker;
use crate::suggestions::FoodSuggestionGenerator;

const CITY_REQUIRED: &str = "City is required.";
const CITY_MISSING: &str = "Missing required parameter: city";

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

/// Food suggestions for the current weather in a city
#[api_v2_operation]
pub async fn recommend(
    query: web::Query<RecommendQuery>,
    validator: Data<InputValidator>,
    generator: Data<FoodSuggestionGenerator>,
) -> Result<HttpResponse, Error> {
    let request = match validator.validate(query.into_inner(), CITY_REQUIRED) {
        Ok(request) => request,
        Err(err) => return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err))),
    };

    Ok(
        match generator
            .recommend_food_for_weather(&request.city, &request.preference, &request.cuisine_type)
            .await
        {
            Ok(generated) => HttpResponse::Ok().json(RecommendResponse {
                city: request.city,
                preference: request.preference,
                cuisine_type: request.cuisine_type,
                weather: generated.weather,
                recommendations: generated.food_suggestions,
            }),
            Err(err) => {
                tracing::error!("Recommendation for {} failed {}", request.city, err);
                HttpResponse::InternalServerError().json(ErrorResponse::new(err))
            }
        },
    )
}

/// Food suggestions for the current weather in a city, re-ranked against the preference dataset
#[api_v2_operation]
pub async fn preference_recommend(
    query: web::Query<RecommendQuery>,
    validator: Data<InputValidator>,
    generator: Data<FoodSuggestionGenerator>,
    ranker: Data<PreferenceRanker>,
) -> Result<HttpResponse, Error> {
    let request = match validator.validate(query.into_inner(), CITY_MISSING) {
        Ok(request) => request,
        Err(err) => return Ok(HttpResponse::BadRequest().json(ErrorResponse::new(err))),
    };

    let training_items = match ranker.load_training_items().await {
        Ok(items) => items,
        Err(err) => {
            tracing::error!("Loading preference dataset failed {}", err);
            return Ok(
                HttpResponse::InternalServerError().json(StatusErrorResponse {
                    status: STATUS_ERROR.to_string(),
                    message: "Internal server error".to_string(),
                    details: Some(err.to_string()),
                }),
            );
        }
    };

    let generated = match generator
        .recommend_food_for_weather(&request.city, &request.preference, &request.cuisine_type)
        .await
    {
        Ok(generated) => generated,
        Err(err) => {
            tracing::error!("Preference recommendation for {} failed {}", request.city, err);
            return Ok(HttpResponse::BadRequest().json(StatusErrorResponse {
                status: STATUS_ERROR.to_string(),
                message: err.to_string(),
                details: None,
            }));
        }
    };

    let recommendations = ranker.rank(generated.food_suggestions, &training_items);
    Ok(HttpResponse::Ok().json(PreferenceRecommendResponse {
        status: STATUS_SUCCESS.to_string(),
        recommendations,
    }))
}
