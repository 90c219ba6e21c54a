use actix_cors::Cors;
use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use paperclip::actix::web;

use crate::api::ErrorResponse;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/recommend").route(web::get().to(handlers::recommend)))
        .service(
            web::resource("/prefrecommend").route(web::get().to(handlers::preference_recommend)),
        );
}

/// Query strings that do not decode get the same JSON error shape as failed validation
fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response =
        HttpResponse::BadRequest().json(ErrorResponse::new(format!("Invalid query: {}", err)));
    InternalError::from_response(err, response).into()
}

/// Cross-origin policy for browser clients.
/// `origins` is a comma separated list, `*` allows any origin
pub fn cors_policy(origins: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET"])
        .allow_any_header()
        .expose_headers(vec![header::CONTENT_TYPE])
        .max_age(3600);

    if origins.trim() == "*" {
        return cors.allow_any_origin();
    }

    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
