//! CORS middleware configuration for cross-origin requests.
//!
//! Development accepts any origin so local web clients and tools can hit the
//! API directly. Staging and production only accept the origins listed in
//! `ALLOWED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use takip_shared::config::Environment;

const MAX_AGE_SECONDS: usize = 3600;

/// Creates a CORS middleware instance for the given environment
pub fn create_cors(environment: Environment, allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
        .expose_headers(vec![header::RETRY_AFTER])
        .max_age(MAX_AGE_SECONDS);

    if environment.is_development() {
        return cors.allow_any_origin();
    }

    allowed_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}
