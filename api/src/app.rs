//! Application factory
//!
//! Builds the Actix-web application around an already-wired [`AppState`].
//! The binary and the integration tests share this function, so both serve
//! exactly the same routes and error handling.

use actix_web::{web, App, HttpResponse};

use takip_core::repositories::{UserRepository, VerificationStore};
use takip_shared::config::Environment;
use takip_shared::types::HealthResponse;

use crate::handlers::{json_error_handler, not_found};
use crate::middleware::create_cors;
use crate::routes::auth::{
    password_reset::{forgot_password, reset_password},
    pre_verify::{confirm_pre_verify, pre_verify_email},
    register::register,
    resend_code::resend_code,
    verify_code::verify_code,
    AppState,
};

/// Create and configure the application with all dependencies
pub fn create_app<S, U>(
    app_state: web::Data<AppState<S, U>>,
    environment: Environment,
    allowed_origins: &[String],
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(create_cors(environment, allowed_origins))
        .route("/health", web::get().to(health_check::<S, U>))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/resend-code", web::post().to(resend_code::<S, U>))
                    .route("/verify-code", web::post().to(verify_code::<S, U>))
                    .route("/forgot-password", web::post().to(forgot_password::<S, U>))
                    .route("/reset-password", web::post().to(reset_password::<S, U>))
                    .route("/pre-verify-email", web::post().to(pre_verify_email::<S, U>))
                    .route(
                        "/pre-verify-email/verify",
                        web::post().to(confirm_pre_verify::<S, U>),
                    )
                    .route("/register", web::post().to(register::<S, U>)),
            ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check<S, U>(state: web::Data<AppState<S, U>>) -> HttpResponse
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    HttpResponse::Ok().json(HealthResponse::healthy(
        "takip-api",
        env!("CARGO_PKG_VERSION"),
        state.store_backend,
    ))
}
