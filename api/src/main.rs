use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use takip_api::{create_app, AppState};
use takip_core::repositories::{InMemoryStore, UserRepository, VerificationStore};
use takip_core::services::verification::Mailer;
use takip_core::services::{
    Clock, CodeCleanupService, PasswordPolicy, PreAuthTokenIssuer, RegistrationService,
    SystemClock, VerificationService, VerificationServiceConfig,
};
use takip_infra::database::{DatabasePool, MySqlUserRepository, MySqlVerificationStore};
use takip_infra::mail::build_mailer;
use takip_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter())),
        )
        .init();

    config.validate()?;
    info!(environment = %config.environment, "Starting Takip API server");

    let mailer = build_mailer(&config.mail).context("failed to configure mail transport")?;

    match config.database.url.as_deref() {
        Some(_) => {
            let pool = DatabasePool::new(&config.database)
                .await
                .context("failed to connect to database")?;
            if config.database.auto_migrate {
                pool.ensure_schema().await.context("failed to prepare schema")?;
            }
            info!(stats = %pool.get_statistics(), "Using MySQL verification store");

            let store = Arc::new(MySqlVerificationStore::new(pool.get_pool().clone()));
            let users = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
            let result = serve(config, store, users, mailer).await;
            pool.close().await;
            result
        }
        None => {
            tracing::warn!("DATABASE_URL not set, state is kept in memory and lost on restart");
            let store = Arc::new(InMemoryStore::new());
            serve(config, store.clone(), store, mailer).await
        }
    }
}

/// Wire services over the chosen backend and run the HTTP server until shutdown
async fn serve<S, U>(
    config: AppConfig,
    store: Arc<S>,
    users: Arc<U>,
    mailer: Arc<dyn Mailer>,
) -> anyhow::Result<()>
where
    S: VerificationStore + 'static,
    U: UserRepository + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let pre_auth = Arc::new(PreAuthTokenIssuer::new(&config.pre_auth, clock.clone()));
    let password_policy = PasswordPolicy::from_config(&config.password);

    let mut service_config = VerificationServiceConfig::from_settings(&config.otp, &config.mail);
    service_config.dev_return_code = config.dev_code_echo_enabled();
    if service_config.dev_return_code {
        tracing::warn!("DEV_RETURN_CODE is enabled, codes are echoed in responses");
    }

    let verification_service = Arc::new(VerificationService::new(
        store.clone(),
        mailer,
        clock.clone(),
        pre_auth.clone(),
        password_policy.clone(),
        service_config,
    ));
    let registration_service = Arc::new(RegistrationService::new(
        users,
        pre_auth,
        password_policy,
        clock.clone(),
    ));

    let cleanup = Arc::new(CodeCleanupService::new(
        store.clone(),
        clock,
        config.cleanup.clone(),
    ));
    let cleanup_task = cleanup.start_background_task();

    let app_state = web::Data::new(AppState::new(
        verification_service,
        registration_service,
        store.backend_name(),
    ));

    let environment = config.environment;
    let allowed_origins = config.server.allowed_origins.clone();
    let address = config.server.address();
    info!(address = %address, backend = store.backend_name(), "Server will bind");

    let mut server = HttpServer::new(move || {
        create_app(app_state.clone(), environment, &allowed_origins).wrap(TracingLogger::default())
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(&address)
        .with_context(|| format!("failed to bind {}", address))?
        .run()
        .await?;

    if let Some(task) = cleanup_task {
        task.abort();
    }
    info!("Server stopped");
    Ok(())
}
