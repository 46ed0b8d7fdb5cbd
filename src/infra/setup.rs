use crate::{
    adapters::{email::resend::ResendEmailSender, http::app_state::AppState},
    application::observer::TracingObserver,
    infra::{
        config::AppConfig, otp_store::RedisOtpStore, postgres_persistence,
        rate_limit::RedisRateLimiter,
    },
    use_cases::auth::{AccountRepo, AuthUseCases},
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(
        postgres_persistence(&config.database_url, config.db_max_connections).await?,
    );

    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    let redis_manager = redis::aio::ConnectionManager::new(redis_client).await?;

    let rate_limiter = Arc::new(RedisRateLimiter::new(
        redis_manager.clone(),
        config.rate_limit_window_secs,
        config.rate_limit_per_ip,
        config.rate_limit_per_email,
    ));

    let otp_store = Arc::new(RedisOtpStore::new(redis_manager));

    let email = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));

    let account_repo_arc = postgres_arc as Arc<dyn AccountRepo>;

    let mut auth_use_cases = AuthUseCases::new(
        account_repo_arc,
        otp_store,
        email,
        config.otp_ttl_minutes,
        config.otp_max_attempts,
    );
    auth_use_cases.register_observer(Arc::new(TracingObserver));

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(auth_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roamio_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
