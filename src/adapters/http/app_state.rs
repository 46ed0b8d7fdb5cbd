use std::sync::Arc;

use crate::{
    application::use_cases::auth::AuthUseCases,
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
