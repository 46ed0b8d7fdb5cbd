//! Test app state builder for HTTP-level integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::auth::AuthUseCases,
    domain::entities::account::AccountProfile,
    infra::{config::AppConfig, rate_limit::RateLimiterTrait},
    test_utils::{InMemoryAccountRepo, InMemoryEmailSender, InMemoryOtpStore, InMemoryRateLimiter},
};

/// Mock handles the builder hands back alongside the state, for assertions.
pub struct TestFixtures {
    pub accounts: Arc<InMemoryAccountRepo>,
    pub otp_store: Arc<InMemoryOtpStore>,
    pub email_sender: Arc<InMemoryEmailSender>,
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let account = create_test_account(|a| a.email = "user@example.com".to_string());
/// let (app_state, fixtures) = TestAppStateBuilder::new().with_account(account).build();
/// ```
pub struct TestAppStateBuilder {
    accounts: Vec<AccountProfile>,
    otp_ttl_minutes: i64,
    otp_max_attempts: u32,
    rate_limiter: Option<Arc<dyn RateLimiterTrait>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            accounts: vec![],
            otp_ttl_minutes: 10,
            otp_max_attempts: 3,
            rate_limiter: None,
        }
    }

    /// Add an account to the test state.
    pub fn with_account(mut self, account: AccountProfile) -> Self {
        self.accounts.push(account);
        self
    }

    /// Set a custom rate limiter (for testing the rate-limit middleware).
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiterTrait>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Build the AppState with all configured mocks.
    pub fn build(self) -> (AppState, TestFixtures) {
        let accounts = Arc::new(InMemoryAccountRepo::with_accounts(self.accounts));
        let otp_store = Arc::new(InMemoryOtpStore::new());
        let email_sender = Arc::new(InMemoryEmailSender::new());

        let auth_use_cases = AuthUseCases::new(
            accounts.clone(),
            otp_store.clone(),
            email_sender.clone(),
            self.otp_ttl_minutes,
            self.otp_max_attempts,
        );

        let config = Arc::new(AppConfig {
            jwt_secret: SecretString::new("test_jwt_secret".into()),
            session_ttl: Duration::hours(24),
            remember_me_ttl: Duration::days(30),
            otp_ttl_minutes: self.otp_ttl_minutes,
            otp_max_attempts: self.otp_max_attempts,
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
            redis_url: String::new(),
            database_url: String::new(),
            db_max_connections: 5,
            rate_limit_window_secs: 60,
            rate_limit_per_ip: 60,
            rate_limit_per_email: 30,
            resend_api_key: SecretString::new("test_resend_key".into()),
            email_from: "Roamio <auth@roamio.test>".to_string(),
        });

        let rate_limiter: Arc<dyn RateLimiterTrait> = self
            .rate_limiter
            .unwrap_or_else(|| Arc::new(InMemoryRateLimiter::permissive()));

        let app_state = AppState {
            config,
            auth_use_cases: Arc::new(auth_use_cases),
            rate_limiter,
        };

        let fixtures = TestFixtures {
            accounts,
            otp_store,
            email_sender,
        };

        (app_state, fixtures)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
