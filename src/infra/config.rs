use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;

pub struct AppConfig {
    pub jwt_secret: SecretString,
    /// Claim window without remember-me: browser-session-equivalent.
    pub session_ttl: Duration,
    /// Claim window with remember-me set.
    pub remember_me_ttl: Duration,
    pub otp_ttl_minutes: i64,
    pub otp_max_attempts: u32,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub redis_url: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub rate_limit_window_secs: u64,
    pub rate_limit_per_ip: u64,
    pub rate_limit_per_email: u64,
    pub resend_api_key: SecretString,
    pub email_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let session_ttl_hours: i64 = get_env_default("SESSION_TTL_HOURS", 24);
        let remember_me_ttl_days: i64 = get_env_default("REMEMBER_ME_TTL_DAYS", 30);
        let otp_ttl_minutes: i64 = get_env_default("OTP_TTL_MINUTES", 10);
        let otp_max_attempts: u32 = get_env_default("OTP_MAX_ATTEMPTS", 3);

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 10);
        let rate_limit_window_secs: u64 = get_env_default("RATE_LIMIT_WINDOW_SECS", 60);
        let rate_limit_per_ip: u64 = get_env_default("RATE_LIMIT_PER_IP", 60);
        let rate_limit_per_email: u64 = get_env_default("RATE_LIMIT_PER_EMAIL", 30);
        let resend_api_key: SecretString =
            SecretString::new(get_env::<String>("RESEND_API_KEY").into());
        let email_from: String = get_env("EMAIL_FROM");

        Self {
            jwt_secret,
            session_ttl: Duration::hours(session_ttl_hours),
            remember_me_ttl: Duration::days(remember_me_ttl_days),
            otp_ttl_minutes,
            otp_max_attempts,
            cors_origin,
            bind_addr,
            redis_url,
            database_url,
            db_max_connections,
            rate_limit_window_secs,
            rate_limit_per_ip,
            rate_limit_per_email,
            resend_api_key,
            email_from,
        }
    }

    /// Expiry window for a claim set, selected by the remember-me flag.
    pub fn claim_ttl(&self, remember: bool) -> Duration {
        if remember {
            self.remember_me_ttl
        } else {
            self.session_ttl
        }
    }
}
