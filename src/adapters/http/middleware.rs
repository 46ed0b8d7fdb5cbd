use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    adapters::http::app_state::AppState, adapters::http::routes::auth::SESSION_COOKIE,
    app_error::AppError, application::jwt, domain::entities::account::Role,
};

/// Endpoints limited per target address as well as per IP. Only these pay the
/// cost of body buffering.
const EMAIL_LIMITED_PATHS: &[&str] = &["/api/auth/request-otp", "/api/auth/verify-otp"];

const EMAIL_SNIFF_LIMIT: usize = 64 * 1024;

pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Populated by `into_make_service_with_connect_info`; absent under
    // in-process test transports.
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let (request, email) = if EMAIL_LIMITED_PATHS.contains(&request.uri().path()) {
        sniff_email(request).await?
    } else {
        (request, None)
    };

    app_state.rate_limiter.check(&ip, email.as_deref()).await?;

    Ok(next.run(request).await)
}

/// Buffers the body, reads the `email` field out of the JSON, and hands the
/// request back untouched for the handler to consume.
async fn sniff_email(request: Request) -> Result<(Request, Option<String>), AppError> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, EMAIL_SNIFF_LIMIT)
        .await
        .map_err(|_| AppError::InvalidInput("Request body too large".into()))?;

    let email = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|value| Some(value.get("email")?.as_str()?.trim().to_lowercase()));

    Ok((Request::from_parts(parts, Body::from(bytes)), email))
}

/// Static route-guard configuration: which path prefixes require a claim set,
/// which require a specific role, and where unauthenticated requests land.
/// Denied role checks redirect to the claim holder's own landing page.
pub struct GuardConfig {
    pub protected_prefixes: &'static [&'static str],
    pub role_prefixes: &'static [(&'static str, Role)],
    pub login_path: &'static str,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: &["/dashboard", "/admin", "/partner"],
            role_prefixes: &[("/admin", Role::Admin), ("/partner", Role::Partner)],
            login_path: "/login",
        }
    }
}

impl GuardConfig {
    fn requires_auth(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| matches_prefix(path, prefix))
    }

    fn required_role(&self, path: &str) -> Option<Role> {
        self.role_prefixes
            .iter()
            .find(|(prefix, _)| matches_prefix(path, prefix))
            .map(|(_, role)| *role)
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Percent-encodes a path for use as a query parameter value. Unreserved
/// characters and '/' pass through so ordinary paths stay readable.
fn encode_callback(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Per-request access check ahead of the portal routes. Pure claim readback:
/// no storage access, no mutation, same answer for the same cookie.
///
/// Everything outside the protected prefixes (marketing pages, the /api
/// namespace, the auth entry pages, assets) passes straight through.
pub async fn route_guard(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let guard = GuardConfig::default();
    let path = request.uri().path().to_owned();

    if !guard.requires_auth(&path) {
        return next.run(request).await;
    }

    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| jwt::verify(cookie.value(), &app_state.config.jwt_secret).ok());

    let Some(claims) = claims else {
        // Preserve the originally requested path as the callback target.
        let target = format!(
            "{}?callbackUrl={}",
            guard.login_path,
            encode_callback(&path)
        );
        return Redirect::temporary(&target).into_response();
    };

    if let Some(required) = guard.required_role(&path)
        && claims.role != required
    {
        return Redirect::temporary(claims.role.landing_path()).into_response();
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}
