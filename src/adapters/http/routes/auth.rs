//! Authentication routes: signup, credentials login, OTP issuance and
//! verification, session readback, refresh, logout.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::jwt,
    application::use_cases::auth::SignupRequest,
    domain::entities::account::{AccountProfile, Role},
};

pub const SESSION_COOKIE: &str = "session_token";

// ============================================================================
// Payloads
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignupPayload {
    name: String,
    email: String,
    password: String,
    phone: Option<String>,
    role: Option<String>,
    employee_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
    email: String,
    password: String,
    #[serde(default)]
    remember_me: bool,
}

#[derive(Deserialize)]
struct RequestOtpPayload {
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpPayload {
    email: String,
    otp: String,
    password: Option<String>,
    confirm_password: Option<String>,
}

/// Account as returned to clients: password hash stripped.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    id: String,
    email: String,
    name: String,
    phone: Option<String>,
    role: Role,
    employee_id: Option<String>,
    verified: bool,
}

impl From<AccountProfile> for AccountResponse {
    fn from(account: AccountProfile) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email,
            name: account.name,
            phone: account.phone,
            role: account.role,
            employee_id: account.employee_id,
            verified: account.verified_at.is_some(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    success: bool,
    account: AccountResponse,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    valid: bool,
    account_id: Option<String>,
    role: Option<Role>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/signup
async fn signup(
    State(app_state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> AppResult<impl IntoResponse> {
    // Role is parsed strictly against the closed enum; unknown values are
    // rejected instead of silently defaulting.
    let role = payload
        .role
        .as_deref()
        .map(|r| {
            Role::from_str(r).map_err(|_| AppError::Validation("role", format!("Unknown role: {r}")))
        })
        .transpose()?;

    let account = app_state
        .auth_use_cases
        .signup(SignupRequest {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            phone: payload.phone,
            role,
            employee_id: payload.employee_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            account: account.into(),
        }),
    ))
}

/// POST /api/auth/login
/// Issues a session claim set; remember-me selects the 30-day window,
/// otherwise the 24-hour one.
async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let account = app_state
        .auth_use_cases
        .login(&payload.email, &payload.password)
        .await?;

    let ttl = app_state.config.claim_ttl(payload.remember_me);
    let token = jwt::issue(
        account.id,
        account.role,
        payload.remember_me,
        &app_state.config.jwt_secret,
        ttl,
    )?;

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, session_cookie(token, ttl))?;

    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            success: true,
            account: account.into(),
        }),
    ))
}

/// POST /api/auth/request-otp
async fn request_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<RequestOtpPayload>,
) -> AppResult<impl IntoResponse> {
    app_state.auth_use_cases.request_otp(&payload.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/auth/verify-otp
/// Login or signup via a one-time code. Supplying a password makes this the
/// signup variant: the account is created when missing.
async fn verify_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyOtpPayload>,
) -> AppResult<impl IntoResponse> {
    // Structural validation precedes verification so a mismatched
    // confirmation never consumes an attempt.
    if payload.password.is_some() && payload.password != payload.confirm_password {
        return Err(AppError::Validation(
            "confirmPassword",
            "Passwords do not match".into(),
        ));
    }

    let account = app_state
        .auth_use_cases
        .verify_otp(&payload.email, &payload.otp, payload.password.as_deref())
        .await?;

    let ttl = app_state.config.claim_ttl(false);
    let token = jwt::issue(
        account.id,
        account.role,
        false,
        &app_state.config.jwt_secret,
        ttl,
    )?;

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, session_cookie(token, ttl))?;

    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            success: true,
            account: account.into(),
        }),
    ))
}

/// GET /api/auth/session
/// Pure claim readback: no account-store query.
async fn session(State(app_state): State<AppState>, jar: CookieJar) -> Json<SessionResponse> {
    let claims = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| jwt::verify(cookie.value(), &app_state.config.jwt_secret).ok());

    match claims {
        Some(claims) => Json(SessionResponse {
            valid: true,
            account_id: Some(claims.sub),
            role: Some(claims.role),
        }),
        None => Json(SessionResponse {
            valid: false,
            account_id: None,
            role: None,
        }),
    }
}

/// POST /api/auth/refresh
/// Explicit refresh trigger: re-issues the claim set with a fresh expiry
/// window chosen by the remembered flag.
async fn refresh(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::InvalidCredentials)?;
    let claims = jwt::verify(cookie.value(), &app_state.config.jwt_secret)?;
    let account_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidCredentials)?;

    let ttl = app_state.config.claim_ttl(claims.remember);
    let token = jwt::issue(
        account_id,
        claims.role,
        claims.remember,
        &app_state.config.jwt_secret,
        ttl,
    )?;

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, session_cookie(token, ttl))?;

    Ok((StatusCode::OK, headers, Json(serde_json::json!({ "success": true }))))
}

/// POST /api/auth/logout
async fn logout(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && let Ok(claims) = jwt::verify(cookie.value(), &app_state.config.jwt_secret)
        && let Ok(account_id) = Uuid::parse_str(&claims.sub)
    {
        app_state.auth_use_cases.sign_out(account_id).await;
    }

    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, clear_session_cookie())?;

    Ok((StatusCode::OK, headers, Json(serde_json::json!({ "success": true }))))
}

// ============================================================================
// Cookie helpers
// ============================================================================

fn session_cookie(token: String, max_age: Duration) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(0))
        .build()
}

/// Appends a cookie to the headers, handling parse errors gracefully
fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) -> Result<(), AppError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| AppError::Internal("Failed to build cookie header".into()))?;
    headers.append("set-cookie", value);
    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/request-otp", post(request_otp))
        .route("/verify-otp", post(verify_otp))
        .route("/session", get(session))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}
