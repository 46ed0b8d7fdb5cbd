use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Database(_) => error_resp(
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::DatabaseError,
                None,
                None,
                None,
            ),
            AppError::RateLimited => error_resp(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorCode::RateLimited,
                None,
                None,
                None,
            ),
            AppError::InvalidCredentials => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::InvalidCredentials,
                None,
                None,
                None,
            ),
            AppError::Validation(field, msg) => {
                let code = match field {
                    "email" => ErrorCode::InvalidEmail,
                    "otp" => ErrorCode::InvalidOtpFormat,
                    _ => ErrorCode::InvalidInput,
                };
                error_resp(StatusCode::BAD_REQUEST, code, Some(msg), Some(field), None)
            }
            AppError::InvalidInput(msg) => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidInput,
                Some(msg),
                None,
                None,
            ),
            AppError::OtpInvalid { remaining_attempts } => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidOtp,
                Some("Invalid verification code".into()),
                None,
                Some(remaining_attempts),
            ),
            AppError::OtpExpired => error_resp(
                StatusCode::GONE,
                ErrorCode::OtpExpired,
                Some("Verification code has expired. Please request a new one.".into()),
                None,
                None,
            ),
            AppError::OtpAttemptsExhausted => error_resp(
                StatusCode::TOO_MANY_REQUESTS,
                ErrorCode::OtpAttemptsExhausted,
                Some("Too many failed attempts. Please request a new code.".into()),
                None,
                None,
            ),
            AppError::UserNotFound => error_resp(
                StatusCode::NOT_FOUND,
                ErrorCode::UserNotFound,
                Some("No account found for this email".into()),
                None,
                None,
            ),
            AppError::Conflict(field) => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::Conflict,
                Some(format!("{field} already exists")),
                None,
                None,
            ),
            AppError::UserCreationFailed => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::UserCreationFailed,
                None,
                None,
                None,
            ),
            AppError::NotFound => {
                error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None, None, None)
            }
            AppError::Internal(_) => error_resp(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalError,
                None,
                None,
                None,
            ),
        }
    }
}

fn error_resp(
    status: StatusCode,
    code: ErrorCode,
    message: Option<String>,
    field: Option<&'static str>,
    remaining_attempts: Option<u32>,
) -> Response {
    let mut body = serde_json::json!({ "success": false, "code": code.as_str() });
    if let Some(msg) = message {
        body["message"] = serde_json::Value::String(msg);
    }
    if let Some(field) = field {
        body["field"] = serde_json::Value::String(field.to_string());
    }
    if let Some(remaining) = remaining_attempts {
        body["remainingAttempts"] = serde_json::Value::from(remaining);
    }
    (status, Json(body)).into_response()
}
