use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Storage connectivity or query failure. Detail stays server-side.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Too many requests. Please slow down.")]
    RateLimited,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Field-tagged validation failure: (field, message).
    #[error("Invalid input: {1}")]
    Validation(&'static str, String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Wrong or absent verification code; carries attempts left on the challenge.
    #[error("Invalid verification code")]
    OtpInvalid { remaining_attempts: u32 },

    #[error("Verification code has expired")]
    OtpExpired,

    #[error("Too many failed attempts")]
    OtpAttemptsExhausted,

    #[error("User not found")]
    UserNotFound,

    /// Unique-constraint conflict, e.g. "email already exists".
    #[error("{0} already exists")]
    Conflict(String),

    #[error("User creation failed")]
    UserCreationFailed,

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    RateLimited,
    InvalidCredentials,
    InvalidEmail,
    InvalidOtpFormat,
    InvalidInput,
    InvalidOtp,
    OtpExpired,
    OtpAttemptsExhausted,
    UserNotFound,
    Conflict,
    UserCreationFailed,
    NotFound,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::InvalidOtpFormat => "INVALID_OTP_FORMAT",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidOtp => "INVALID_OTP",
            ErrorCode::OtpExpired => "OTP_EXPIRED",
            ErrorCode::OtpAttemptsExhausted => "OTP_ATTEMPTS_EXHAUSTED",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::UserCreationFailed => "USER_CREATION_FAILED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    /// Field-tagged email format error, shared by every handler that takes an address.
    pub fn invalid_email() -> Self {
        AppError::Validation("email", "Invalid email format".into())
    }

    /// Field-tagged code format error (code must be exactly 6 digits).
    pub fn invalid_otp_format() -> Self {
        AppError::Validation("otp", "Verification code must be 6 digits".into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
