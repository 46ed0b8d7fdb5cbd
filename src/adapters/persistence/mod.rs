pub mod account;

use sqlx::PgPool;

use crate::app_error::AppError;

#[derive(Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    pub fn new(pool: PgPool) -> Self {
        PostgresPersistence { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound,
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                // PostgreSQL unique violation. Name the field so the caller
                // can report "<field> already exists" and the OTP signup race
                // recovery can tell identical-signup conflicts apart.
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    if msg.contains("accounts_email") {
                        AppError::Conflict("email".into())
                    } else if msg.contains("accounts_employee_id") {
                        AppError::Conflict("employeeId".into())
                    } else {
                        AppError::Conflict("record".into())
                    }
                }
                // PostgreSQL not-null violation
                else if msg.contains("null value") && msg.contains("violates not-null") {
                    AppError::InvalidInput("Required field is missing".into())
                } else {
                    // Log the actual error for debugging, but don't expose details
                    tracing::error!(error = ?err, "Database error");
                    AppError::Internal("Database operation failed".into())
                }
            }
            // Connectivity-shaped faults are the only ones reported as
            // temporarily unavailable; everything else is a server bug.
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                tracing::error!(error = ?err, "Database connectivity error");
                AppError::Database("Database unavailable".into())
            }
            _ => {
                tracing::error!(error = ?err, "Database error");
                AppError::Internal("Database operation failed".into())
            }
        }
    }
}
