//! Test data factories for creating valid test fixtures.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::account::{AccountProfile, Role};

/// Create a verified, OTP-only test account with sensible defaults.
pub fn create_test_account(overrides: impl FnOnce(&mut AccountProfile)) -> AccountProfile {
    let mut account = AccountProfile {
        id: Uuid::new_v4(),
        email: "traveler@example.com".to_string(),
        name: "Test Traveler".to_string(),
        password_hash: None,
        phone: None,
        role: Role::User,
        employee_id: None,
        verified_at: Some(test_datetime()),
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut account);
    account
}

/// A fixed datetime for reproducible fixtures.
fn test_datetime() -> NaiveDateTime {
    chrono::DateTime::from_timestamp(1_700_000_000, 0)
        .expect("valid timestamp")
        .naive_utc()
}
