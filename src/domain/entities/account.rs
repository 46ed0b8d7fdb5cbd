use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Portal role. Closed set: unknown values are rejected at every boundary
/// (request parsing, claim minting, guard checks) instead of defaulting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, AsRefStr, Display,
    EnumString,
)]
#[sqlx(type_name = "account_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(Default)]
pub enum Role {
    #[default]
    User,
    Partner,
    Admin,
}

impl Role {
    /// Landing page an authenticated holder of this role is sent to.
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::User => "/dashboard",
            Role::Partner => "/partner",
            Role::Admin => "/admin",
        }
    }
}

/// Account as held by the credential store. `password_hash` is stripped
/// before anything leaves the API surface.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub employee_id: Option<String>,
    pub verified_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl AccountProfile {
    /// Accounts without a stored hash are OTP-only: no password login path.
    pub fn is_otp_only(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Fields required to create an account. Email is normalized by the repo.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub employee_id: Option<String>,
}
