use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::email_templates::otp_email;
use crate::application::observer::AuthObserver;
use crate::application::validators::{is_valid_email, is_valid_otp};
use crate::domain::entities::account::{AccountProfile, NewAccount, Role};

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<AccountProfile>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<AccountProfile>>;
    /// Create a new account. A unique-constraint violation surfaces as
    /// `AppError::Conflict` naming the offending field.
    async fn create(&self, new: NewAccount) -> AppResult<AccountProfile>;
    async fn mark_verified(&self, id: Uuid) -> AppResult<AccountProfile>;
}

/// Outcome of checking a code against the stored challenge. The store decides
/// atomically: expiry is checked before the attempt counter, a match consumes
/// the challenge, a mismatch decrements the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    Valid,
    NotFound,
    Expired,
    Exhausted,
    Mismatch { remaining_attempts: u32 },
}

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Persist a challenge for the email, superseding any prior one.
    async fn put(&self, email: &str, code: &str, ttl_secs: i64, max_attempts: u32)
    -> AppResult<()>;
    async fn check(&self, email: &str, code: &str) -> AppResult<OtpCheck>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()>;
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub employee_id: Option<String>,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct AuthUseCases {
    accounts: Arc<dyn AccountRepo>,
    otp_store: Arc<dyn OtpStore>,
    email_sender: Arc<dyn EmailSender>,
    observers: Vec<Arc<dyn AuthObserver>>,
    otp_ttl_minutes: i64,
    otp_max_attempts: u32,
}

impl AuthUseCases {
    pub fn new(
        accounts: Arc<dyn AccountRepo>,
        otp_store: Arc<dyn OtpStore>,
        email_sender: Arc<dyn EmailSender>,
        otp_ttl_minutes: i64,
        otp_max_attempts: u32,
    ) -> Self {
        Self {
            accounts,
            otp_store,
            email_sender,
            observers: Vec::new(),
            otp_ttl_minutes,
            otp_max_attempts,
        }
    }

    /// Register a lifecycle observer. Observers run after the state change
    /// they describe; their failures never affect the flow.
    pub fn register_observer(&mut self, observer: Arc<dyn AuthObserver>) {
        self.observers.push(observer);
    }

    /// Issue a fresh challenge for the email and send the code through the
    /// mail relay. A new issuance supersedes any prior challenge.
    #[instrument(skip(self))]
    pub async fn request_otp(&self, email: &str) -> AppResult<()> {
        if !is_valid_email(email) {
            return Err(AppError::invalid_email());
        }
        let email = normalize_email(email);

        let code = generate_code();
        self.otp_store
            .put(
                &email,
                &code,
                self.otp_ttl_minutes * 60,
                self.otp_max_attempts,
            )
            .await?;

        let (subject, html) = otp_email(&code, self.otp_ttl_minutes);
        self.email_sender.send(&email, &subject, &html).await
    }

    /// Verify a code against the stored challenge and resolve the account.
    ///
    /// Branch order is cheap-to-expensive: format checks reject malformed
    /// input before any storage access so bad requests never consume the
    /// attempt counter, then the password policy (signup variant), then the
    /// atomic store check, then the account lookup.
    ///
    /// With a password this doubles as signup: a missing account is created,
    /// and a duplicate-key conflict from a racing identical signup resolves
    /// by re-fetching instead of failing.
    #[instrument(skip(self, otp, password))]
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        password: Option<&str>,
    ) -> AppResult<AccountProfile> {
        if !is_valid_email(email) {
            return Err(AppError::invalid_email());
        }
        if !is_valid_otp(otp) {
            return Err(AppError::invalid_otp_format());
        }
        if let Some(password) = password
            && password.len() < 8
        {
            return Err(AppError::Validation(
                "password",
                "Password must be at least 8 characters".into(),
            ));
        }
        let email = normalize_email(email);

        match self.otp_store.check(&email, otp).await? {
            OtpCheck::Valid => {}
            OtpCheck::Expired => return Err(AppError::OtpExpired),
            OtpCheck::Exhausted => return Err(AppError::OtpAttemptsExhausted),
            OtpCheck::NotFound => {
                return Err(AppError::OtpInvalid {
                    remaining_attempts: 0,
                });
            }
            OtpCheck::Mismatch { remaining_attempts } => {
                return Err(AppError::OtpInvalid { remaining_attempts });
            }
        }

        let existing = self.accounts.get_by_email(&email).await?;

        let (account, created) = match (existing, password) {
            (Some(account), _) => (account, false),
            (None, Some(password)) => {
                let new = NewAccount {
                    email: email.clone(),
                    name: local_part(&email).to_string(),
                    password_hash: Some(hash_password(password)?),
                    phone: None,
                    role: Role::User,
                    employee_id: None,
                };
                match self.accounts.create(new).await {
                    Ok(account) => (account, true),
                    // A racing identical signup already created the account.
                    // Re-fetch by email; only a second miss is a real failure.
                    Err(AppError::Conflict(_)) => match self.accounts.get_by_email(&email).await? {
                        Some(account) => (account, false),
                        None => return Err(AppError::UserCreationFailed),
                    },
                    Err(other) => return Err(other),
                }
            }
            // Login-only path cannot silently provision an account.
            (None, None) => return Err(AppError::UserNotFound),
        };

        let account = self.accounts.mark_verified(account.id).await?;

        if created {
            for observer in &self.observers {
                observer.account_created(account.id, &account.email).await;
            }
        }
        for observer in &self.observers {
            observer.signed_in(account.id, account.role).await;
        }

        Ok(account)
    }

    /// Password login. OTP-only accounts (no stored hash) fail with the same
    /// signal as a wrong password.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AccountProfile> {
        if !is_valid_email(email) {
            return Err(AppError::invalid_email());
        }
        let email = normalize_email(email);

        let account = self
            .accounts
            .get_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let Some(hash) = account.password_hash.as_deref() else {
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(password, hash) {
            return Err(AppError::InvalidCredentials);
        }

        for observer in &self.observers {
            observer.signed_in(account.id, account.role).await;
        }

        Ok(account)
    }

    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: SignupRequest) -> AppResult<AccountProfile> {
        if !is_valid_email(&request.email) {
            return Err(AppError::invalid_email());
        }
        if request.password.len() < 6 {
            return Err(AppError::Validation(
                "password",
                "Password must be at least 6 characters".into(),
            ));
        }
        if request.name.trim().is_empty() {
            return Err(AppError::Validation("name", "Name is required".into()));
        }

        let new = NewAccount {
            email: normalize_email(&request.email),
            name: request.name.trim().to_string(),
            password_hash: Some(hash_password(&request.password)?),
            phone: request.phone,
            role: request.role.unwrap_or_default(),
            employee_id: request.employee_id,
        };
        let account = self.accounts.create(new).await?;

        for observer in &self.observers {
            observer.account_created(account.id, &account.email).await;
        }

        Ok(account)
    }

    pub async fn sign_out(&self, account_id: Uuid) {
        for observer in &self.observers {
            observer.signed_out(account_id).await;
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_code() -> String {
    let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{n:06}")
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    use argon2::password_hash::{SaltString, rand_core::OsRng};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
