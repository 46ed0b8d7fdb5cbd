//! In-memory mock implementations for the auth repository traits.
//!
//! These mocks back both the use-case unit tests and HTTP-level integration
//! tests of the `/api/auth/*` endpoints.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::auth::{AccountRepo, EmailSender, OtpCheck, OtpStore},
    domain::entities::account::{AccountProfile, NewAccount},
    infra::rate_limit::RateLimiterTrait,
};

// ============================================================================
// InMemoryAccountRepo
// ============================================================================

/// In-memory implementation of AccountRepo for testing.
#[derive(Default)]
pub struct InMemoryAccountRepo {
    accounts: Mutex<HashMap<Uuid, AccountProfile>>,
    fail_next_create: AtomicBool,
}

impl InMemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<AccountProfile>) -> Self {
        let map: HashMap<Uuid, AccountProfile> =
            accounts.into_iter().map(|a| (a.id, a)).collect();
        Self {
            accounts: Mutex::new(map),
            fail_next_create: AtomicBool::new(false),
        }
    }

    pub fn insert(&self, account: AccountProfile) {
        self.accounts.lock().unwrap().insert(account.id, account);
    }

    pub fn count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Make the next `create` call fail with a unique-constraint conflict,
    /// simulating a concurrent signup winning the race.
    pub fn fail_next_create_with_conflict(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AccountRepo for InMemoryAccountRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<AccountProfile>> {
        Ok(self.accounts.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<AccountProfile>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create(&self, new: NewAccount) -> AppResult<AccountProfile> {
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(AppError::Conflict("email".to_string()));
        }

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.email == new.email) {
            return Err(AppError::Conflict("email".to_string()));
        }

        let now = chrono::Utc::now().naive_utc();
        let account = AccountProfile {
            id: Uuid::new_v4(),
            email: new.email,
            name: new.name,
            password_hash: new.password_hash,
            phone: new.phone,
            role: new.role,
            employee_id: new.employee_id,
            verified_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<AccountProfile> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(&id).ok_or(AppError::NotFound)?;
        let now = chrono::Utc::now().naive_utc();
        account.verified_at.get_or_insert(now);
        account.updated_at = Some(now);
        Ok(account.clone())
    }
}

// ============================================================================
// InMemoryOtpStore
// ============================================================================

#[derive(Clone)]
struct StoredChallenge {
    code: String,
    expires_at: i64,
    attempts: u32,
}

/// In-memory OTP store mirroring the Redis store's semantics: expiry is
/// checked before the attempt counter, a match consumes the challenge, a
/// mismatch decrements. Expired and exhausted challenges stay readable so
/// callers see the distinct outcome instead of "not found".
#[derive(Default)]
pub struct InMemoryOtpStore {
    challenges: Mutex<HashMap<String, StoredChallenge>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a challenge directly. A negative `ttl_secs` produces an
    /// already-expired challenge.
    pub async fn seed(&self, email: &str, code: &str, ttl_secs: i64, attempts: u32) {
        let expires_at = chrono::Utc::now().timestamp() + ttl_secs;
        self.challenges.lock().unwrap().insert(
            email.to_string(),
            StoredChallenge {
                code: code.to_string(),
                expires_at,
                attempts,
            },
        );
    }

    /// The code currently stored for an email, if any.
    pub fn current_code(&self, email: &str) -> Option<String> {
        self.challenges
            .lock()
            .unwrap()
            .get(email)
            .map(|c| c.code.clone())
    }
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn put(
        &self,
        email: &str,
        code: &str,
        ttl_secs: i64,
        max_attempts: u32,
    ) -> AppResult<()> {
        self.seed(email, code, ttl_secs, max_attempts).await;
        Ok(())
    }

    async fn check(&self, email: &str, code: &str) -> AppResult<OtpCheck> {
        let mut challenges = self.challenges.lock().unwrap();
        let Some(challenge) = challenges.get_mut(email) else {
            return Ok(OtpCheck::NotFound);
        };

        let now = chrono::Utc::now().timestamp();
        if now >= challenge.expires_at {
            return Ok(OtpCheck::Expired);
        }
        if challenge.attempts == 0 {
            return Ok(OtpCheck::Exhausted);
        }
        if challenge.code == code {
            challenges.remove(email);
            return Ok(OtpCheck::Valid);
        }

        challenge.attempts -= 1;
        Ok(OtpCheck::Mismatch {
            remaining_attempts: challenge.attempts,
        })
    }
}

// ============================================================================
// CountingOtpStore
// ============================================================================

/// Wrapper that counts store accesses. Used to prove that structural
/// validation happens before any challenge lookup.
pub struct CountingOtpStore<S: OtpStore> {
    inner: std::sync::Arc<S>,
    accesses: AtomicUsize,
}

impl<S: OtpStore> CountingOtpStore<S> {
    pub fn new(inner: std::sync::Arc<S>) -> Self {
        Self {
            inner,
            accesses: AtomicUsize::new(0),
        }
    }

    pub fn accesses(&self) -> usize {
        self.accesses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: OtpStore> OtpStore for CountingOtpStore<S> {
    async fn put(
        &self,
        email: &str,
        code: &str,
        ttl_secs: i64,
        max_attempts: u32,
    ) -> AppResult<()> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.inner.put(email, code, ttl_secs, max_attempts).await
    }

    async fn check(&self, email: &str, code: &str) -> AppResult<OtpCheck> {
        self.accesses.fetch_add(1, Ordering::SeqCst);
        self.inner.check(email, code).await
    }
}

// ============================================================================
// InMemoryEmailSender
// ============================================================================

/// A captured outbound email.
#[derive(Clone)]
pub struct CapturedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// In-memory email sender that records every send for assertions.
#[derive(Default)]
pub struct InMemoryEmailSender {
    sent: Mutex<Vec<CapturedEmail>>,
}

impl InMemoryEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured_emails(&self) -> Vec<CapturedEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for InMemoryEmailSender {
    async fn send(&self, to: &str, subject: &str, html: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(CapturedEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(())
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

/// Rate limiter that never rejects. Endpoint tests exercise handler logic,
/// not the limiter.
#[derive(Default)]
pub struct InMemoryRateLimiter;

impl InMemoryRateLimiter {
    pub fn permissive() -> Self {
        Self
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check(&self, _ip: &str, _email: Option<&str>) -> AppResult<()> {
        Ok(())
    }
}

/// Rate limiter that records every check so tests can assert which keys the
/// middleware derived; optionally denies everything.
#[derive(Default)]
pub struct RecordingRateLimiter {
    calls: Mutex<Vec<(String, Option<String>)>>,
    deny: bool,
}

impl RecordingRateLimiter {
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn denying() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            deny: true,
        }
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateLimiterTrait for RecordingRateLimiter {
    async fn check(&self, ip: &str, email: Option<&str>) -> AppResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((ip.to_string(), email.map(str::to_string)));
        if self.deny {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}
