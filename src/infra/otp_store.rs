use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::auth::{OtpCheck, OtpStore},
};

/// Stored challenge. Logical expiry lives inside the value; the Redis key TTL
/// is longer (grace window) so expired and exhausted challenges keep answering
/// with their distinct signals instead of degrading to "not found".
#[derive(Debug, Serialize, Deserialize)]
struct Challenge {
    code: String,
    expires_at: i64,
    attempts: u32,
}

/// Keeps the terminal expired/exhausted states observable after logical expiry.
const GRACE_SECS: i64 = 1800;

/// Atomic check-and-mutate. Expiry is inspected before the attempt counter
/// (an expired challenge reports expired no matter what); a match deletes the
/// key so the code cannot be replayed; a mismatch decrements in place.
///
/// Returns {status, attempts_remaining} with status:
///   0 = match (consumed), 1 = not found, 2 = expired, 3 = exhausted, 4 = mismatch
const CHECK_SCRIPT: &str = r#"
local value = redis.call('GET', KEYS[1])
if not value then
    return {1, 0}
end
local data = cjson.decode(value)
local time_result = redis.call('TIME')
local now = tonumber(time_result[1])
if now >= tonumber(data.expires_at) then
    return {2, 0}
end
if tonumber(data.attempts) <= 0 then
    return {3, 0}
end
if data.code == ARGV[1] then
    redis.call('DEL', KEYS[1])
    return {0, 0}
end
data.attempts = data.attempts - 1
local ttl = redis.call('TTL', KEYS[1])
if ttl <= 0 then
    ttl = 60
end
redis.call('SET', KEYS[1], cjson.encode(data), 'EX', ttl)
return {4, data.attempts}
"#;

#[derive(Clone)]
pub struct RedisOtpStore {
    manager: ConnectionManager,
    script: redis::Script,
}

impl RedisOtpStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self {
            manager,
            script: redis::Script::new(CHECK_SCRIPT),
        }
    }

    fn key(email: &str) -> String {
        format!("otp:{email}")
    }
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(
        &self,
        email: &str,
        code: &str,
        ttl_secs: i64,
        max_attempts: u32,
    ) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let key = Self::key(email);

        let now = chrono::Utc::now().timestamp();
        let challenge = Challenge {
            code: code.to_string(),
            expires_at: now + ttl_secs.max(1),
            attempts: max_attempts,
        };
        let json = serde_json::to_string(&challenge)
            .map_err(|e| AppError::Internal(format!("Failed to serialize OTP challenge: {e}")))?;

        // SET overwrites: a new issuance supersedes any prior challenge.
        let key_ttl = (ttl_secs.max(1) + GRACE_SECS) as u64;
        let _: () = conn
            .set_ex(key, json, key_ttl)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }

    async fn check(&self, email: &str, code: &str) -> AppResult<OtpCheck> {
        let mut conn = self.manager.clone();
        let key = Self::key(email);

        let result: (i32, u32) = self
            .script
            .key(&key)
            .arg(code)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to check OTP challenge: {e}")))?;

        match result.0 {
            0 => Ok(OtpCheck::Valid),
            1 => Ok(OtpCheck::NotFound),
            2 => Ok(OtpCheck::Expired),
            3 => Ok(OtpCheck::Exhausted),
            4 => Ok(OtpCheck::Mismatch {
                remaining_attempts: result.1,
            }),
            other => Err(AppError::Internal(format!(
                "Unknown status code from Lua: {other}"
            ))),
        }
    }
}
