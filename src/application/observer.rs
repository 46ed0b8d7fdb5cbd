use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::account::Role;

/// Discrete lifecycle hooks for authentication events. Callers register
/// observers on `AuthUseCases`; core logic never depends on what an observer
/// does with the event.
#[async_trait]
pub trait AuthObserver: Send + Sync {
    async fn account_created(&self, account_id: Uuid, email: &str);
    async fn signed_in(&self, account_id: Uuid, role: Role);
    async fn signed_out(&self, account_id: Uuid);
}

/// Default observer: structured log line per event.
#[derive(Default)]
pub struct TracingObserver;

#[async_trait]
impl AuthObserver for TracingObserver {
    async fn account_created(&self, account_id: Uuid, email: &str) {
        tracing::info!(%account_id, email, "account created");
    }

    async fn signed_in(&self, account_id: Uuid, role: Role) {
        tracing::info!(%account_id, %role, "signed in");
    }

    async fn signed_out(&self, account_id: Uuid) {
        tracing::info!(%account_id, "signed out");
    }
}
