use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::auth::AccountRepo,
    domain::entities::account::{AccountProfile, NewAccount},
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> AccountProfile {
    AccountProfile {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        password_hash: row.get("password_hash"),
        phone: row.get("phone"),
        role: row.get("role"),
        employee_id: row.get("employee_id"),
        verified_at: row.get("verified_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl AccountRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<AccountProfile>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, phone, role, employee_id, verified_at, created_at, updated_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<AccountProfile>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, phone, role, employee_id, verified_at, created_at, updated_at FROM accounts WHERE email = $1",
        )
        .bind(email.to_lowercase())
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn create(&self, new: NewAccount) -> AppResult<AccountProfile> {
        let id = Uuid::new_v4();
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (id, email, name, password_hash, phone, role, employee_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, name, password_hash, phone, role, employee_id, verified_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(new.email.to_lowercase())
        .bind(&new.name)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .bind(new.role)
        .bind(&new.employee_id)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn mark_verified(&self, id: Uuid) -> AppResult<AccountProfile> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET verified_at = COALESCE(verified_at, CURRENT_TIMESTAMP), updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            RETURNING id, email, name, password_hash, phone, role, employee_id, verified_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }
}
