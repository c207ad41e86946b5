//! User repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireline_core::RecordId;
use hireline_core::user::{UserRole, VerificationStatus};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

const USER_COLUMNS: &str = "id, full_name, email, role, selfie_path, selfie_sha256, \
     verification_status, created_at, updated_at";

/// Database row for users.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub selfie_path: Option<String>,
    pub selfie_sha256: Option<String>,
    pub verification_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A platform user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
    pub selfie_path: Option<String>,
    pub selfie_sha256: Option<String>,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(|_| DbError::InvalidData(format!("Unknown user role: {}", row.role)))?;
        let verification_status = row
            .verification_status
            .parse::<VerificationStatus>()
            .map_err(|_| {
                DbError::InvalidData(format!(
                    "Unknown verification status: {}",
                    row.verification_status
                ))
            })?;

        Ok(User {
            id: RecordId::new(row.id),
            full_name: row.full_name,
            email: row.email,
            role,
            selfie_path: row.selfie_path,
            selfie_sha256: row.selfie_sha256,
            verification_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, full_name: &str, email: &str, role: UserRole) -> DbResult<User>;
    async fn get(&self, id: RecordId) -> DbResult<User>;
    /// Record an uploaded selfie and mark the user as pending review.
    async fn attach_selfie(&self, id: RecordId, path: &str, sha256: &str) -> DbResult<User>;
    /// Settle a pending review. Fails with `Conflict` unless the user is still pending.
    async fn settle_verification(
        &self,
        id: RecordId,
        status: VerificationStatus,
    ) -> DbResult<User>;
}

/// PostgreSQL implementation of UserRepo.
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, full_name: &str, email: &str, role: UserRole) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (full_name, email, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(full_name)
        .bind(email)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("user with email {}", email)))?;
        row.try_into()
    }

    async fn get(&self, id: RecordId) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
        row.try_into()
    }

    async fn attach_selfie(&self, id: RecordId, path: &str, sha256: &str) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                selfie_path = $2,
                selfie_sha256 = $3,
                verification_status = 'pending',
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id.get())
        .bind(path)
        .bind(sha256)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
        row.try_into()
    }

    async fn settle_verification(
        &self,
        id: RecordId,
        status: VerificationStatus,
    ) -> DbResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET verification_status = $2, updated_at = NOW()
            WHERE id = $1 AND verification_status = 'pending'
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id.get())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = row {
            return row.try_into();
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT verification_status FROM users WHERE id = $1")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await?;
        match current {
            Some(current) => Err(DbError::Conflict(format!(
                "cannot move verification from {} to {}",
                current,
                status.as_str()
            ))),
            None => Err(DbError::NotFound(format!("user {}", id))),
        }
    }
}
