//! Reference data repository (skills, qualifications, shifts, experiences, locations).
//!
//! All reference tables share one shape, so a single repository serves them
//! and takes the [`ReferenceKind`] per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireline_core::{RecordId, ReferenceKind};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

const ITEM_COLUMNS: &str = "id, name, is_active, sequence, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReferenceItem {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub sequence: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ReferenceRepo: Send + Sync {
    async fn list(
        &self,
        kind: ReferenceKind,
        include_inactive: bool,
    ) -> DbResult<Vec<ReferenceItem>>;
    async fn create(
        &self,
        kind: ReferenceKind,
        name: &str,
        sequence: Option<i32>,
    ) -> DbResult<ReferenceItem>;
    async fn update(
        &self,
        kind: ReferenceKind,
        id: RecordId,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> DbResult<ReferenceItem>;
    async fn soft_delete(&self, kind: ReferenceKind, id: RecordId) -> DbResult<()>;
}

/// PostgreSQL implementation of ReferenceRepo.
pub struct PgReferenceRepo {
    pool: PgPool,
}

impl PgReferenceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceRepo for PgReferenceRepo {
    async fn list(
        &self,
        kind: ReferenceKind,
        include_inactive: bool,
    ) -> DbResult<Vec<ReferenceItem>> {
        let items = sqlx::query_as::<_, ReferenceItem>(&format!(
            r#"
            SELECT {} FROM {}
            WHERE deleted_at IS NULL AND ($1 OR is_active)
            ORDER BY sequence ASC NULLS LAST, id ASC
            "#,
            ITEM_COLUMNS,
            kind.table()
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create(
        &self,
        kind: ReferenceKind,
        name: &str,
        sequence: Option<i32>,
    ) -> DbResult<ReferenceItem> {
        let item = sqlx::query_as::<_, ReferenceItem>(&format!(
            "INSERT INTO {} (name, sequence) VALUES ($1, $2) RETURNING {}",
            kind.table(),
            ITEM_COLUMNS
        ))
        .bind(name)
        .bind(sequence)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("{} named {}", kind.resource(), name)))?;
        Ok(item)
    }

    async fn update(
        &self,
        kind: ReferenceKind,
        id: RecordId,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> DbResult<ReferenceItem> {
        let item = sqlx::query_as::<_, ReferenceItem>(&format!(
            r#"
            UPDATE {} SET
                name = COALESCE($2, name),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            kind.table(),
            ITEM_COLUMNS
        ))
        .bind(id.get())
        .bind(name)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("{} {}", kind.resource(), id)))?
        .ok_or_else(|| DbError::NotFound(format!("{} {}", kind.resource(), id)))?;
        Ok(item)
    }

    async fn soft_delete(&self, kind: ReferenceKind, id: RecordId) -> DbResult<()> {
        let result = sqlx::query(&format!(
            "UPDATE {} SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
            kind.table()
        ))
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("{} {}", kind.resource(), id)));
        }
        Ok(())
    }
}
