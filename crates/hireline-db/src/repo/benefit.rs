//! Plan benefit repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireline_core::RecordId;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

const BENEFIT_COLUMNS: &str =
    "id, plan_id, title, description, is_active, sequence, created_at, updated_at";

/// A benefit listed under a subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlanBenefit {
    pub id: i64,
    pub plan_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sequence: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBenefit {
    pub plan_id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub sequence: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct BenefitUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait BenefitRepo: Send + Sync {
    async fn create(&self, benefit: NewBenefit) -> DbResult<PlanBenefit>;
    async fn get(&self, id: RecordId) -> DbResult<PlanBenefit>;
    async fn list_by_plan(&self, plan_id: RecordId) -> DbResult<Vec<PlanBenefit>>;
    async fn update(&self, id: RecordId, update: BenefitUpdate) -> DbResult<PlanBenefit>;
    async fn soft_delete(&self, id: RecordId) -> DbResult<()>;
}

/// PostgreSQL implementation of BenefitRepo.
pub struct PgBenefitRepo {
    pool: PgPool,
}

impl PgBenefitRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BenefitRepo for PgBenefitRepo {
    async fn create(&self, benefit: NewBenefit) -> DbResult<PlanBenefit> {
        // Only live plans accept new benefits.
        let created = sqlx::query_as::<_, PlanBenefit>(&format!(
            r#"
            INSERT INTO plan_benefits (plan_id, title, description, is_active, sequence)
            SELECT p.id, $2, $3, $4, $5
            FROM subscription_plans p
            WHERE p.id = $1 AND p.deleted_at IS NULL
            RETURNING {}
            "#,
            BENEFIT_COLUMNS
        ))
        .bind(benefit.plan_id.get())
        .bind(&benefit.title)
        .bind(&benefit.description)
        .bind(benefit.is_active)
        .bind(benefit.sequence)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("benefit {}", benefit.title)))?
        .ok_or_else(|| DbError::NotFound(format!("plan {}", benefit.plan_id)))?;
        Ok(created)
    }

    async fn get(&self, id: RecordId) -> DbResult<PlanBenefit> {
        let benefit = sqlx::query_as::<_, PlanBenefit>(&format!(
            "SELECT {} FROM plan_benefits WHERE id = $1 AND deleted_at IS NULL",
            BENEFIT_COLUMNS
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("benefit {}", id)))?;
        Ok(benefit)
    }

    async fn list_by_plan(&self, plan_id: RecordId) -> DbResult<Vec<PlanBenefit>> {
        let benefits = sqlx::query_as::<_, PlanBenefit>(&format!(
            r#"
            SELECT {} FROM plan_benefits
            WHERE plan_id = $1 AND deleted_at IS NULL
            ORDER BY sequence ASC NULLS LAST, id ASC
            "#,
            BENEFIT_COLUMNS
        ))
        .bind(plan_id.get())
        .fetch_all(&self.pool)
        .await?;
        Ok(benefits)
    }

    async fn update(&self, id: RecordId, update: BenefitUpdate) -> DbResult<PlanBenefit> {
        let benefit = sqlx::query_as::<_, PlanBenefit>(&format!(
            r#"
            UPDATE plan_benefits SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            BENEFIT_COLUMNS
        ))
        .bind(id.get())
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("benefit {}", id)))?;
        Ok(benefit)
    }

    async fn soft_delete(&self, id: RecordId) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE plan_benefits SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("benefit {}", id)));
        }
        Ok(())
    }
}
