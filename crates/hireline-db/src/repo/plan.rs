//! Subscription plan repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hireline_core::RecordId;
use hireline_core::plan::PlanAudience;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{DbError, DbResult};

const PLAN_COLUMNS: &str = "id, name, description, audience, price_cents, currency, \
     duration_days, is_active, sequence, created_at, updated_at";

/// Database row for subscription plans.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub audience: String,
    pub price_cents: i64,
    pub currency: String,
    pub duration_days: i32,
    pub is_active: bool,
    pub sequence: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: RecordId,
    pub name: String,
    pub description: Option<String>,
    pub audience: PlanAudience,
    pub price_cents: i64,
    pub currency: String,
    pub duration_days: i32,
    pub is_active: bool,
    pub sequence: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = DbError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let audience = row
            .audience
            .parse::<PlanAudience>()
            .map_err(|_| DbError::InvalidData(format!("Unknown plan audience: {}", row.audience)))?;

        Ok(Plan {
            id: RecordId::new(row.id),
            name: row.name,
            description: row.description,
            audience,
            price_cents: row.price_cents,
            currency: row.currency.trim_end().to_string(),
            duration_days: row.duration_days,
            is_active: row.is_active,
            sequence: row.sequence,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub description: Option<String>,
    pub audience: PlanAudience,
    pub price_cents: i64,
    pub currency: String,
    pub duration_days: i32,
    pub is_active: bool,
    pub sequence: Option<i32>,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PlanUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub audience: Option<PlanAudience>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub duration_days: Option<i32>,
    pub is_active: Option<bool>,
}

#[async_trait]
pub trait PlanRepo: Send + Sync {
    async fn create(&self, plan: NewPlan) -> DbResult<Plan>;
    async fn get(&self, id: RecordId) -> DbResult<Plan>;
    async fn list(&self, include_inactive: bool) -> DbResult<Vec<Plan>>;
    async fn update(&self, id: RecordId, update: PlanUpdate) -> DbResult<Plan>;
    async fn soft_delete(&self, id: RecordId) -> DbResult<()>;
}

/// PostgreSQL implementation of PlanRepo.
pub struct PgPlanRepo {
    pool: PgPool,
}

impl PgPlanRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepo for PgPlanRepo {
    async fn create(&self, plan: NewPlan) -> DbResult<Plan> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            INSERT INTO subscription_plans
                (name, description, audience, price_cents, currency, duration_days, is_active, sequence)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PLAN_COLUMNS
        ))
        .bind(&plan.name)
        .bind(&plan.description)
        .bind(plan.audience.as_str())
        .bind(plan.price_cents)
        .bind(&plan.currency)
        .bind(plan.duration_days)
        .bind(plan.is_active)
        .bind(plan.sequence)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("plan {}", plan.name)))?;
        row.try_into()
    }

    async fn get(&self, id: RecordId) -> DbResult<Plan> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {} FROM subscription_plans WHERE id = $1 AND deleted_at IS NULL",
            PLAN_COLUMNS
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("plan {}", id)))?;
        row.try_into()
    }

    async fn list(&self, include_inactive: bool) -> DbResult<Vec<Plan>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            SELECT {} FROM subscription_plans
            WHERE deleted_at IS NULL AND ($1 OR is_active)
            ORDER BY sequence ASC NULLS LAST, id ASC
            "#,
            PLAN_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn update(&self, id: RecordId, update: PlanUpdate) -> DbResult<Plan> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            UPDATE subscription_plans SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                audience = COALESCE($4, audience),
                price_cents = COALESCE($5, price_cents),
                currency = COALESCE($6, currency),
                duration_days = COALESCE($7, duration_days),
                is_active = COALESCE($8, is_active),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            PLAN_COLUMNS
        ))
        .bind(id.get())
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.audience.map(|a| a.as_str()))
        .bind(update.price_cents)
        .bind(&update.currency)
        .bind(update.duration_days)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from_write(e, &format!("plan {}", id)))?
        .ok_or_else(|| DbError::NotFound(format!("plan {}", id)))?;
        row.try_into()
    }

    async fn soft_delete(&self, id: RecordId) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE subscription_plans SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("plan {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(audience: &str) -> PlanRow {
        PlanRow {
            id: 4,
            name: "Gold".to_string(),
            description: None,
            audience: audience.to_string(),
            price_cents: 4900,
            currency: "USD".to_string(),
            duration_days: 30,
            is_active: true,
            sequence: Some(2),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let plan = Plan::try_from(row("employer")).unwrap();
        assert_eq!(plan.id, RecordId::new(4));
        assert_eq!(plan.audience, PlanAudience::Employer);
        assert_eq!(plan.sequence, Some(2));
    }

    #[test]
    fn test_row_with_unknown_audience_is_invalid() {
        assert!(matches!(
            Plan::try_from(row("agency")),
            Err(DbError::InvalidData(_))
        ));
    }
}
