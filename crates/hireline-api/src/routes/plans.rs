//! Subscription plan endpoints.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use hireline_core::plan::{PlanAudience, validate_pricing};
use hireline_core::{RecordId, SequencedCollection};
use hireline_db::{NewPlan, Plan, PlanBenefit, PlanUpdate};
use serde::Deserialize;
use tracing::info;

use super::sequence;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route("/sequence", sequence::route(SequencedCollection::Plans))
        .route("/{id}", get(get_plan).put(update_plan).delete(delete_plan))
        .route("/{id}/benefits", get(list_plan_benefits))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

async fn list_plans(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Plan>>, ApiError> {
    let plans = state.plans.list(query.include_inactive).await?;
    Ok(Json(plans))
}

#[derive(Debug, Deserialize)]
struct CreatePlanRequest {
    name: String,
    description: Option<String>,
    audience: PlanAudience,
    price_cents: i64,
    #[serde(default = "default_currency")]
    currency: String,
    duration_days: i32,
    #[serde(default = "default_true")]
    is_active: bool,
    sequence: Option<i32>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_true() -> bool {
    true
}

async fn create_plan(
    State(state): State<AppState>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<Plan>), ApiError> {
    let name = required_name(&req.name)?;
    validate_pricing(req.price_cents, &req.currency, req.duration_days)?;

    let plan = state
        .plans
        .create(NewPlan {
            name,
            description: req.description,
            audience: req.audience,
            price_cents: req.price_cents,
            currency: req.currency,
            duration_days: req.duration_days,
            is_active: req.is_active,
            sequence: req.sequence,
        })
        .await?;

    info!(plan_id = %plan.id, name = %plan.name, "Created subscription plan");
    Ok((StatusCode::CREATED, Json(plan)))
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<Plan>, ApiError> {
    Ok(Json(state.plans.get(id).await?))
}

#[derive(Debug, Deserialize)]
struct UpdatePlanRequest {
    name: Option<String>,
    description: Option<String>,
    audience: Option<PlanAudience>,
    price_cents: Option<i64>,
    currency: Option<String>,
    duration_days: Option<i32>,
    is_active: Option<bool>,
}

async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(req): Json<UpdatePlanRequest>,
) -> Result<Json<Plan>, ApiError> {
    let current = state.plans.get(id).await?;
    validate_pricing(
        req.price_cents.unwrap_or(current.price_cents),
        req.currency.as_deref().unwrap_or(&current.currency),
        req.duration_days.unwrap_or(current.duration_days),
    )?;
    let name = req.name.as_deref().map(required_name).transpose()?;

    let plan = state
        .plans
        .update(
            id,
            PlanUpdate {
                name,
                description: req.description,
                audience: req.audience,
                price_cents: req.price_cents,
                currency: req.currency,
                duration_days: req.duration_days,
                is_active: req.is_active,
            },
        )
        .await?;
    Ok(Json(plan))
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ApiError> {
    state.plans.soft_delete(id).await?;
    info!(plan_id = %id, "Deleted subscription plan");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_plan_benefits(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<Vec<PlanBenefit>>, ApiError> {
    state.plans.get(id).await?;
    let benefits = state.benefits.list_by_plan(id).await?;
    Ok(Json(benefits))
}

/// Trim a display name, rejecting blank ones.
pub(crate) fn required_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}
