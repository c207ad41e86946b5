//! Plan benefit endpoints.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use hireline_core::{RecordId, SequencedCollection};
use hireline_db::{BenefitUpdate, NewBenefit, PlanBenefit};
use serde::Deserialize;
use tracing::info;

use super::sequence;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_benefit))
        .route("/sequence", sequence::route(SequencedCollection::PlanBenefits))
        .route(
            "/{id}",
            get(get_benefit).put(update_benefit).delete(delete_benefit),
        )
}

#[derive(Debug, Deserialize)]
struct CreateBenefitRequest {
    plan_id: RecordId,
    title: String,
    description: Option<String>,
    #[serde(default = "default_true")]
    is_active: bool,
    sequence: Option<i32>,
}

fn default_true() -> bool {
    true
}

async fn create_benefit(
    State(state): State<AppState>,
    Json(req): Json<CreateBenefitRequest>,
) -> Result<(StatusCode, Json<PlanBenefit>), ApiError> {
    let title = required_title(&req.title)?;
    let benefit = state
        .benefits
        .create(NewBenefit {
            plan_id: req.plan_id,
            title,
            description: req.description,
            is_active: req.is_active,
            sequence: req.sequence,
        })
        .await?;

    info!(benefit_id = benefit.id, plan_id = benefit.plan_id, "Created plan benefit");
    Ok((StatusCode::CREATED, Json(benefit)))
}

async fn get_benefit(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<PlanBenefit>, ApiError> {
    Ok(Json(state.benefits.get(id).await?))
}

#[derive(Debug, Deserialize)]
struct UpdateBenefitRequest {
    title: Option<String>,
    description: Option<String>,
    is_active: Option<bool>,
}

async fn update_benefit(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(req): Json<UpdateBenefitRequest>,
) -> Result<Json<PlanBenefit>, ApiError> {
    let title = req.title.as_deref().map(required_title).transpose()?;
    let benefit = state
        .benefits
        .update(
            id,
            BenefitUpdate {
                title,
                description: req.description,
                is_active: req.is_active,
            },
        )
        .await?;
    Ok(Json(benefit))
}

async fn delete_benefit(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<StatusCode, ApiError> {
    state.benefits.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn required_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}
