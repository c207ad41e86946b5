//! Reference data endpoints, one router per [`ReferenceKind`].

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use hireline_core::{RecordId, ReferenceKind};
use hireline_db::ReferenceItem;
use serde::Deserialize;

use super::plans::{ListQuery, required_name};
use super::sequence;
use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};

pub fn router(kind: ReferenceKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(move |state: State<AppState>, query: Query<ListQuery>| {
                list_items(state, query, kind)
            })
            .post(move |state: State<AppState>, body: Json<CreateItemRequest>| {
                create_item(state, body, kind)
            }),
        )
        .route("/sequence", sequence::route(kind.collection()))
        .route(
            "/{id}",
            put(
                move |state: State<AppState>,
                      id: Path<RecordId>,
                      body: Json<UpdateItemRequest>| {
                    update_item(state, id, body, kind)
                },
            )
            .delete(move |state: State<AppState>, id: Path<RecordId>| {
                delete_item(state, id, kind)
            }),
        )
}

async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    kind: ReferenceKind,
) -> Result<Json<Vec<ReferenceItem>>, ApiError> {
    let items = state.reference.list(kind, query.include_inactive).await?;
    Ok(Json(items))
}

#[derive(Debug, Deserialize)]
struct CreateItemRequest {
    name: String,
    sequence: Option<i32>,
}

async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
    kind: ReferenceKind,
) -> Result<(StatusCode, Json<ReferenceItem>), ApiError> {
    let name = required_name(&req.name)?;
    let item = state.reference.create(kind, &name, req.sequence).await?;
    tracing::info!(kind = kind.resource(), id = item.id, "Created reference item");
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
struct UpdateItemRequest {
    name: Option<String>,
    is_active: Option<bool>,
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(req): Json<UpdateItemRequest>,
    kind: ReferenceKind,
) -> Result<Json<ReferenceItem>, ApiError> {
    let name = req.name.as_deref().map(required_name).transpose()?;
    let item = state
        .reference
        .update(kind, id, name.as_deref(), req.is_active)
        .await?;
    Ok(Json(item))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    kind: ReferenceKind,
) -> Result<StatusCode, ApiError> {
    state.reference.soft_delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
