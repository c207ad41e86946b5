//! `PUT /{resource}/sequence` handling shared by every sequenced collection.

use axum::extract::State;
use axum::routing::{MethodRouter, put};
use hireline_core::{RawSequenceEntry, SequencedCollection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Json;

#[derive(Debug, Serialize)]
pub struct SequenceResponse {
    success: bool,
    message: &'static str,
    updated: usize,
}

/// Route for reordering `collection`.
pub fn route(collection: SequencedCollection) -> MethodRouter<AppState> {
    put(move |state: State<AppState>, body: Json<Value>| {
        update_sequence(state, body, collection)
    })
}

async fn update_sequence(
    State(state): State<AppState>,
    Json(body): Json<Value>,
    collection: SequencedCollection,
) -> Result<Json<SequenceResponse>, ApiError> {
    let entries = extract_entries(&body, collection.entries_field())?;
    // Persistence failures here are never the client's fault.
    let updated = state
        .reorderer
        .reorder(collection, entries)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(SequenceResponse {
        success: true,
        message: "Sequence updated successfully",
        updated,
    }))
}

/// Pull the batch out of the request body.
///
/// A missing or null field is an empty batch. Array elements that are not
/// objects become entries without an id, which normalization drops.
fn extract_entries(body: &Value, field: &str) -> Result<Vec<RawSequenceEntry>, ApiError> {
    let object = body
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("request body must be a JSON object".to_string()))?;

    match object.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| RawSequenceEntry::deserialize(item).unwrap_or_default())
            .collect()),
        Some(_) => Err(ApiError::BadRequest(format!("'{}' must be an array", field))),
    }
}
