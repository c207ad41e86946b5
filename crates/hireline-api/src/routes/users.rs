//! User endpoints and selfie-based identity verification.

use axum::Router;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use hireline_core::RecordId;
use hireline_core::user::{UserRole, VerificationStatus};
use hireline_db::User;
use serde::Deserialize;
use tracing::{info, warn};

use crate::AppState;
use crate::error::ApiError;
use crate::extract::{Json, Path};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

pub fn router(selfie_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/{id}", get(get_user))
        .route(
            "/{id}/selfie",
            post(upload_selfie).layer(DefaultBodyLimit::max(selfie_limit + MULTIPART_OVERHEAD)),
        )
        .route("/{id}/verification", put(review_verification))
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    full_name: String,
    email: String,
    role: UserRole,
}

async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let full_name = req.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::BadRequest("full_name must not be empty".to_string()));
    }
    let email = req.email.trim().to_ascii_lowercase();
    if !is_plausible_email(&email) {
        return Err(ApiError::BadRequest(format!("invalid email: {}", req.email)));
    }

    let user = state.users.create(full_name, &email, req.role).await?;
    info!(user_id = %user.id, role = user.role.as_str(), "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get(id).await?))
}

/// Accept a multipart upload whose `selfie` field holds the image.
async fn upload_selfie(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<User>, ApiError> {
    let mut multipart = multipart?;
    state.users.get(id).await?;

    let mut stored = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("selfie") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest("selfie field has no content type".to_string()))?;
        let data = field.bytes().await.map_err(multipart_error)?;
        stored = Some(state.selfies.store(&content_type, &data).await?);
        break;
    }
    let stored =
        stored.ok_or_else(|| ApiError::BadRequest("missing 'selfie' field".to_string()))?;

    let user = match state
        .users
        .attach_selfie(id, &stored.file_name, &stored.sha256)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            if let Err(cleanup) = state.selfies.remove(&stored.file_name).await {
                warn!(file = %stored.file_name, error = %cleanup, "Failed to remove orphaned selfie");
            }
            return Err(e.into());
        }
    };

    info!(user_id = %id, size = stored.size, "Selfie uploaded, verification pending");
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
struct ReviewRequest {
    status: VerificationStatus,
}

async fn review_verification(
    State(state): State<AppState>,
    Path(id): Path<RecordId>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<User>, ApiError> {
    if !req.status.is_review_outcome() {
        return Err(ApiError::BadRequest(format!(
            "{} is not a review outcome",
            req.status.as_str()
        )));
    }

    let user = state.users.settle_verification(id, req.status).await?;
    info!(user_id = %id, status = req.status.as_str(), "Verification reviewed");
    Ok(Json(user))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
