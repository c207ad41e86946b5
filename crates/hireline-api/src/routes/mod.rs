//! API routes.

pub mod benefits;
pub mod health;
pub mod plans;
pub mod reference;
pub mod sequence;
pub mod users;

use crate::AppState;
use axum::Router;
use hireline_core::ReferenceKind;

/// Build the main API router.
pub fn router(state: AppState) -> Router {
    let selfie_limit = state.selfies.max_bytes();

    let mut router = Router::new()
        .nest("/plans", plans::router())
        .nest("/benefits", benefits::router())
        .nest("/users", users::router(selfie_limit));

    for kind in ReferenceKind::ALL {
        router = router.nest(&format!("/{}", kind.resource()), reference::router(kind));
    }

    router.merge(health::router()).with_state(state)
}
