//! Application state.

use hireline_config::UploadConfig;
use hireline_db::{
    BenefitRepo, PgBenefitRepo, PgPlanRepo, PgReferenceRepo, PgSequenceStore, PgUserRepo,
    PlanRepo, ReferenceRepo, SequenceReorderer, UserRepo,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::selfie::SelfieStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub plans: Arc<dyn PlanRepo>,
    pub benefits: Arc<dyn BenefitRepo>,
    pub reference: Arc<dyn ReferenceRepo>,
    pub users: Arc<dyn UserRepo>,
    pub reorderer: SequenceReorderer,
    pub selfies: Arc<SelfieStore>,
}

impl AppState {
    pub fn new(pool: PgPool, uploads: &UploadConfig) -> Self {
        Self {
            plans: Arc::new(PgPlanRepo::new(pool.clone())),
            benefits: Arc::new(PgBenefitRepo::new(pool.clone())),
            reference: Arc::new(PgReferenceRepo::new(pool.clone())),
            users: Arc::new(PgUserRepo::new(pool.clone())),
            reorderer: SequenceReorderer::new(Arc::new(PgSequenceStore::new(pool.clone()))),
            selfies: Arc::new(SelfieStore::new(uploads)),
            pool,
        }
    }
}
