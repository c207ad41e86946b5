//! In-memory application wiring for router tests.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use hireline_config::UploadConfig;
use hireline_core::user::{UserRole, VerificationStatus};
use hireline_core::{RecordId, ReferenceKind, SequencedCollection};
use hireline_db::memory::MemorySequenceStore;
use hireline_db::{
    BenefitRepo, BenefitUpdate, DbError, DbResult, NewBenefit, NewPlan, Plan, PlanBenefit,
    PlanRepo, PlanUpdate, ReferenceItem, ReferenceRepo, SequenceReorderer, User, UserRepo,
};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use crate::services::selfie::SelfieStore;
use crate::{AppState, routes};

pub struct TestApp {
    pub router: Router,
    pub store: MemorySequenceStore,
    pub plans: Arc<MemoryPlanRepo>,
    pub users: Arc<MemoryUserRepo>,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_uploads(UploadConfig {
            dir: std::env::temp_dir().join(format!("hireline-api-{}", uuid::Uuid::now_v7())),
            ..UploadConfig::default()
        })
    }

    pub fn with_uploads(uploads: UploadConfig) -> Self {
        let store = MemorySequenceStore::new();
        let plans = Arc::new(MemoryPlanRepo::default());
        let users = Arc::new(MemoryUserRepo::default());
        // Never connects: only the readiness probe would touch it.
        let benefits = Arc::new(MemoryBenefitRepo::new(plans.clone()));
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://hireline@127.0.0.1:1/hireline_test")
            .unwrap();

        let state = AppState {
            pool,
            plans: plans.clone(),
            benefits,
            reference: Arc::new(MemoryReferenceRepo::default()),
            users: users.clone(),
            reorderer: SequenceReorderer::new(Arc::new(store.clone())),
            selfies: Arc::new(SelfieStore::new(&uploads)),
        };

        Self {
            router: routes::router(state),
            store,
            plans,
            users,
            upload_dir: uploads.dir,
        }
    }

    pub fn seed_sequence(&self, collection: SequencedCollection, rows: &[(i64, Option<i32>)]) {
        for (id, sequence) in rows {
            self.store.seed(collection, RecordId::new(*id), *sequence);
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A request whose body is sent as-is, for exercising extractor rejections.
pub fn raw_request(
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[derive(Default)]
pub struct MemoryPlanRepo {
    plans: Mutex<Vec<Plan>>,
}

impl MemoryPlanRepo {
    pub fn find(&self, id: RecordId) -> Option<Plan> {
        self.plans.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl PlanRepo for MemoryPlanRepo {
    async fn create(&self, plan: NewPlan) -> DbResult<Plan> {
        let mut plans = self.plans.lock().unwrap();
        let created = Plan {
            id: RecordId::new(plans.len() as i64 + 1),
            name: plan.name,
            description: plan.description,
            audience: plan.audience,
            price_cents: plan.price_cents,
            currency: plan.currency,
            duration_days: plan.duration_days,
            is_active: plan.is_active,
            sequence: plan.sequence,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        plans.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: RecordId) -> DbResult<Plan> {
        self.find(id)
            .ok_or_else(|| DbError::NotFound(format!("plan {}", id)))
    }

    async fn list(&self, include_inactive: bool) -> DbResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| include_inactive || p.is_active)
            .cloned()
            .collect();
        plans.sort_by_key(|p| (p.sequence.is_none(), p.sequence, p.id));
        Ok(plans)
    }

    async fn update(&self, id: RecordId, update: PlanUpdate) -> DbResult<Plan> {
        let mut plans = self.plans.lock().unwrap();
        let plan = plans
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DbError::NotFound(format!("plan {}", id)))?;
        if let Some(name) = update.name {
            plan.name = name;
        }
        if let Some(description) = update.description {
            plan.description = Some(description);
        }
        if let Some(audience) = update.audience {
            plan.audience = audience;
        }
        if let Some(price_cents) = update.price_cents {
            plan.price_cents = price_cents;
        }
        if let Some(currency) = update.currency {
            plan.currency = currency;
        }
        if let Some(duration_days) = update.duration_days {
            plan.duration_days = duration_days;
        }
        if let Some(is_active) = update.is_active {
            plan.is_active = is_active;
        }
        plan.updated_at = Utc::now();
        Ok(plan.clone())
    }

    async fn soft_delete(&self, id: RecordId) -> DbResult<()> {
        let mut plans = self.plans.lock().unwrap();
        let before = plans.len();
        plans.retain(|p| p.id != id);
        if plans.len() == before {
            return Err(DbError::NotFound(format!("plan {}", id)));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepo {
    pub fn find(&self, id: RecordId) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    fn modify(&self, id: RecordId, f: impl FnOnce(&mut User)) -> DbResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
        f(user);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, full_name: &str, email: &str, role: UserRole) -> DbResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(DbError::Duplicate(format!("user with email {}", email)));
        }
        let user = User {
            id: RecordId::new(users.len() as i64 + 1),
            full_name: full_name.to_string(),
            email: email.to_string(),
            role,
            selfie_path: None,
            selfie_sha256: None,
            verification_status: VerificationStatus::Unverified,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: RecordId) -> DbResult<User> {
        self.find(id)
            .ok_or_else(|| DbError::NotFound(format!("user {}", id)))
    }

    async fn attach_selfie(&self, id: RecordId, path: &str, sha256: &str) -> DbResult<User> {
        self.modify(id, |user| {
            user.selfie_path = Some(path.to_string());
            user.selfie_sha256 = Some(sha256.to_string());
            user.verification_status = VerificationStatus::Pending;
        })
    }

    async fn settle_verification(
        &self,
        id: RecordId,
        status: VerificationStatus,
    ) -> DbResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DbError::NotFound(format!("user {}", id)))?;
        if user.verification_status != VerificationStatus::Pending {
            return Err(DbError::Conflict(format!(
                "cannot move verification from {} to {}",
                user.verification_status.as_str(),
                status.as_str()
            )));
        }
        user.verification_status = status;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

struct StoredBenefit {
    benefit: PlanBenefit,
    deleted: bool,
}

/// Benefits that only attach to plans still present in the plan repo.
pub struct MemoryBenefitRepo {
    plans: Arc<MemoryPlanRepo>,
    benefits: Mutex<Vec<StoredBenefit>>,
}

impl MemoryBenefitRepo {
    pub fn new(plans: Arc<MemoryPlanRepo>) -> Self {
        Self {
            plans,
            benefits: Mutex::new(Vec::new()),
        }
    }

    fn modify(&self, id: RecordId, f: impl FnOnce(&mut StoredBenefit)) -> DbResult<PlanBenefit> {
        let mut benefits = self.benefits.lock().unwrap();
        let stored = benefits
            .iter_mut()
            .find(|b| b.benefit.id == id.get() && !b.deleted)
            .ok_or_else(|| DbError::NotFound(format!("benefit {}", id)))?;
        f(stored);
        stored.benefit.updated_at = Utc::now();
        Ok(stored.benefit.clone())
    }
}

#[async_trait]
impl BenefitRepo for MemoryBenefitRepo {
    async fn create(&self, benefit: NewBenefit) -> DbResult<PlanBenefit> {
        if self.plans.find(benefit.plan_id).is_none() {
            return Err(DbError::NotFound(format!("plan {}", benefit.plan_id)));
        }
        let mut benefits = self.benefits.lock().unwrap();
        let created = PlanBenefit {
            id: benefits.len() as i64 + 1,
            plan_id: benefit.plan_id.get(),
            title: benefit.title,
            description: benefit.description,
            is_active: benefit.is_active,
            sequence: benefit.sequence,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        benefits.push(StoredBenefit {
            benefit: created.clone(),
            deleted: false,
        });
        Ok(created)
    }

    async fn get(&self, id: RecordId) -> DbResult<PlanBenefit> {
        self.benefits
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.benefit.id == id.get() && !b.deleted)
            .map(|b| b.benefit.clone())
            .ok_or_else(|| DbError::NotFound(format!("benefit {}", id)))
    }

    async fn list_by_plan(&self, plan_id: RecordId) -> DbResult<Vec<PlanBenefit>> {
        let mut benefits: Vec<PlanBenefit> = self
            .benefits
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.benefit.plan_id == plan_id.get() && !b.deleted)
            .map(|b| b.benefit.clone())
            .collect();
        benefits.sort_by_key(|b| (b.sequence.is_none(), b.sequence, b.id));
        Ok(benefits)
    }

    async fn update(&self, id: RecordId, update: BenefitUpdate) -> DbResult<PlanBenefit> {
        self.modify(id, |stored| {
            if let Some(title) = update.title {
                stored.benefit.title = title;
            }
            if let Some(description) = update.description {
                stored.benefit.description = Some(description);
            }
            if let Some(is_active) = update.is_active {
                stored.benefit.is_active = is_active;
            }
        })
    }

    async fn soft_delete(&self, id: RecordId) -> DbResult<()> {
        self.modify(id, |stored| stored.deleted = true).map(|_| ())
    }
}

struct StoredItem {
    kind: ReferenceKind,
    item: ReferenceItem,
    deleted: bool,
}

/// Reference items for every kind, with names unique per kind ignoring case.
#[derive(Default)]
pub struct MemoryReferenceRepo {
    items: Mutex<Vec<StoredItem>>,
}

impl MemoryReferenceRepo {
    fn name_taken(items: &[StoredItem], kind: ReferenceKind, name: &str, except: i64) -> bool {
        items.iter().any(|s| {
            s.kind == kind
                && !s.deleted
                && s.item.id != except
                && s.item.name.to_lowercase() == name.to_lowercase()
        })
    }
}

#[async_trait]
impl ReferenceRepo for MemoryReferenceRepo {
    async fn list(
        &self,
        kind: ReferenceKind,
        include_inactive: bool,
    ) -> DbResult<Vec<ReferenceItem>> {
        let mut items: Vec<ReferenceItem> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.kind == kind && !s.deleted && (include_inactive || s.item.is_active))
            .map(|s| s.item.clone())
            .collect();
        items.sort_by_key(|i| (i.sequence.is_none(), i.sequence, i.id));
        Ok(items)
    }

    async fn create(
        &self,
        kind: ReferenceKind,
        name: &str,
        sequence: Option<i32>,
    ) -> DbResult<ReferenceItem> {
        let mut items = self.items.lock().unwrap();
        if Self::name_taken(&items, kind, name, 0) {
            return Err(DbError::Duplicate(format!("{} named {}", kind.resource(), name)));
        }
        let item = ReferenceItem {
            id: items.len() as i64 + 1,
            name: name.to_string(),
            is_active: true,
            sequence,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        items.push(StoredItem {
            kind,
            item: item.clone(),
            deleted: false,
        });
        Ok(item)
    }

    async fn update(
        &self,
        kind: ReferenceKind,
        id: RecordId,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> DbResult<ReferenceItem> {
        let mut items = self.items.lock().unwrap();
        if let Some(name) = name {
            if Self::name_taken(&items, kind, name, id.get()) {
                return Err(DbError::Duplicate(format!("{} named {}", kind.resource(), name)));
            }
        }
        let stored = items
            .iter_mut()
            .find(|s| s.kind == kind && s.item.id == id.get() && !s.deleted)
            .ok_or_else(|| DbError::NotFound(format!("{} {}", kind.resource(), id)))?;
        if let Some(name) = name {
            stored.item.name = name.to_string();
        }
        if let Some(is_active) = is_active {
            stored.item.is_active = is_active;
        }
        stored.item.updated_at = Utc::now();
        Ok(stored.item.clone())
    }

    async fn soft_delete(&self, kind: ReferenceKind, id: RecordId) -> DbResult<()> {
        let mut items = self.items.lock().unwrap();
        let stored = items
            .iter_mut()
            .find(|s| s.kind == kind && s.item.id == id.get() && !s.deleted)
            .ok_or_else(|| DbError::NotFound(format!("{} {}", kind.resource(), id)))?;
        stored.deleted = true;
        Ok(())
    }
}
