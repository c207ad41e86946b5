//! Repository traits and implementations.

pub mod benefit;
pub mod plan;
pub mod reference;
pub mod user;

pub use benefit::{BenefitRepo, BenefitUpdate, NewBenefit, PgBenefitRepo, PlanBenefit};
pub use plan::{NewPlan, PgPlanRepo, Plan, PlanRepo, PlanUpdate};
pub use reference::{PgReferenceRepo, ReferenceItem, ReferenceRepo};
pub use user::{PgUserRepo, User, UserRepo};
