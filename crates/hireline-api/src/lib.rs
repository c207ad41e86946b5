//! REST API server for the Hireline job marketplace.
//!
//! Serves subscription plans, plan benefits, reference data and users,
//! plus selfie uploads for identity verification.

pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use state::AppState;
