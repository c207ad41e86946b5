//! Core domain types for the Hireline job marketplace backend.
//!
//! This crate contains:
//! - Numeric record identifiers
//! - Sequenced collections and reorder entry normalization
//! - Subscription plan and user enums shared by the db and api layers

pub mod error;
pub mod id;
pub mod plan;
pub mod sequence;
pub mod user;

pub use error::{Error, Result};
pub use id::RecordId;
pub use sequence::{
    EntryValue, RawSequenceEntry, ReferenceKind, SequenceAssignment, SequencedCollection,
    normalize_entries,
};
