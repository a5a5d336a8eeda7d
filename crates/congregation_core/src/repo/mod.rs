//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per collection.
//! - Isolate SQL details from services, the live store and reports.
//!
//! # Invariants
//! - Write paths validate model invariants before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Repositories refuse connections whose schema is not fully migrated.

pub mod attendance_repo;
pub mod catalog_repo;
mod common;
pub mod member_repo;

pub use common::{EntityKind, RepoError, RepoResult};
