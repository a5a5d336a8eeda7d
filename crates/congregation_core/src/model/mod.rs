//! Congregation domain model.
//!
//! # Responsibility
//! - Define members, classes, meetings and attendance records.
//! - Own input normalization and write-time validation rules.
//!
//! # Invariants
//! - Every entity is identified by a stable store-assigned UUID.
//! - Attendance records embed point-in-time display names of the member,
//!   class and meeting they reference; those names are never re-joined.

pub mod attendance;
pub mod catalog;
pub mod member;
pub mod validation;
