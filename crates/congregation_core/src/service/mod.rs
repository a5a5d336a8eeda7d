//! Core use-case services.
//!
//! # Responsibility
//! - Turn repository calls into use-case level APIs (id assignment, input
//!   normalization, lifecycle changes).
//! - Validate attendance sheet selections before anything is written.

pub mod attendance_service;
pub mod catalog_service;
pub mod member_service;
