//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod activity_service;
pub mod progress_service;
pub mod project_service;
