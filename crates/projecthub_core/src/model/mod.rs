//! Project domain model.
//!
//! # Responsibility
//! - Define raw input shapes (`*Input`, `ProjectDraft`) decoded from form data.
//! - Define validated shapes (`Tag`, `ProjectMember`, `NormalizedProject`)
//!   that persistence is allowed to accept.
//!
//! # Invariants
//! - Validated shapes are only produced by `crate::validation`.
//! - Role fields are closed enums once validated.

pub mod governance;
pub mod project;
pub mod tag;
