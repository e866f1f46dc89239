//! # HTTP Request Handlers
//!
//! Handlers are thin: they extract parameters, call a service and wrap the
//! result in JSON. Errors surface as [`crate::error::AppError`].
//!
//! ## Available Handlers
//!
//! - **Candidates** (`candidates`) - Applicant search, listing and detail
//! - **Feedback** (`feedback`) - Vacancy applications, bulk status update, notification email
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Posts** (`posts`) - Blog posts, comments and tags

mod candidates;
mod feedback;
mod health_check;
mod posts;

pub use candidates::*;
pub use feedback::*;
pub use health_check::*;
pub use posts::*;
