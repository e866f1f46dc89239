//! # Business Logic Services
//!
//! Services encapsulate domain-specific functionality and provide clean
//! interfaces for use by HTTP handlers.
//!
//! ## Available Services
//!
//! - **Candidates** (`candidates`) - Search, listing, feedback view and bulk status updates
//! - **Email** (`email`) - Email delivery service with multiple implementations
//! - **JWT** (`jwt`) - Bearer token validation
//! - **Notification** (`notification`) - Application decision emails
//! - **Posts** (`posts`) - Blog posts, comments and tags

pub mod candidates;
pub mod email;
pub mod jwt;
pub mod notification;
pub mod posts;
