//! # Utility Modules
//!
//! This module contains utility functions, constants, and configuration helpers
//! used throughout the talentboard application.
//!
//! ## Available Utilities
//!
//! - **Config** (`config`) - Environment-driven application configuration
//! - **Constants** (`constant`) - Application-wide timeouts and limits
//! - **Secret** (`secret`) - Reads secrets from `*_FILE` paths or plain env vars
//! - **Skills** (`skills`) - The delimited skills string codec

pub mod config;
pub mod constant;
pub mod secret;
pub mod skills;
