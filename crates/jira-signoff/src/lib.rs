//! Jira risk controller signoff service.
//!
//! This crate provides:
//! - Issue key extraction from pasted Jira and casement links
//! - A REST client for issue lookups and the signoff plugin endpoint
//! - HTTP handlers backing the signoff web page

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod links;
pub mod models;
pub mod server;
pub mod signoff;

pub use client::JiraClient;
pub use config::Config;
pub use error::{ConfigError, JiraError};
pub use links::{extract_issue_key, unique_issue_keys};
pub use models::*;
pub use server::{build_router, AppState};
