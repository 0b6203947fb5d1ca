//! Unlinked asset auditor
//!
//! Finds Contentful assets that no entry links to and writes them to a JSON
//! report for manual cleanup. The remote space is never modified.

pub mod app;
pub mod cli;
pub mod config;
pub mod services;

pub use app::{AuditReport, RunStatus, execute, run_audit};
pub use config::{Config, ConfigError};
