// ABOUTME: Library root for marshal - ordered rollouts with automatic rollback.
// ABOUTME: The main binary is in main.rs.

pub mod component;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hooks;
pub mod lock;
pub mod output;
pub mod rollout;
pub mod types;
