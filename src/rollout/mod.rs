// ABOUTME: Ordered rollout of components with automatic rollback on failure.
// ABOUTME: Exports the orchestrator, the rollback executor, and the rollout error.

mod error;
mod ordered;
mod rollback;

pub use error::RolloutError;
pub use ordered::{ordered_rollout, ordered_rollout_with};
pub use rollback::rollback_components;
