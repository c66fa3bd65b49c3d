// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Currently the component/rollout identifier.

mod component_name;

pub use component_name::{ComponentName, ComponentNameError};
