// ABOUTME: Rollback command implementation.
// ABOUTME: Manually undoes every configured component, in configured order.

use super::project::load_config;
use marshal::diagnostics::{Diagnostics, Warning};
use marshal::error::Result;
use marshal::lock::RolloutLock;
use marshal::output::Output;
use marshal::rollout::rollback_components;
use std::path::Path;

/// Undo all components, stopping at the first failure.
pub async fn rollback(
    project_dir: &Path,
    destination: Option<&str>,
    force: bool,
    mut output: Output,
) -> Result<()> {
    let config = load_config(project_dir, destination)?;
    let components = config.build_components(project_dir)?;

    output.start_timer();
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Rolling back {} ({} component(s))",
        config.name,
        components.len()
    ));

    let lock = RolloutLock::acquire(project_dir, &config.name, force)?;

    output.progress("  → Undoing components...");
    let result = rollback_components(&components).await;

    if let Err(e) = lock.release() {
        diag.warn(Warning::lock_release(e.to_string()));
    }

    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    result?;

    output.success("Rollback complete!");
    Ok(())
}
