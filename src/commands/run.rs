// ABOUTME: Run command implementation.
// ABOUTME: Handles locking, hooks, and the ordered rollout of all components.

use super::project::load_config;
use marshal::diagnostics::{Diagnostics, Warning};
use marshal::error::{Error, Result};
use marshal::hooks::{HookContext, HookPoint, HookRunner};
use marshal::lock::RolloutLock;
use marshal::output::Output;
use marshal::rollout::ordered_rollout_with;
use std::path::Path;

/// Roll out every configured component.
pub async fn run(
    project_dir: &Path,
    destination: Option<&str>,
    force: bool,
    strict: bool,
    mut output: Output,
) -> Result<()> {
    let config = load_config(project_dir, destination)?;
    let components = config.build_components(project_dir)?;

    output.start_timer();
    let hook_runner = HookRunner::new(project_dir);
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Rolling out {} ({} component(s))",
        config.name,
        components.len()
    ));

    output.progress("  → Acquiring rollout lock...");
    let lock = RolloutLock::acquire(project_dir, &config.name, force)?;
    output.progress(&format!("  → Holding {}", lock.path().display()));

    let hook_context = HookContext::new(&config);
    run_hook(&hook_runner, HookPoint::PreRollout, &hook_context, &mut diag).await?;

    output.progress("  → Deploying components...");
    let result = ordered_rollout_with(&components, &mut diag).await;

    match &result {
        Ok(()) => {
            run_hook(&hook_runner, HookPoint::PostRollout, &hook_context, &mut diag).await?;
        }
        Err(e) => {
            let context = hook_context.clone().with_failure(e);
            run_hook(&hook_runner, HookPoint::OnError, &context, &mut diag).await?;
        }
    }

    if let Err(e) = lock.release() {
        diag.warn(Warning::lock_release(e.to_string()));
    }

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    result?;

    let absorbed = diag.absorbed_failures().count();
    if strict && absorbed > 0 {
        return Err(Error::AbsorbedFailures(absorbed));
    }

    output.success("Rollout complete!");
    Ok(())
}

/// Run a hook if present. A failing fatal hook aborts; any other failure
/// becomes a warning.
async fn run_hook(
    runner: &HookRunner,
    point: HookPoint,
    context: &HookContext,
    diag: &mut Diagnostics,
) -> Result<()> {
    let Some(hook) = runner.run(point, context).await else {
        return Ok(());
    };
    if hook.success {
        return Ok(());
    }

    let message = format!("{} hook failed", point.filename());
    if !hook.stderr.is_empty() {
        tracing::debug!("{} hook stderr: {}", point.filename(), hook.stderr.trim_end());
    }

    if point.is_fatal() {
        if !hook.stderr.is_empty() {
            eprintln!("{}", hook.stderr);
        }
        return Err(Error::Hook(message));
    }

    diag.warn(Warning::hook(message));
    Ok(())
}
