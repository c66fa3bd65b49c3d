// ABOUTME: Orchestrator that deploys and verifies components one at a time.
// ABOUTME: Delegates to the rollback executor whenever a deploy or verify fails.

use crate::component::{Component, ComponentError, FailedStep};
use crate::diagnostics::{Diagnostics, Warning};

use super::{RolloutError, rollback_components};

/// Deploy then verify every component, in order.
///
/// On a deploy or verify failure, everything completed so far plus the
/// failing component is rolled back (completed first, failing one last).
/// Only a rollback failure is returned as an error. When the rollback
/// succeeds the failure is absorbed: the component still goes on to verify
/// (after a deploy failure), is appended to the completed set, and the loop
/// continues with the next component.
///
/// Use [`ordered_rollout_with`] to see absorbed failures.
pub async fn ordered_rollout<C: Component>(components: &[C]) -> Result<(), RolloutError> {
    ordered_rollout_with(components, &mut Diagnostics::default()).await
}

/// [`ordered_rollout`], recording each absorbed failure in `diag`.
pub async fn ordered_rollout_with<C: Component>(
    components: &[C],
    diag: &mut Diagnostics,
) -> Result<(), RolloutError> {
    let total = components.len();
    let mut completed: Vec<&C> = Vec::with_capacity(total);

    for (index, component) in components.iter().enumerate() {
        tracing::info!("[{}/{}] deploying {}", index + 1, total, component.name());
        if let Err(e) = component.deploy().await {
            recover(&completed, component, FailedStep::Deploy, e, diag).await?;
        }

        tracing::info!("[{}/{}] verifying {}", index + 1, total, component.name());
        if let Err(e) = component.verify().await {
            recover(&completed, component, FailedStep::Verify, e, diag).await?;
        }

        completed.push(component);
    }

    tracing::info!("rollout finished: {} component(s)", total);
    Ok(())
}

async fn recover<C: Component>(
    completed: &[&C],
    failed: &C,
    step: FailedStep,
    error: ComponentError,
    diag: &mut Diagnostics,
) -> Result<(), RolloutError> {
    tracing::info!(
        "{} failed for {}: {}; rolling back {} component(s)",
        step,
        failed.name(),
        error,
        completed.len() + 1
    );

    rollback_components(completed.iter().copied().chain(std::iter::once(failed)))
        .await
        .map_err(|e| RolloutError::rollback_failed(failed.name(), step.phase(), &e))?;

    diag.warn(Warning::absorbed(
        failed.name(),
        step,
        format!(
            "{} failed for {} ({}); rollback succeeded, continuing",
            step,
            failed.name(),
            error
        ),
    ));
    Ok(())
}
