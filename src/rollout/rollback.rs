// ABOUTME: Rollback executor that undoes components in the given order.
// ABOUTME: Stops at the first undo failure so an operator can step in.

use crate::component::{Component, ComponentError};

/// Undo each component in the order given.
///
/// The first undo failure stops the pass and is returned as-is; components
/// after it are left untouched so the system is frozen for manual
/// inspection. Each entry is undone at most once per call; a component that
/// an earlier rollback already undid is undone again if it appears here.
pub async fn rollback_components<'a, C, I>(components: I) -> Result<(), ComponentError>
where
    C: Component + ?Sized + 'a,
    I: IntoIterator<Item = &'a C>,
{
    for component in components {
        tracing::info!("undoing {}", component.name());
        if let Err(e) = component.undo().await {
            tracing::error!("undo failed for {}: {}", component.name(), e);
            return Err(e);
        }
    }
    Ok(())
}
