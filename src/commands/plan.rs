// ABOUTME: Plan command implementation.
// ABOUTME: Validates the configuration and lists components in rollout order.

use super::project::load_config;
use marshal::component::{Component, Phase};
use marshal::error::Result;
use marshal::output::Output;
use std::path::Path;

/// Print the rollout order without touching any component.
pub fn plan(project_dir: &Path, destination: Option<&str>, output: Output) -> Result<()> {
    let config = load_config(project_dir, destination)?;
    let components = config.build_components(project_dir)?;

    output.progress(&format!(
        "Rollout {}{}",
        config.name,
        config
            .destination
            .as_deref()
            .map(|d| format!(" ({d})"))
            .unwrap_or_default()
    ));

    for (index, component) in components.iter().enumerate() {
        output.progress(&format!("  {}. {}", index + 1, component.name()));
        for phase in [Phase::Deploy, Phase::Verify, Phase::Undo] {
            let command = component.command(phase).unwrap_or("(none)");
            output.progress(&format!("       {:<7} {}", format!("{phase}:"), command));
        }
        output.progress(&format!(
            "       timeout: {}s",
            component.timeout().as_secs()
        ));
    }

    output.success(&format!("{} component(s) planned", components.len()));
    Ok(())
}
