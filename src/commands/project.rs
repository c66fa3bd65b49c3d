// ABOUTME: Shared helper for loading the project configuration.
// ABOUTME: Discovers the config file and applies an optional destination.

use marshal::config::Config;
use marshal::error::Result;
use std::path::Path;

/// Load the project's config, merged with `destination` when given.
pub fn load_config(project_dir: &Path, destination: Option<&str>) -> Result<Config> {
    let config = Config::discover(project_dir)?;

    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}
