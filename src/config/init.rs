// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a commented marshal.yml template.

use std::fmt::Write;
use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

const DEFAULT_NAME: &str = "my-platform";

pub fn init_config(dir: &Path, name: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let config = Config::template(name.unwrap_or(DEFAULT_NAME))?;
    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    let mut yaml = format!(
        r#"name: {}
# Per-operation deadline, overridable per component
timeout: {}s
# Components are deployed and verified in this order. On failure everything
# completed so far, plus the failing component, is undone in the same order.
components:
"#,
        config.name,
        config.timeout.as_secs(),
    );

    for component in &config.components {
        let _ = write!(
            yaml,
            "  - name: {}\n    deploy: {}\n",
            component.name, component.deploy
        );
        if let Some(ref verify) = component.verify {
            let _ = writeln!(yaml, "    verify: {}", verify);
        }
        let _ = writeln!(yaml, "    undo: {}", component.undo);
    }

    yaml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_round_trips_through_parser() {
        let yaml = generate_template_yaml(&Config::template(DEFAULT_NAME).unwrap());
        let parsed = Config::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.name.as_str(), "my-platform");
        assert_eq!(parsed.components.len(), 2);
        assert_eq!(parsed.components.first().name.as_str(), "database");
    }

    #[test]
    fn invalid_name_is_rejected_without_writing() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let err = init_config(temp_dir.path(), Some("Payments!"), false).unwrap_err();

        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("Payments!")));
        assert!(!temp_dir.path().join(CONFIG_FILENAME).exists());
    }
}
