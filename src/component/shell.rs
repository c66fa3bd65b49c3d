// ABOUTME: Component implementation backed by shell commands.
// ABOUTME: Runs deploy, verify, and undo commands with a per-operation deadline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use snafu::ResultExt;
use tokio::process::Command;

use super::{Component, ComponentError, ExitSnafu, Phase, SpawnSnafu, TimeoutSnafu};
use crate::types::ComponentName;

pub const DEFAULT_SHELL: &str = "/bin/sh";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// A component whose operations are shell commands.
///
/// Each operation runs as `<shell> -c <command>` with the component's
/// environment plus `MARSHAL_COMPONENT` and `MARSHAL_PHASE`. A missing verify
/// command means verification always passes. Every operation is bounded by
/// the configured timeout; the child process is killed when it expires.
#[derive(Debug, Clone)]
pub struct ShellComponent {
    name: ComponentName,
    shell: String,
    deploy: String,
    verify: Option<String>,
    undo: String,
    workdir: Option<PathBuf>,
    env: HashMap<String, String>,
    timeout: Duration,
}

impl ShellComponent {
    pub fn builder(
        name: ComponentName,
        deploy: impl Into<String>,
        undo: impl Into<String>,
    ) -> ShellComponentBuilder {
        ShellComponentBuilder {
            inner: ShellComponent {
                name,
                shell: DEFAULT_SHELL.to_string(),
                deploy: deploy.into(),
                verify: None,
                undo: undo.into(),
                workdir: None,
                env: HashMap::new(),
                timeout: DEFAULT_TIMEOUT,
            },
        }
    }

    pub fn command(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::Deploy => Some(&self.deploy),
            Phase::Verify => self.verify.as_deref(),
            Phase::Undo => Some(&self.undo),
        }
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    async fn run(&self, phase: Phase) -> Result<(), ComponentError> {
        let Some(command) = self.command(phase) else {
            tracing::debug!("{}: no {} command configured", self.name, phase);
            return Ok(());
        };

        tracing::info!("{}: running {} command: {}", self.name, phase, command);

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .envs(&self.env)
            .env("MARSHAL_COMPONENT", self.name.as_str())
            .env("MARSHAL_PHASE", phase.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.workdir {
            cmd.current_dir(dir);
        }

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(result) => result.context(SpawnSnafu {
                component: self.name.clone(),
                phase,
            })?,
            Err(_) => {
                return TimeoutSnafu {
                    component: self.name.clone(),
                    phase,
                    after: self.timeout,
                }
                .fail();
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("{} {} stdout: {}", self.name, phase, stdout.trim());
        }

        if !output.status.success() {
            return ExitSnafu {
                component: self.name.clone(),
                phase,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .fail();
        }

        Ok(())
    }
}

#[async_trait]
impl Component for ShellComponent {
    fn name(&self) -> &ComponentName {
        &self.name
    }

    async fn deploy(&self) -> Result<(), ComponentError> {
        self.run(Phase::Deploy).await
    }

    async fn verify(&self) -> Result<(), ComponentError> {
        self.run(Phase::Verify).await
    }

    async fn undo(&self) -> Result<(), ComponentError> {
        self.run(Phase::Undo).await
    }
}

/// Builder for [`ShellComponent`].
#[derive(Debug, Clone)]
pub struct ShellComponentBuilder {
    inner: ShellComponent,
}

impl ShellComponentBuilder {
    pub fn verify(mut self, command: impl Into<String>) -> Self {
        self.inner.verify = Some(command.into());
        self
    }

    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        self.inner.shell = shell.into();
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.workdir = Some(dir.into());
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.inner.env = env;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner.timeout = timeout;
        self
    }

    pub fn build(self) -> ShellComponent {
        self.inner
    }
}
