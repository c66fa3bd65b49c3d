// ABOUTME: Rollout lock to prevent concurrent rollouts of the same project.
// ABOUTME: Uses atomic file creation with lock info stored in <project>/.marshal/.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ComponentName;

/// Project-local directory for marshal state files.
pub const STATE_DIR: &str = ".marshal";

/// Age after which a leftover break marker is considered abandoned.
const BREAK_TIMEOUT: Duration = Duration::from_secs(60);

/// Information about who holds a rollout lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Rollout being run.
    pub rollout: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(rollout: &ComponentName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            rollout: rollout.to_string(),
        }
    }

    /// Check if this lock is stale (older than 1 hour).
    pub fn is_stale(&self) -> bool {
        let age = Utc::now() - self.started_at;
        age.num_hours() >= 1
    }

    /// Path to the lock file for a rollout.
    pub fn lock_path(project_dir: &Path, rollout: &ComponentName) -> PathBuf {
        project_dir
            .join(STATE_DIR)
            .join(format!("{}.lock", rollout))
    }
}

/// A held rollout lock. Released explicitly or on drop.
///
/// Only provides mutual exclusion; nothing about the rollout's progress is
/// written to disk.
#[derive(Debug)]
pub struct RolloutLock {
    path: PathBuf,
    released: bool,
}

impl RolloutLock {
    /// Acquire the lock for `rollout` in `project_dir`.
    ///
    /// Creation is atomic (staged, then hard-linked into place). An existing
    /// lock is broken when `force` is set, when it is older than an hour, or
    /// when its contents are unreadable; otherwise `Error::LockHeld` is
    /// returned. Breaking happens under a `.lock.break` marker so two
    /// processes racing on the same stale lock cannot both end up holding it.
    pub fn acquire(project_dir: &Path, rollout: &ComponentName, force: bool) -> Result<Self> {
        let path = LockInfo::lock_path(project_dir, rollout);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Lock(format!("failed to create state directory: {}", e)))?;
        }

        let info = LockInfo::new(rollout);
        let json = serde_json::to_string(&info)
            .map_err(|e| Error::Lock(format!("failed to serialize lock: {}", e)))?;

        if Self::try_create(&path, &json)? {
            return Ok(Self {
                path,
                released: false,
            });
        }

        if let Some(existing) = Self::check_existing_lock(&path, force) {
            return Err(Self::held(existing));
        }

        // Only one process may break a lock at a time. Another one may have
        // broken and re-taken it since the check above, so check again.
        let _breaker = BreakGuard::acquire(&path)?;
        if let Some(existing) = Self::check_existing_lock(&path, force) {
            return Err(Self::held(existing));
        }

        tracing::debug!("Removing stale/forced lock at {}", path.display());
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Lock(format!(
                    "failed to remove stale lock {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        if !Self::try_create(&path, &json)? {
            return Err(Error::Lock(
                "lock acquired by another process during break".to_string(),
            ));
        }

        Ok(Self {
            path,
            released: false,
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Lock(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn held(existing: LockInfo) -> Error {
        Error::LockHeld {
            holder: existing.holder,
            pid: existing.pid,
            started_at: existing.started_at,
        }
    }

    /// Returns Ok(false) if the file already exists.
    ///
    /// The contents are written to a private sibling first and then linked
    /// into place, so readers never observe a half-written lock.
    fn try_create(path: &Path, contents: &str) -> Result<bool> {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let staging = path.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging)
            .map_err(|e| Error::Lock(format!("failed to acquire lock: {}", e)))?;
        let written = file.write_all(contents.as_bytes()).and_then(|()| file.sync_all());
        drop(file);

        let linked = written.and_then(|()| std::fs::hard_link(&staging, path));
        let _ = std::fs::remove_file(&staging);

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(Error::Lock(format!("failed to acquire lock: {}", e))),
        }
    }

    /// Returns the holder if the existing lock is valid and must be respected.
    fn check_existing_lock(path: &Path, force: bool) -> Option<LockInfo> {
        let Ok(contents) = std::fs::read_to_string(path) else {
            tracing::warn!("Lock info unreadable, breaking lock");
            return None;
        };

        match serde_json::from_str::<LockInfo>(&contents) {
            Ok(existing) => {
                if force {
                    tracing::warn!(
                        "Breaking lock held by {} (pid {}) since {}",
                        existing.holder,
                        existing.pid,
                        existing.started_at
                    );
                    None
                } else if existing.is_stale() {
                    tracing::warn!(
                        "Auto-breaking stale lock held by {} (pid {}) since {}",
                        existing.holder,
                        existing.pid,
                        existing.started_at
                    );
                    None
                } else {
                    Some(existing)
                }
            }
            Err(_) => {
                tracing::warn!("Lock info corrupted, breaking lock");
                None
            }
        }
    }
}

/// Marker file held while a lock is being broken.
struct BreakGuard {
    path: PathBuf,
}

impl BreakGuard {
    fn acquire(lock_path: &Path) -> Result<Self> {
        let path = lock_path.with_extension("lock.break");

        if RolloutLock::try_create(&path, "")? {
            return Ok(Self { path });
        }

        // A breaker that crashed mid-break leaves its marker behind.
        let abandoned = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age >= BREAK_TIMEOUT);

        if abandoned {
            tracing::warn!("Removing abandoned break marker {}", path.display());
            let _ = std::fs::remove_file(&path);
            if RolloutLock::try_create(&path, "")? {
                return Ok(Self { path });
            }
        }

        Err(Error::Lock(format!(
            "lock is being broken by another process ({})",
            path.display()
        )))
    }
}

impl Drop for BreakGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Drop for RolloutLock {
    fn drop(&mut self) {
        if !self.released {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
