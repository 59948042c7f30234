// src/reporter.rs

//! Deployment event sinks
//!
//! The engine reports everything it does through a [`Reporter`] so
//! callers pick between human-readable logging and programmatic
//! inspection, and tests assert on collected events instead of log
//! text.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info, warn};

/// Sink for deployment progress and diagnostics.
///
/// Implementations must be thread-safe: inspection and placement are
/// independent per path and may be driven from multiple threads.
pub trait Reporter: Send + Sync {
    /// A file or directory was placed in the bundle
    fn deployed(&self, source: &Path, target: &Path);

    /// A requested shared object is also reachable as another requested
    /// object's dependency and could have been omitted from the request
    fn duplicate(&self, path: &Path);

    /// A declared dependency name was not found anywhere in scope
    fn unresolved(&self, name: &str, needed_by: &Path);

    /// A binary carried the ELF signature but its structure did not
    /// parse; it contributes zero dependencies
    fn malformed(&self, path: &Path, reason: &str);

    /// A path matched a clean pattern and was removed
    fn removed(&self, path: &Path);

    /// A path was left alone (already bundled, already placed, special
    /// file, or unreadable)
    fn skipped(&self, path: &Path, reason: &str);
}

/// Logs every event through `tracing`
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn deployed(&self, source: &Path, target: &Path) {
        info!("deploying {} -> {}", source.display(), target.display());
    }

    fn duplicate(&self, path: &Path) {
        info!(
            "{} is required by another shared object and can be safely omitted",
            path.display()
        );
    }

    fn unresolved(&self, name: &str, needed_by: &Path) {
        warn!(
            "could not resolve '{}' required by {}",
            name,
            needed_by.display()
        );
    }

    fn malformed(&self, path: &Path, reason: &str) {
        warn!("malformed binary {}: {}", path.display(), reason);
    }

    fn removed(&self, path: &Path) {
        info!("removed {}", path.display());
    }

    fn skipped(&self, path: &Path, reason: &str) {
        debug!("skipping {}: {}", path.display(), reason);
    }
}

/// Discards every event
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn deployed(&self, _source: &Path, _target: &Path) {}
    fn duplicate(&self, _path: &Path) {}
    fn unresolved(&self, _name: &str, _needed_by: &Path) {}
    fn malformed(&self, _path: &Path, _reason: &str) {}
    fn removed(&self, _path: &Path) {}
    fn skipped(&self, _path: &Path, _reason: &str) {}
}

/// An event recorded by [`MemoryReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    Deployed { source: PathBuf, target: PathBuf },
    Duplicate(PathBuf),
    Unresolved { name: String, needed_by: PathBuf },
    Malformed { path: PathBuf, reason: String },
    Removed(PathBuf),
    Skipped { path: PathBuf, reason: String },
}

/// Collects events in memory for later inspection
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<DeployEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events collected so far
    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().expect("reporter mutex poisoned").clone()
    }

    fn push(&self, event: DeployEvent) {
        self.events.lock().expect("reporter mutex poisoned").push(event);
    }
}

impl Reporter for MemoryReporter {
    fn deployed(&self, source: &Path, target: &Path) {
        self.push(DeployEvent::Deployed {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
        });
    }

    fn duplicate(&self, path: &Path) {
        self.push(DeployEvent::Duplicate(path.to_path_buf()));
    }

    fn unresolved(&self, name: &str, needed_by: &Path) {
        self.push(DeployEvent::Unresolved {
            name: name.to_string(),
            needed_by: needed_by.to_path_buf(),
        });
    }

    fn malformed(&self, path: &Path, reason: &str) {
        self.push(DeployEvent::Malformed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    fn removed(&self, path: &Path) {
        self.push(DeployEvent::Removed(path.to_path_buf()));
    }

    fn skipped(&self, path: &Path, reason: &str) {
        self.push(DeployEvent::Skipped {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }
}
