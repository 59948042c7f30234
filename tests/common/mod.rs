// tests/common/mod.rs

//! Shared fixtures and helpers for integration tests.

// Not every test binary uses every helper.
#![allow(dead_code)]

pub mod elf;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use appstage::{Deployer, MemoryReporter};
use tempfile::TempDir;

/// A scratch host tree plus a bundle root.
///
/// Keep the TempDir alive to prevent cleanup.
pub struct Fixture {
    pub tmp: TempDir,
    pub host: PathBuf,
    pub bundle: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let host = tmp.path().join("host");
        let bundle = tmp.path().join("AppDir");
        fs::create_dir_all(&host).unwrap();
        Self { tmp, host, bundle }
    }

    /// Deployer over the fixture bundle with a collecting reporter
    pub fn deployer(&self) -> (Deployer, Arc<MemoryReporter>) {
        let reporter = Arc::new(MemoryReporter::new());
        let deployer = Deployer::new(&self.bundle)
            .unwrap()
            .with_reporter(reporter.clone());
        (deployer, reporter)
    }

    /// Write a file in the host tree, creating parents
    pub fn write_file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.host.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// Mirror of an absolute host path under the bundle root
    pub fn mirrored(&self, path: &Path) -> PathBuf {
        self.bundle.join(path.strip_prefix("/").unwrap())
    }

    /// Mirror of an absolute host path under the isolated libc prefix
    pub fn mirrored_libc(&self, path: &Path) -> PathBuf {
        self.bundle
            .join("opt/libc")
            .join(path.strip_prefix("/").unwrap())
    }

    /// Glob pattern rooted in the host tree
    pub fn pattern(&self, relative: &str) -> String {
        self.host.join(relative).to_string_lossy().into_owned()
    }

    /// Sorted relative listing of every file in the bundle
    pub fn bundle_listing(&self) -> Vec<PathBuf> {
        let mut listing: Vec<PathBuf> = walkdir::WalkDir::new(&self.bundle)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.bundle)
                    .unwrap()
                    .to_path_buf()
            })
            .collect();
        listing.sort();
        listing
    }
}
