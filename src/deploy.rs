// src/deploy.rs

//! Deployment engine
//!
//! Expands user-supplied path patterns, separates shared objects from
//! regular files, merges in the libraries the bundle already carries,
//! drives the dependency resolver, and mirrors each file's absolute
//! host path under the prefix the placement policy picks.
//!
//! Every operation is idempotent over the current bundle contents: a
//! path already rooted inside the bundle is never copied onto itself,
//! and a target placed by an earlier run is never copied again. The
//! engine keeps no state between calls, so rerun safety is a property
//! of the operations themselves.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use filetime::FileTime;
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::inspect;
use crate::policy::{DeployPrefix, PlacementPolicy};
use crate::reporter::{LogReporter, Reporter};
use crate::resolver::{Resolution, Resolver, SearchScope, Unresolved};

/// Depth cap for the bundled shared-object rescan. Symlinks are not
/// followed, so the walk cannot cycle; the cap bounds pathological
/// trees.
const MAX_SCAN_DEPTH: usize = 64;

/// Outcome of a [`Deployer::deploy`] call
#[derive(Debug, Default)]
pub struct DeploySummary {
    /// Source paths actually copied or created this run
    pub deployed: Vec<PathBuf>,
    /// Resolved transitive dependencies (duplicates excluded)
    pub dependencies: BTreeSet<PathBuf>,
    /// Requested shared objects that were also reachable as another
    /// requested object's dependency; deployed regardless
    pub duplicates: BTreeSet<PathBuf>,
    /// Dependency names that resolved nowhere
    pub unresolved: Vec<Unresolved>,
}

/// Dependency-aware bundle populator
pub struct Deployer {
    bundle_root: PathBuf,
    policy: PlacementPolicy,
    reporter: Arc<dyn Reporter>,
}

impl Deployer {
    /// Create a deployer for the given bundle root.
    ///
    /// The root is made absolute up front so "already inside the
    /// bundle" checks are exact; directories are created lazily as
    /// files are placed.
    pub fn new(bundle_root: impl AsRef<Path>) -> Result<Self> {
        let bundle_root = std::path::absolute(bundle_root.as_ref())?;
        Ok(Self {
            bundle_root,
            policy: PlacementPolicy::default(),
            reporter: Arc::new(LogReporter),
        })
    }

    /// Substitute the placement policy
    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Substitute the event sink
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn bundle_root(&self) -> &Path {
        &self.bundle_root
    }

    /// Deploy everything matching `patterns` plus the native libraries
    /// the matched binaries require.
    ///
    /// Shared objects already inside the bundle are merged into the
    /// request so their dependencies are re-verified and completed on
    /// rerun.
    pub fn deploy(&self, patterns: &[String]) -> Result<DeploySummary> {
        let expanded = self.expand_patterns(patterns)?;

        let bundled = self.find_bundled_shared_objects();
        let (discovered, regular): (BTreeSet<PathBuf>, BTreeSet<PathBuf>) = expanded
            .into_iter()
            .partition(|path| inspect::is_shared_object(path));

        let mut shared_objects = bundled;
        shared_objects.extend(discovered);

        let resolution = self.resolve_dependencies(&shared_objects);
        let mut summary = DeploySummary {
            dependencies: resolution.dependencies,
            duplicates: resolution.duplicates,
            unresolved: resolution.unresolved,
            ..Default::default()
        };

        for (path, reason) in &resolution.malformed {
            self.reporter.malformed(path, reason);
        }
        for miss in &summary.unresolved {
            self.reporter.unresolved(&miss.name, &miss.needed_by);
        }
        for path in &summary.duplicates {
            self.reporter.duplicate(path);
        }

        // Dependencies land first, then the requested shared objects,
        // then plain files. The order matters only for log clarity.
        for path in &summary.dependencies {
            if self.deploy_path(path)? {
                summary.deployed.push(path.clone());
            }
        }
        for path in &shared_objects {
            if self.deploy_path(path)? {
                summary.deployed.push(path.clone());
            }
        }
        for path in &regular {
            if self.deploy_path(path)? {
                summary.deployed.push(path.clone());
            }
        }

        Ok(summary)
    }

    /// Place a single path in the bundle, mirroring its absolute host
    /// path under the prefix the policy picks.
    ///
    /// Paths already rooted under the bundle are left alone, as are
    /// targets placed by an earlier run. Special files are skipped
    /// silently; unreadable sources are skipped with a warning. Only
    /// write-side failures are errors, and they carry the path that
    /// triggered them. Returns whether anything was written.
    pub fn deploy_path(&self, path: &Path) -> Result<bool> {
        if path.starts_with(&self.bundle_root) {
            self.reporter.skipped(path, "already inside the bundle");
            return Ok(false);
        }

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("cannot stat {}: {}", path.display(), err);
                self.reporter.skipped(path, "unreadable");
                return Ok(false);
            }
        };

        let target = self.target_for(path);

        if metadata.is_file() {
            if target.exists() {
                self.reporter.skipped(path, "already deployed");
                return Ok(false);
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| Error::Deploy {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            fs::copy(path, &target).map_err(|source| Error::Deploy {
                path: path.to_path_buf(),
                source,
            })?;
            // fs::copy carries the mode; timestamps need a second pass.
            let atime = FileTime::from_last_access_time(&metadata);
            let mtime = FileTime::from_last_modification_time(&metadata);
            filetime::set_file_times(&target, atime, mtime).map_err(|source| {
                Error::Deploy {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
            self.reporter.deployed(path, &target);
            Ok(true)
        } else if metadata.is_dir() {
            if target.is_dir() {
                self.reporter.skipped(path, "already deployed");
                return Ok(false);
            }
            fs::create_dir_all(&target).map_err(|source| Error::Deploy {
                path: path.to_path_buf(),
                source,
            })?;
            self.reporter.deployed(path, &target);
            Ok(true)
        } else {
            // Devices, sockets, pipes.
            self.reporter.skipped(path, "special file");
            Ok(false)
        }
    }

    /// Remove everything matching `patterns` under both bundle roots.
    ///
    /// Patterns are applied relative to each root; a pattern matching
    /// nothing in a given root is not an error. Returns the number of
    /// paths removed.
    pub fn clean(&self, patterns: &[String]) -> Result<usize> {
        let roots = [
            self.bundle_root.clone(),
            self.bundle_root.join(self.policy.libc_prefix()),
        ];

        let mut removed = 0;
        for root in &roots {
            for pattern in patterns {
                removed += self.clean_one(root, pattern)?;
            }
        }
        Ok(removed)
    }

    fn clean_one(&self, root: &Path, pattern: &str) -> Result<usize> {
        let full = root.join(pattern);
        let full = full.to_string_lossy();
        let matches = glob::glob(&full).map_err(|source| Error::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut removed = 0;
        for entry in matches {
            let Ok(path) = entry else { continue };
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => {
                    let shown = path.strip_prefix(&self.bundle_root).unwrap_or(&path);
                    self.reporter.removed(shown);
                    removed += 1;
                }
                // A match that vanished (removed with its parent, or
                // raced) is already in the desired state.
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(Error::Remove { path, source });
                }
            }
        }
        Ok(removed)
    }

    /// Expand every pattern into the set of concrete existing paths.
    /// Duplicate matches across patterns collapse.
    fn expand_patterns(&self, patterns: &[String]) -> Result<BTreeSet<PathBuf>> {
        let mut expanded = BTreeSet::new();
        for pattern in patterns {
            let matches = glob::glob(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            for entry in matches {
                match entry {
                    Ok(path) => match std::path::absolute(&path) {
                        Ok(path) => {
                            expanded.insert(path);
                        }
                        Err(err) => {
                            warn!("skipping {}: {}", path.display(), err);
                        }
                    },
                    // Unreadable directory mid-expansion: skip it and
                    // keep expanding the rest.
                    Err(err) => {
                        warn!("skipping unreadable match for '{}': {}", pattern, err);
                    }
                }
            }
        }
        Ok(expanded)
    }

    /// Recover shared objects placed by earlier runs so their
    /// dependencies are re-verified on rerun.
    fn find_bundled_shared_objects(&self) -> BTreeSet<PathBuf> {
        WalkDir::new(&self.bundle_root)
            .max_depth(MAX_SCAN_DEPTH)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| inspect::is_shared_object(path))
            .collect()
    }

    fn resolve_dependencies(&self, shared_objects: &BTreeSet<PathBuf>) -> Resolution {
        let seeded: BTreeSet<PathBuf> = shared_objects
            .iter()
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .collect();
        let requested: Vec<PathBuf> = shared_objects.iter().cloned().collect();

        let mut resolver = Resolver::new(SearchScope::new(seeded));
        resolver.resolve(&requested)
    }

    fn target_for(&self, path: &Path) -> PathBuf {
        let prefix = match self.policy.deploy_prefix(path) {
            DeployPrefix::Root => self.bundle_root.clone(),
            DeployPrefix::Libc => self.bundle_root.join(self.policy.libc_prefix()),
        };
        // Mirror the original absolute path verbatim under the prefix.
        let relative = path.strip_prefix("/").unwrap_or(path);
        prefix.join(relative)
    }
}
