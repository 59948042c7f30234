// src/resolver.rs

//! Transitive closure of shared-object dependencies
//!
//! Resolves each declared dependency name against an ordered search
//! scope and walks the results until the closure is complete. Missing
//! names and malformed binaries never abort the walk; they are recorded
//! so the caller can surface them and decide what to do.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::PathBuf;

use tracing::debug;

use crate::inspect;

/// Conventional system library directories, consulted last
const SYSTEM_LIBRARY_DIRS: &[&str] = &[
    "/lib",
    "/lib64",
    "/lib/x86_64-linux-gnu",
    "/usr/lib",
    "/usr/lib64",
    "/usr/lib/x86_64-linux-gnu",
    "/usr/local/lib",
    "/usr/local/lib64",
];

/// Ordered set of directories used to resolve a soname to a path.
///
/// Lookup walks three tiers, first match wins: directories the binaries
/// themselves embed (`DT_RUNPATH`/`DT_RPATH`), then the caller-seeded
/// directories, then the conventional system directories. Within a tier
/// the first-inserted directory wins; re-inserting a directory is a
/// no-op.
#[derive(Debug, Clone)]
pub struct SearchScope {
    embedded: Vec<PathBuf>,
    seeded: Vec<PathBuf>,
    system: Vec<PathBuf>,
}

impl SearchScope {
    /// Create a scope from caller-seeded directories, with the default
    /// system directory list as the final fallback tier.
    pub fn new<I>(seeded: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut scope = Self {
            embedded: Vec::new(),
            seeded: Vec::new(),
            system: SYSTEM_LIBRARY_DIRS.iter().map(PathBuf::from).collect(),
        };
        for dir in seeded {
            scope.push_seeded(dir);
        }
        scope
    }

    /// Replace the system-directory fallback tier
    pub fn with_system_dirs<I>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.system.clear();
        for dir in dirs {
            if !self.system.contains(&dir) {
                self.system.push(dir);
            }
        }
        self
    }

    /// Append a binary-embedded directory (highest-priority tier)
    pub fn push_embedded(&mut self, dir: PathBuf) {
        if !self.embedded.contains(&dir) {
            self.embedded.push(dir);
        }
    }

    fn push_seeded(&mut self, dir: PathBuf) {
        if !self.seeded.contains(&dir) {
            self.seeded.push(dir);
        }
    }

    /// Resolve a declared name to the first matching file in scope order
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.embedded
            .iter()
            .chain(self.seeded.iter())
            .chain(self.system.iter())
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

/// A declared dependency name that no directory in scope satisfied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// The soname as declared
    pub name: String,
    /// The shared object that declared it
    pub needed_by: PathBuf,
}

/// Outcome of a closure computation
#[derive(Debug, Default)]
pub struct Resolution {
    /// Transitively required paths that were not explicitly requested
    pub dependencies: BTreeSet<PathBuf>,
    /// Requested paths that are also reachable as another requested
    /// object's dependency. Informational only; still deployed.
    pub duplicates: BTreeSet<PathBuf>,
    /// Names that resolved nowhere in the effective scope
    pub unresolved: Vec<Unresolved>,
    /// Binaries whose dynamic structure did not parse, treated as
    /// having zero dependencies
    pub malformed: Vec<(PathBuf, String)>,
}

/// Computes the transitive closure of shared-object dependencies
pub struct Resolver {
    scope: SearchScope,
}

impl Resolver {
    pub fn new(scope: SearchScope) -> Self {
        Self { scope }
    }

    /// Resolve the dependency closure for `requested`.
    ///
    /// The iteration order of `requested` affects only discovery order;
    /// the returned sets are identical for any ordering of the same
    /// paths. A path visited once is never re-resolved, so mutually
    /// dependent shared objects terminate.
    pub fn resolve(&mut self, requested: &[PathBuf]) -> Resolution {
        let mut visited: HashSet<PathBuf> = requested.iter().cloned().collect();
        let mut queue: VecDeque<PathBuf> = requested.iter().cloned().collect();
        let mut resolved = BTreeSet::new();
        let mut resolution = Resolution::default();

        while let Some(current) = queue.pop_front() {
            let linkage = match inspect::read_dependencies(&current) {
                Ok(linkage) => linkage,
                Err(err) => {
                    resolution.malformed.push((current, err.to_string()));
                    continue;
                }
            };

            // Directives declared by the binary itself outrank every
            // other tier for the rest of the walk.
            for dir in linkage.search_dirs {
                self.scope.push_embedded(dir);
            }

            for name in &linkage.needed {
                let Some(path) = self.scope.locate(name) else {
                    resolution.unresolved.push(Unresolved {
                        name: name.clone(),
                        needed_by: current.clone(),
                    });
                    continue;
                };
                debug!("{} -> {}", name, path.display());
                resolved.insert(path.clone());
                if visited.insert(path.clone()) {
                    queue.push_back(path);
                }
            }
        }

        // A resolved path the caller also requested explicitly was
        // redundant to ask for; report it apart but keep it deployable.
        let requested_set: HashSet<&PathBuf> = requested.iter().collect();
        for path in resolved {
            if requested_set.contains(&path) {
                resolution.duplicates.insert(path);
            } else {
                resolution.dependencies.insert(path);
            }
        }
        resolution
    }
}
