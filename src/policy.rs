// src/policy.rs

//! Placement policy for deployed files
//!
//! Two static pattern tables decide where a path lands inside the
//! bundle. The C runtime and loader family is isolated under the
//! `opt/libc` sub-prefix so a bundle can optionally prefer the host's
//! loader at run time. The graphics stack table only classifies; it
//! does not redirect placement in the base policy.

use std::path::Path;

use glob::Pattern;

use crate::error::{Error, Result};

/// Libraries and companion data of the C runtime and loader family
const LIBC_LISTING: &[&str] = &[
    // Loader and its configuration
    "**/ld-*.so",
    "**/ld-linux-x86-64.so*",
    "**/etc/ld.so.conf.d/*",
    // The runtime proper
    "**/libBrokenLocale-*.so",
    "**/libBrokenLocale.so*",
    "**/libSegFault.so",
    "**/libanl-*.so",
    "**/libanl.so*",
    "**/libc-*.so",
    "**/libc.so*",
    "**/libcrypt.so*",
    "**/libdl-*.so",
    "**/libdl.so*",
    "**/libgcc_s.so*",
    "**/libm-*.so",
    "**/libm.so*",
    "**/libmemusage.so*",
    "**/libmvec-*.so",
    "**/libmvec.so*",
    "**/libnsl-*.so",
    "**/libnsl.so*",
    "**/libnss_compat-*.so",
    "**/libnss_compat.so*",
    "**/libnss_dns-*.so",
    "**/libnss_dns.so*",
    "**/libnss_files-*.so",
    "**/libnss_files.so*",
    "**/libnss_hesiod-*.so",
    "**/libnss_hesiod.so*",
    "**/libnss_nis-*.so",
    "**/libnss_nis.so*",
    "**/libnss_nisplus-*.so",
    "**/libnss_nisplus.so*",
    "**/libpcprofile.so",
    "**/libpthread-*.so",
    "**/libpthread.so*",
    "**/libresolv-*.so",
    "**/libresolv.so*",
    "**/librt-*.so",
    "**/librt.so*",
    "**/libstdc++.so*",
    "**/libstdcxx/*",
    "**/libthread_db-*.so",
    "**/libthread_db.so*",
    "**/libutil-*.so",
    "**/libutil.so*",
    "**/libz.so*",
    // Locale conversion and audit companion data
    "**/gconv/*",
    "**/audit/*",
    // Distro doc companions of the family
    "**/doc/gcc-10-base/*",
    "**/doc/libc6/*",
    "**/doc/libcrypt1/*",
    "**/doc/libgcc-s1/*",
    "**/doc/libstdc++6/*",
    "**/doc/zlib1g/*",
];

/// The graphics and display stack. Classification only.
const GRAPHICS_LISTING: &[&str] = &[
    "**/libEGL.so*",
    "**/libGL.so*",
    "**/libGLX_mesa.so*",
    "**/libX11-xcb.so*",
    "**/libX11.so",
    "**/libdrm.so*",
    "**/libdrm_*",
    "**/libxcb-glx.so*",
    "**/libxcb-render.so*",
    "**/libxcb-shape.so*",
    "**/libxcb-shm.so*",
    "**/libxcb-xfixes.so*",
    "**/libxcb.so*",
];

/// Sub-prefix that receives the C runtime family
const LIBC_PREFIX: &str = "opt/libc";

/// Which root a deployed path is mirrored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPrefix {
    /// The bundle root
    Root,
    /// The isolated `opt/libc` sub-prefix
    Libc,
}

/// Immutable pattern tables driving placement decisions.
///
/// The tables are injectable configuration data so callers and tests
/// can substitute their own sets; [`Default`] ships the built-in
/// listings.
#[derive(Debug, Clone)]
pub struct PlacementPolicy {
    libc: Vec<Pattern>,
    graphics: Vec<Pattern>,
}

impl PlacementPolicy {
    /// Build a policy from explicit pattern tables
    pub fn new(libc: &[&str], graphics: &[&str]) -> Result<Self> {
        Ok(Self {
            libc: compile(libc)?,
            graphics: compile(graphics)?,
        })
    }

    /// Decide which prefix a path deploys under.
    ///
    /// Matched against the path as given — the original absolute host
    /// path, never an already-rewritten bundle path.
    pub fn deploy_prefix(&self, path: &Path) -> DeployPrefix {
        if matches_any(&self.libc, path) {
            DeployPrefix::Libc
        } else {
            DeployPrefix::Root
        }
    }

    /// Whether the path belongs to the graphics/display stack
    pub fn is_graphics_library(&self, path: &Path) -> bool {
        matches_any(&self.graphics, path)
    }

    /// Relative location of the isolated C-runtime prefix
    pub fn libc_prefix(&self) -> &Path {
        Path::new(LIBC_PREFIX)
    }
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self::new(LIBC_LISTING, GRAPHICS_LISTING)
            .expect("built-in placement listings are valid patterns")
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pat| {
            Pattern::new(pat).map_err(|source| Error::Pattern {
                pattern: (*pat).to_string(),
                source,
            })
        })
        .collect()
}

// Default match options let `*` cross `/`, mirroring fnmatch-style
// matching of whole path strings.
fn matches_any(patterns: &[Pattern], path: &Path) -> bool {
    let path = path.to_string_lossy();
    patterns.iter().any(|pattern| pattern.matches(&path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn libc_family_is_isolated() {
        let policy = PlacementPolicy::default();
        for path in [
            "/lib/x86_64-linux-gnu/libc.so.6",
            "/lib/x86_64-linux-gnu/ld-linux-x86-64.so.2",
            "/usr/lib/x86_64-linux-gnu/gconv/UTF-16.so",
            "/usr/lib/x86_64-linux-gnu/audit/sotruss-lib.so",
            "/etc/ld.so.conf.d/x86_64-linux-gnu.conf",
            "/usr/lib/libstdc++.so.6.0.28",
        ] {
            assert_eq!(
                policy.deploy_prefix(Path::new(path)),
                DeployPrefix::Libc,
                "{path} should land in the isolated prefix"
            );
        }
    }

    #[test]
    fn everything_else_lands_at_the_root() {
        let policy = PlacementPolicy::default();
        for path in [
            "/usr/lib/x86_64-linux-gnu/libpng16.so.16",
            "/usr/bin/app",
            "/usr/share/icons/app.png",
            // graphics stack is classified but not redirected
            "/usr/lib/x86_64-linux-gnu/libGL.so.1",
        ] {
            assert_eq!(policy.deploy_prefix(Path::new(path)), DeployPrefix::Root);
        }
    }

    #[test]
    fn graphics_stack_is_classified() {
        let policy = PlacementPolicy::default();
        assert!(policy.is_graphics_library(Path::new(
            "/usr/lib/x86_64-linux-gnu/libGL.so.1.7.0"
        )));
        assert!(policy.is_graphics_library(Path::new(
            "/usr/lib/x86_64-linux-gnu/libdrm_amdgpu.so.1"
        )));
        assert!(!policy.is_graphics_library(Path::new(
            "/lib/x86_64-linux-gnu/libc.so.6"
        )));
    }

    #[test]
    fn tables_are_injectable() {
        let policy = PlacementPolicy::new(&["**/libfoo.so*"], &[]).unwrap();
        assert_eq!(
            policy.deploy_prefix(Path::new("/usr/lib/libfoo.so.1")),
            DeployPrefix::Libc
        );
        assert_eq!(
            policy.deploy_prefix(Path::new("/lib/x86_64-linux-gnu/libc.so.6")),
            DeployPrefix::Root
        );
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = PlacementPolicy::new(&["[unclosed"], &[]).unwrap_err();
        assert!(matches!(err, Error::Pattern { .. }));
    }
}
