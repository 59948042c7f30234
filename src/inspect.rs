// src/inspect.rs

//! ELF shared-object inspection
//!
//! Cheap, header-only classification of candidate paths plus extraction
//! of the dynamic linking metadata the resolver needs: `DT_NEEDED`
//! entries and the library search directives (`DT_RUNPATH`/`DT_RPATH`)
//! a binary carries for its own dependencies.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use goblin::elf::Elf;
use tracing::debug;

use crate::error::{Error, Result};

/// Dynamic linking metadata extracted from a shared object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkage {
    /// `DT_NEEDED` names, in declaration order
    pub needed: Vec<String>,
    /// Search directories the binary declares for its own dependencies,
    /// in declaration order, with `$ORIGIN` already expanded
    pub search_dirs: Vec<PathBuf>,
}

/// Check whether a path carries the ELF magic signature.
///
/// Reads only the leading magic bytes. Any read failure — missing file,
/// permission denied, empty or short file, directory — classifies the
/// path as "not a shared object" rather than failing.
pub fn is_shared_object(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    match File::open(path).and_then(|mut file| file.read_exact(&mut magic)) {
        Ok(()) => magic[..] == goblin::elf::header::ELFMAG[..],
        Err(_) => false,
    }
}

/// Read the declared dependency names and embedded search directives.
///
/// Fails with [`Error::MalformedBinary`] when the signature matched but
/// the dynamic structure is truncated or inconsistent.
pub fn read_dependencies(path: &Path) -> Result<Linkage> {
    let bytes = std::fs::read(path)?;
    let elf =
        Elf::parse(&bytes).map_err(|e| Error::malformed(path, e.to_string()))?;

    let needed: Vec<String> = elf.libraries.iter().map(|name| name.to_string()).collect();

    // DT_RUNPATH supersedes DT_RPATH but binaries in the wild carry
    // either; both hold colon-separated directory lists.
    let mut search_dirs = Vec::new();
    for entry in elf.runpaths.iter().chain(elf.rpaths.iter()) {
        for dir in entry.split(':').filter(|dir| !dir.is_empty()) {
            search_dirs.push(expand_origin(dir, path));
        }
    }

    debug!(
        "{}: {} needed, {} embedded search dirs",
        path.display(),
        needed.len(),
        search_dirs.len()
    );

    Ok(Linkage {
        needed,
        search_dirs,
    })
}

/// Substitute `$ORIGIN` with the directory containing the binary
fn expand_origin(dir: &str, binary: &Path) -> PathBuf {
    let origin = binary.parent().unwrap_or_else(|| Path::new("/"));
    let origin = origin.to_string_lossy();
    PathBuf::from(dir.replace("${ORIGIN}", &origin).replace("$ORIGIN", &origin))
}
