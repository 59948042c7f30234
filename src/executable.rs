// src/executable.rs

//! Launch-target classification
//!
//! A bundle's launch targets are either native ELF binaries or
//! interpreted scripts opening with a shebang. The closed
//! [`ExecutableKind`] keeps the two shapes next to the launch fields
//! they share.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use goblin::elf::Elf;
use tracing::debug;
use walkdir::WalkDir;

use crate::inspect;

/// Variant-specific launch data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutableKind {
    /// Native ELF binary
    Binary {
        /// Machine tag from the ELF header (e.g. `X86_64`)
        arch: String,
    },
    /// Script launched through an interpreter
    Interpreted {
        /// Tokenized `#!` line
        shebang: Vec<String>,
    },
}

/// A launch target with its environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    pub path: PathBuf,
    /// Arguments forwarded at launch; `$@` forwards the caller's
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub kind: ExecutableKind,
}

impl Executable {
    /// Classify a single file.
    ///
    /// `None` when the file is neither a native binary nor a shebang
    /// script. Classification is fail-safe: unreadable or unparseable
    /// files are `None`, never an error.
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = if inspect::is_shared_object(path) {
            let bytes = std::fs::read(path).ok()?;
            match Elf::parse(&bytes) {
                Ok(elf) => ExecutableKind::Binary {
                    arch: goblin::elf::header::machine_to_str(elf.header.e_machine)
                        .to_string(),
                },
                Err(err) => {
                    debug!("{}: not classifiable: {}", path.display(), err);
                    return None;
                }
            }
        } else {
            ExecutableKind::Interpreted {
                shebang: read_shebang(path)?,
            }
        };

        Some(Self {
            path: path.to_path_buf(),
            args: vec!["$@".to_string()],
            env: BTreeMap::new(),
            kind,
        })
    }
}

/// Collect every recognized launch target under `root`
pub fn scan_executables(root: &Path) -> Vec<Executable> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| Executable::from_path(entry.path()))
        .collect()
}

/// Read and tokenize a `#!` line, if present
fn read_shebang(path: &Path) -> Option<Vec<String>> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);

    let mut head = [0u8; 2];
    reader.read_exact(&mut head).ok()?;
    if &head != b"#!" {
        return None;
    }

    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() { None } else { Some(tokens) }
}
