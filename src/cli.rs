// src/cli.rs
//! CLI definitions for the appstage bundler
//!
//! This module contains the command-line interface definitions using
//! clap. The command implementations live in `main.rs`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "appstage")]
#[command(author = "AppStage Contributors")]
#[command(version)]
#[command(about = "Dependency-aware AppDir bundler for relocatable Linux applications", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Deploy files and their native library dependencies into a bundle
    Deploy {
        /// Bundle (AppDir) root directory
        #[arg(short, long, default_value = "AppDir")]
        bundle: String,

        /// Path patterns to deploy (shell glob, `**` supported)
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Remove files matching the given patterns from both bundle roots
    Clean {
        /// Bundle (AppDir) root directory
        #[arg(short, long, default_value = "AppDir")]
        bundle: String,

        /// Patterns to remove, relative to each bundle root
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// List launch targets found inside a bundle
    Executables {
        /// Bundle (AppDir) root directory
        #[arg(short, long, default_value = "AppDir")]
        bundle: String,
    },
}
