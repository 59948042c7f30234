// src/main.rs

use anyhow::Result;
use appstage::{Deployer, ExecutableKind, scan_executables};
use clap::Parser;
use tracing::info;

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy { bundle, patterns } => {
            info!("Deploying into bundle: {}", bundle);
            let deployer = Deployer::new(&bundle)?;
            let summary = deployer.deploy(&patterns)?;
            println!(
                "Deployed {} path(s) ({} dependencies, {} duplicates, {} unresolved)",
                summary.deployed.len(),
                summary.dependencies.len(),
                summary.duplicates.len(),
                summary.unresolved.len()
            );
            Ok(())
        }
        Commands::Clean { bundle, patterns } => {
            info!("Cleaning bundle: {}", bundle);
            let deployer = Deployer::new(&bundle)?;
            let removed = deployer.clean(&patterns)?;
            println!("Removed {} path(s)", removed);
            Ok(())
        }
        Commands::Executables { bundle } => {
            let root = std::path::absolute(&bundle)?;
            for exe in scan_executables(&root) {
                match &exe.kind {
                    ExecutableKind::Binary { arch } => {
                        println!("{}\t[{}]", exe.path.display(), arch);
                    }
                    ExecutableKind::Interpreted { shebang } => {
                        println!("{}\t[{}]", exe.path.display(), shebang.join(" "));
                    }
                }
            }
            Ok(())
        }
    }
}
