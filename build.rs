// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: bundle root directory
fn bundle_arg() -> Arg {
    Arg::new("bundle")
        .short('b')
        .long("bundle")
        .value_name("DIR")
        .default_value("AppDir")
        .help("Bundle (AppDir) root directory")
}

fn build_cli() -> Command {
    Command::new("appstage")
        .version(env!("CARGO_PKG_VERSION"))
        .author("AppStage Contributors")
        .about("Dependency-aware AppDir bundler for relocatable Linux applications")
        .subcommand_required(true)
        .subcommand(
            Command::new("deploy")
                .about("Deploy files and their native library dependencies into a bundle")
                .arg(bundle_arg())
                .arg(
                    Arg::new("patterns")
                        .required(true)
                        .num_args(1..)
                        .help("Path patterns to deploy (shell glob, ** supported)"),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about("Remove files matching the given patterns from both bundle roots")
                .arg(bundle_arg())
                .arg(
                    Arg::new("patterns")
                        .required(true)
                        .num_args(1..)
                        .help("Patterns to remove, relative to each bundle root"),
                ),
        )
        .subcommand(
            Command::new("executables")
                .about("List launch targets found inside a bundle")
                .arg(bundle_arg()),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("appstage.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
        return;
    }
}
