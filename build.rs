// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Boolean switch
fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

/// Option taking a file path
fn path_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).value_name("PATH").help(help)
}

fn build_cli() -> Command {
    Command::new("pomrewrite")
        .version(env!("CARGO_PKG_VERSION"))
        .author("pomrewrite Contributors")
        .about("Rewrite library manifests to follow packaging conventions")
        .arg(flag("verbose", "Enable debug logging when RUST_LOG is not set").short('v'))
        .subcommand(
            Command::new("transform")
                .about("Rewrite one or more manifests")
                .arg(
                    Arg::new("files")
                        .required(true)
                        .num_args(1..)
                        .help("Manifests to transform"),
                )
                .arg(path_arg("config", "Configuration file").default_value("pomrewrite.toml"))
                .arg(path_arg("rules", "Rule file"))
                .arg(path_arg("ignore-rules", "Ignore rule file; matching entries are removed"))
                .arg(path_arg("published-rules", "Published rule file"))
                .arg(path_arg("repo", "Local manifest repository"))
                .arg(Arg::new("package").long("package").help("Target package name"))
                .arg(flag("keep-pom-version", "Keep the manifest's own version as written"))
                .arg(flag("no-parent", "Remove the parent reference"))
                .arg(flag("require-parent", "Fail when the parent is not in the repository"))
                .arg(flag("debian-build", "Transform for the package build"))
                .arg(flag("no-docs", "Remove reporting sections"))
                .arg(flag("keep-all", "Keep every section and entry"))
                .arg(
                    Arg::new("ignore-module")
                        .long("ignore-module")
                        .action(ArgAction::Append)
                        .help("Module path to remove from <modules>"),
                )
                .arg(path_arg("output", "Write the result here instead of replacing the input"))
                .arg(path_arg("properties", "Write a companion properties file")),
        )
        .subcommand(
            Command::new("scan")
                .about("Scan a manifest repository and print its report")
                .arg(Arg::new("dir").required(true).help("Repository root directory"))
                .arg(flag("json", "Print the report as JSON")),
        )
        .subcommand(
            Command::new("rules")
                .about("List the rules of a rule file, most specific first")
                .arg(Arg::new("file").required(true).help("Rule file"))
                .arg(path_arg("save", "Write the sorted rules to this file instead of printing them")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

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

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = manifest_dir.join("man").join("pomrewrite.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
