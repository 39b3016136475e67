// src/cli.rs
//! CLI definitions for pomrewrite
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! - `transform` - Rewrite manifests according to rule files
//! - `scan` - Resolve a manifest repository and report what is missing
//! - `rules` - List or save a rule file in the order rules are tried

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pomrewrite")]
#[command(author = "pomrewrite Contributors")]
#[command(version)]
#[command(about = "Rewrite library manifests to follow packaging conventions", long_about = None)]
pub struct Cli {
    /// Enable debug logging when RUST_LOG is not set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rewrite one or more manifests
    Transform(TransformArgs),

    /// Scan a manifest repository and print its report
    Scan {
        /// Repository root directory
        dir: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the rules of a rule file, most specific first
    Rules {
        /// Rule file
        file: PathBuf,

        /// Write the sorted rules to this file instead of printing them
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct TransformArgs {
    /// Manifests to transform
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Configuration file
    #[arg(short, long, default_value = pomrewrite::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Rule file
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Ignore rule file; matching entries are removed
    #[arg(short, long)]
    pub ignore_rules: Option<PathBuf>,

    /// Published rule file, recorded in every rewritten manifest
    #[arg(long)]
    pub published_rules: Option<PathBuf>,

    /// Local manifest repository used for parents and plugin versions
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Target package name
    #[arg(short, long)]
    pub package: Option<String>,

    /// Keep the manifest's own version as written
    #[arg(long)]
    pub keep_pom_version: bool,

    /// Remove the parent reference
    #[arg(long)]
    pub no_parent: bool,

    /// Fail when the parent is not in the repository
    #[arg(long)]
    pub require_parent: bool,

    /// Transform for the package build, keeping test dependencies
    #[arg(long)]
    pub debian_build: bool,

    /// Remove reporting sections
    #[arg(long)]
    pub no_docs: bool,

    /// Keep every section and entry
    #[arg(long)]
    pub keep_all: bool,

    /// Module path to remove from <modules> (repeatable)
    #[arg(long = "ignore-module", value_name = "PATH")]
    pub ignored_modules: Vec<String>,

    /// Write the result here instead of replacing the input (single file only)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a companion properties file (single file only)
    #[arg(long)]
    pub properties: Option<PathBuf>,
}
