// src/commands.rs
//! Command handlers for the pomrewrite CLI

use crate::cli::TransformArgs;
use anyhow::{bail, Context, Result};
use pomrewrite::repository::JsonReport;
use pomrewrite::{
    Config, PlainTextReport, ReportWriter, Repository, RuleSet, TransformContext, TransformEngine,
    TransformOptions, TransformRequest,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Rewrite every listed manifest
///
/// A file that fails does not stop the batch; the command fails at the end
/// when any file did.
pub fn cmd_transform(args: TransformArgs) -> Result<()> {
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    if args.files.len() > 1 && (args.output.is_some() || args.properties.is_some()) {
        bail!("--output and --properties need a single input file");
    }

    let options = merge_options(config.transform, &args);
    let rules = args.rules.or(config.rules.rules);
    let ignore_rules = args.ignore_rules.or(config.rules.ignore_rules);
    let published_rules = args.published_rules.or(config.rules.published_rules);

    let mut ctx = TransformContext::load(
        rules.as_deref(),
        ignore_rules.as_deref(),
        published_rules.as_deref(),
    );

    let mut repo = args.repo.or(config.rules.repository).map(|root| {
        let mut repo = Repository::new(root);
        repo.scan();
        repo
    });

    let requests = build_requests(args.files, args.output, args.properties);
    let engine = TransformEngine::new(options);
    let results = engine.transform_all(&mut ctx, repo.as_mut(), &requests);

    let mut failed = 0;
    for (file, result) in &results {
        match result {
            Ok(outcome) => {
                if outcome.parent_missing {
                    println!("{}: transformed (parent not found)", file.display());
                } else {
                    println!("{}: transformed", file.display());
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", file.display(), e);
            }
        }
    }

    info!("{} of {} manifests transformed", results.len() - failed, results.len());
    if failed > 0 {
        bail!("{} manifest(s) failed to transform", failed);
    }
    Ok(())
}

/// Scan a repository and print its report
pub fn cmd_scan(dir: &Path, json: bool) -> Result<()> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }
    let mut repo = Repository::new(dir);
    repo.scan();
    let report = repo.report();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        JsonReport.write_report(&report, &mut out)?;
    } else {
        PlainTextReport.write_report(&report, &mut out)?;
    }
    Ok(())
}

/// Print a rule file in the order rules are tried, or save it sorted
pub fn cmd_rules(file: &Path, save: Option<&Path>) -> Result<()> {
    let rules = RuleSet::read(file).with_context(|| format!("Failed to load {}", file.display()))?;
    if let Some(target) = save {
        rules
            .save(target)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        info!("Saved {} rules to {}", rules.len(), target.display());
        return Ok(());
    }
    if rules.is_empty() {
        println!("No rules in {}", file.display());
        return Ok(());
    }
    rules.write_to(io::stdout().lock())?;
    Ok(())
}

/// Command-line switches override the configuration file
fn merge_options(mut options: TransformOptions, args: &TransformArgs) -> TransformOptions {
    if let Some(ref package) = args.package {
        options.package = Some(package.clone());
    }
    options.keep_pom_version |= args.keep_pom_version;
    options.no_parent |= args.no_parent;
    options.require_parent |= args.require_parent;
    options.debian_build |= args.debian_build;
    options.build_without_docs |= args.no_docs;
    options.keep_all_elements |= args.keep_all;
    for module in &args.ignored_modules {
        if !options.ignored_modules.contains(module) {
            options.ignored_modules.push(module.clone());
        }
    }
    options
}

fn build_requests(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    properties: Option<PathBuf>,
) -> Vec<TransformRequest> {
    files
        .into_iter()
        .map(|file| {
            let mut request = match output {
                Some(ref out) => TransformRequest::to(file, out),
                None => TransformRequest::in_place(file),
            };
            if let Some(ref props) = properties {
                request = request.with_properties(props);
            }
            request
        })
        .collect()
}
