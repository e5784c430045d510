//! usagegraph CLI - usage, unused-code and change-impact analysis for
//! object-oriented codebases.
//!
//! Features:
//! - Reads evidence streams (JSON Lines) from files or directories
//! - Scans markup templates for expression-language bindings
//! - Reports unused classes, methods and imports
//! - Impact radius for individual classes and methods
//! - Exports the full report as JSON

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use usagegraph_core::{
    build_report, gather_evidence_files, gather_markup_files, init_compact_logging,
    init_structured_logging, load_config, load_config_file, load_evidence_files, log_error,
    log_event, log_info, log_warn, print_json, print_plain, render_impact, scan_markup_files,
    write_report, AnalysisSession, ImpactSummary, UsageGraphConfig, DEFAULT_MARKUP_DIR,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Usage and change-impact analyzer for object-oriented code")]
pub struct Cli {
    /// Evidence files (.jsonl/.ndjson) or directories containing them
    #[arg(default_value = ".")]
    inputs: Vec<PathBuf>,

    /// Project root (for usagegraph.toml and relative markup dirs)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Explicit configuration file (overrides <root>/usagegraph.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Template directories to scan for bindings (default: src/main/webapp)
    #[arg(long = "markup-dir", value_name = "DIR")]
    markup_dirs: Vec<PathBuf>,

    /// Template extensions to scan (default: xhtml)
    #[arg(long = "markup-ext", value_name = "EXT")]
    markup_exts: Vec<String>,

    /// Skip template scanning entirely
    #[arg(long)]
    no_markup: bool,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Write the JSON report to a file (or into a directory as code-data.json)
    #[arg(long, value_name = "FILE")]
    output: Option<String>,

    /// Only list classes under this package prefix in plain output
    #[arg(long)]
    package_prefix: Option<String>,

    /// Show the impact radius of a class instead of the full report
    #[arg(long, value_name = "CLASS")]
    impact: Vec<String>,

    /// Show the impact radius of a method (`class.method`)
    #[arg(long, value_name = "CLASS.METHOD")]
    method_impact: Vec<String>,

    /// Human-readable logs instead of JSON
    #[arg(long)]
    compact_logs: bool,
}

/// Validates output file paths.
///
/// Rejects absolute paths, `..` components and null bytes.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    if p
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    Ok(p)
}

fn load_settings(cli: &Cli) -> Result<UsageGraphConfig> {
    let config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => load_config(&cli.root)?.unwrap_or_default(),
    };
    Ok(config)
}

/// Evidence files from every input, sorted and deduplicated.
fn collect_evidence_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let found = gather_evidence_files(input)
            .with_context(|| format!("Failed to read evidence input: {}", input.display()))?;
        files.extend(found);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Template directories: CLI flags win over configuration, which wins over
/// `<root>/src/main/webapp`.
///
/// The flag is false for the conventional fallback.
fn markup_dirs(cli: &Cli, config: &UsageGraphConfig) -> (Vec<PathBuf>, bool) {
    if !cli.markup_dirs.is_empty() {
        return (cli.markup_dirs.clone(), true);
    }
    let configured = config.markup_dirs(&cli.root);
    if configured.is_empty() {
        (vec![cli.root.join(DEFAULT_MARKUP_DIR)], false)
    } else {
        (configured, true)
    }
}

/// Loads evidence and templates into a fresh session.
fn analyze(cli: &Cli, config: &UsageGraphConfig) -> Result<AnalysisSession> {
    let mut session = AnalysisSession::with_vocabulary(config.vocabulary());

    let evidence_files = collect_evidence_files(&cli.inputs)?;
    if evidence_files.is_empty() {
        log_warn("no evidence files found");
    }
    let events = load_evidence_files(&evidence_files).context("Failed to load evidence")?;
    session.apply_all(events);

    // Templates bind to classes, so they go after the class evidence
    if !cli.no_markup {
        let extensions = if cli.markup_exts.is_empty() {
            config.markup_extensions()
        } else {
            cli.markup_exts.clone()
        };

        let (dirs, explicit) = markup_dirs(cli, config);
        for dir in dirs {
            if !dir.is_dir() {
                if explicit {
                    log_warn(&format!("markup directory not found: {}", dir.display()));
                }
                continue;
            }
            let files = match gather_markup_files(&dir, &extensions) {
                Ok(files) => files,
                Err(e) => {
                    log_error(&format!("skipping markup directory {}: {:#}", dir.display(), e));
                    continue;
                }
            };
            let events = scan_markup_files(&files, session.vocabulary());
            session.apply_all(events);
        }
    }

    let stats = session.stats();
    log_info(&format!(
        "applied {} events from {} files ({} fallback references, {} unresolved calls, {} unmatched beans)",
        stats.events,
        evidence_files.len(),
        stats.fallback_references,
        stats.unresolved_calls,
        stats.unmatched_beans
    ));

    Ok(session)
}

fn print_impacts(summaries: &[ImpactSummary], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summaries)?);
    } else {
        for summary in summaries {
            print!("{}", render_impact(summary));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] usagegraph internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    let cli = Cli::parse();

    if cli.compact_logs {
        init_compact_logging();
    } else {
        init_structured_logging();
    }

    let config = load_settings(&cli)?;
    let json = cli.json || config.wants_json();
    let session = analyze(&cli, &config)?;

    if !cli.impact.is_empty() || !cli.method_impact.is_empty() {
        let summaries: Vec<ImpactSummary> = cli
            .impact
            .iter()
            .map(|class| session.class_impact_summary(class))
            .chain(
                cli.method_impact
                    .iter()
                    .map(|method| session.method_impact_summary(method)),
            )
            .collect();
        return print_impacts(&summaries, json);
    }

    let report = build_report(&session);

    if let Some(output) = &cli.output {
        let target = validate_output_path(output)?;
        let written = write_report(&report, &target)
            .with_context(|| format!("Failed to write report to {}", target.display()))?;
        log_event("REPORT_WRITTEN", &written.display().to_string());
        eprintln!("Report written to {}", written.display());
        return Ok(());
    }

    if json {
        print_json(&report);
    } else {
        let prefix = cli
            .package_prefix
            .as_deref()
            .or_else(|| config.package_prefix());
        print_plain(&report, prefix);
    }

    Ok(())
}
