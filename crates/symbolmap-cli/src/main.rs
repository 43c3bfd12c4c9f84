//! symbolmap CLI - PHP class map and function map generator
//!
//! Scans files, directories or glob patterns and prints every namespace-scope
//! class, interface, trait, enum or function with the file declaring it.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::Config;
use output::{OutputFormat, Reporter};
use symbolmap_core::{cross_check, AmbiguityFilter, StrategyKind};
use symbolmap_generator::{discover, logging, SymbolMapGenerator};

#[derive(Parser)]
#[command(name = "symbolmap")]
#[command(version = "0.1.0")]
#[command(about = "Generate PHP class and function maps")]
struct Cli {
    /// Files, directories or glob patterns to scan
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Extraction strategy: text, tokens
    #[arg(long, value_name = "STRATEGY")]
    strategy: Option<String>,

    /// Regex of file paths to leave out of the maps
    #[arg(long, value_name = "REGEX")]
    exclude: Option<String>,

    /// Directory never entered while scanning (can be specified multiple times)
    #[arg(long, value_name = "DIR")]
    exclude_dir: Vec<String>,

    /// File extension to scan (can be specified multiple times)
    #[arg(long, value_name = "EXT")]
    extension: Vec<String>,

    /// Output format: text, json, php
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Print the function map instead of the class map
    #[arg(long)]
    functions: bool,

    /// Print only the symbols found in more than one file
    #[arg(long)]
    ambiguous: bool,

    /// Report ambiguous paths under test, fixture, example and stub directories too
    #[arg(long)]
    no_ambiguity_filter: bool,

    /// Run both strategies on every file and report disagreements
    #[arg(long)]
    cross_check: bool,

    /// Path to config file (default: auto-detect .symbolmap.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// Write a run log to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if cli.verbose {
            eprintln!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if cli.verbose {
                    eprintln!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    // Determine output format: CLI > config > text
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::from_str(format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, php",
                format
            )
        })?
    };

    let strategy = match &cli.strategy {
        Some(name) => name.parse::<StrategyKind>().map_err(anyhow::Error::msg)?,
        None => config.scan.strategy.unwrap_or_default(),
    };
    let extensions = config.effective_extensions(&cli.extension);
    let excluded = config.effective_exclude(cli.exclude.as_deref())?;
    let excluded_dirs = config.effective_exclude_dirs(&cli.exclude_dir);
    let filter = if cli.no_ambiguity_filter {
        AmbiguityFilter::Disabled
    } else {
        config.ambiguity_filter()?
    };

    if let Some(log_path) = cli.log_file.as_ref().or(config.logging.file.as_ref()) {
        logging::open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        if cli.verbose {
            eprintln!("{}: {}", "Logging to".bold(), log_path.display());
        }
    }

    let mut generator = SymbolMapGenerator::new(extensions.iter().cloned())
        .with_strategy(strategy)
        .avoid_duplicate_scans(None);
    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &cli.paths {
        let report = generator
            .scan_paths(path.as_path(), excluded.as_ref(), &excluded_dirs)
            .with_context(|| format!("Failed to scan {}", path.display()))?;
        reporter.report_scan(&path.display().to_string(), &report);
    }

    if cli.cross_check {
        for path in &cli.paths {
            cross_check_path(path, &extensions, excluded.as_ref(), &excluded_dirs, &mut reporter)?;
        }
    }

    let (class_map, function_map) = generator.into_maps();
    let mut map = if cli.functions { function_map } else { class_map };
    let ambiguous = map.get_ambiguous_symbols(&filter);
    map.sort();

    let summary = reporter.finish(&map, &ambiguous, cli.ambiguous)?;

    if summary.failures > 0 || summary.divergences > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Compare both strategies on every file under `path`
fn cross_check_path(
    path: &Path,
    extensions: &[String],
    excluded: Option<&Regex>,
    excluded_dirs: &[String],
    reporter: &mut Reporter,
) -> Result<()> {
    let files = discover(path, extensions, excluded_dirs)
        .with_context(|| format!("Failed to list {}", path.display()))?;

    for file in files {
        let display = file.display().to_string();
        if excluded.is_some_and(|regex| regex.is_match(&display.replace('\\', "/"))) {
            continue;
        }

        let source =
            std::fs::read(&file).with_context(|| format!("Failed to read {}", display))?;
        // extraction failures were already reported by the scan
        if let Ok(Some(divergence)) = cross_check(&source) {
            logging::strategies_disagree(&display, &divergence);
            reporter.report_divergence(&display, &divergence);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "symbolmap",
            "src",
            "lib",
            "--strategy",
            "tokens",
            "--exclude-dir",
            "vendor",
            "--exclude-dir",
            "tests",
            "--extension",
            "php",
            "--functions",
            "--no-config",
        ])
        .unwrap();

        assert_eq!(cli.paths, vec![PathBuf::from("src"), PathBuf::from("lib")]);
        assert_eq!(cli.strategy.as_deref(), Some("tokens"));
        assert_eq!(cli.exclude_dir, vec!["vendor", "tests"]);
        assert_eq!(cli.extension, vec!["php"]);
        assert!(cli.functions);
        assert!(cli.no_config);
        assert!(!cli.ambiguous);
    }

    #[test]
    fn test_cli_requires_a_path() {
        assert!(Cli::try_parse_from(["symbolmap"]).is_err());
    }

    #[test]
    fn test_json_conflicts_with_format() {
        assert!(Cli::try_parse_from(["symbolmap", "src", "--json", "--format", "php"]).is_err());
    }

    #[test]
    fn test_cross_check_path_reports_nothing_for_agreeing_strategies() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("A.php"),
            "<?php namespace App; class A {} function a() {}",
        )
        .unwrap();

        let mut reporter = Reporter::new(OutputFormat::Json, false);
        cross_check_path(dir.path(), &["php".to_string()], None, &[], &mut reporter).unwrap();
        let summary = reporter
            .finish(&symbolmap_core::SymbolMap::new(), &[], false)
            .unwrap();
        assert_eq!(summary.divergences, 0);
    }
}
