//! Configuration file support for symbolmap
//!
//! Loads `.symbolmap.toml` from current directory or parent directories.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use symbolmap_core::{AmbiguityFilter, StrategyKind};

const CONFIG_FILE: &str = ".symbolmap.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// File extensions to scan (default: php, inc)
    pub extensions: Vec<String>,
    /// Regex of file paths to leave out of the maps
    pub exclude: Option<String>,
    /// Directories that are never entered
    pub exclude_dirs: Vec<String>,
    pub strategy: Option<StrategyKind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "php"
    pub format: Option<String>,
    /// "default", "none", or a regex of paths hidden from the ambiguity report
    pub ambiguity_filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a run log to this file
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load config from `.symbolmap.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Extensions to scan, CLI values taking precedence
    pub fn effective_extensions(&self, cli_extensions: &[String]) -> Vec<String> {
        let extensions = if !cli_extensions.is_empty() {
            cli_extensions
        } else if !self.scan.extensions.is_empty() {
            &self.scan.extensions
        } else {
            return vec!["php".to_string(), "inc".to_string()];
        };

        extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect()
    }

    /// Compiled exclusion pattern, CLI value taking precedence
    pub fn effective_exclude(&self, cli_exclude: Option<&str>) -> Result<Option<Regex>> {
        cli_exclude
            .or(self.scan.exclude.as_deref())
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern '{}'", pattern))
            })
            .transpose()
    }

    /// Excluded directories from both sources, config first
    pub fn effective_exclude_dirs(&self, cli_dirs: &[String]) -> Vec<String> {
        let mut dirs = self.scan.exclude_dirs.clone();
        for dir in cli_dirs {
            if !dirs.contains(dir) {
                dirs.push(dir.clone());
            }
        }
        dirs
    }

    pub fn ambiguity_filter(&self) -> Result<AmbiguityFilter> {
        match self.output.ambiguity_filter.as_deref() {
            None | Some("default") => Ok(AmbiguityFilter::Default),
            Some("none") | Some("off") => Ok(AmbiguityFilter::Disabled),
            Some(pattern) => {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("Invalid ambiguity filter '{}'", pattern))?;
                Ok(AmbiguityFilter::Pattern(regex))
            }
        }
    }
}
