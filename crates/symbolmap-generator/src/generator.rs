//! Class map and function map generation

use crate::discovery::{discover, has_extension};
use crate::error::GeneratorError;
use crate::file_list::FileList;
use crate::logging;
use crate::path::{collapse_separators, is_absolute_path, normalize_path};
use rayon::prelude::*;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use symbolmap_core::{ExtractError, StrategyKind, SymbolExtractionStrategy, SymbolMap};

/// What to scan
#[derive(Debug, Clone)]
pub enum ScanInput {
    /// A file, a directory or a glob pattern
    Path(PathBuf),
    /// An explicit list of files, used as is
    Files(Vec<PathBuf>),
}

impl From<&str> for ScanInput {
    fn from(path: &str) -> Self {
        ScanInput::Path(PathBuf::from(path))
    }
}

impl From<&Path> for ScanInput {
    fn from(path: &Path) -> Self {
        ScanInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ScanInput {
    fn from(path: PathBuf) -> Self {
        ScanInput::Path(path)
    }
}

impl From<Vec<PathBuf>> for ScanInput {
    fn from(files: Vec<PathBuf>) -> Self {
        ScanInput::Files(files)
    }
}

impl ScanInput {
    fn describe(&self) -> String {
        match self {
            ScanInput::Path(path) => path.display().to_string(),
            ScanInput::Files(files) => format!("{} file(s)", files.len()),
        }
    }
}

/// A file whose extraction failed and was left out of the maps
#[derive(Debug)]
pub struct ScanFailure {
    pub path: String,
    pub error: ExtractError,
}

/// Outcome of one `scan_paths` call
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files extracted and folded into the maps
    pub scanned: usize,
    /// Files skipped because the duplicate-scan list already held them
    pub duplicates: usize,
    /// Files skipped by the exclusion pattern
    pub excluded: usize,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A file that passed filtering and will be extracted
struct Planned {
    path: String,
}

/// Builds a class map and a function map from PHP files
pub struct SymbolMapGenerator {
    extensions: Vec<String>,
    strategy: Box<dyn SymbolExtractionStrategy>,
    scanned_files: Option<FileList>,
    class_map: SymbolMap,
    function_map: SymbolMap,
}

impl Default for SymbolMapGenerator {
    fn default() -> Self {
        Self::new(["php", "inc"])
    }
}

impl SymbolMapGenerator {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            strategy: StrategyKind::default().build(),
            scanned_files: None,
            class_map: SymbolMap::new(),
            function_map: SymbolMap::new(),
        }
    }

    /// Class map of a single path, scanned with the default settings
    pub fn create_map(path: impl Into<ScanInput>) -> Result<SymbolMap, GeneratorError> {
        let mut generator = Self::default();
        generator.scan_paths(path, None, &[])?;
        Ok(generator.class_map)
    }

    pub fn with_strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = kind.build();
        self
    }

    /// Skip files already scanned by this generator, or listed in `list`
    pub fn avoid_duplicate_scans(mut self, list: Option<FileList>) -> Self {
        self.scanned_files = Some(list.unwrap_or_default());
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn scanned_files(&self) -> Option<&FileList> {
        self.scanned_files.as_ref()
    }

    pub fn class_map(&self) -> &SymbolMap {
        &self.class_map
    }

    pub fn function_map(&self) -> &SymbolMap {
        &self.function_map
    }

    pub fn class_map_mut(&mut self) -> &mut SymbolMap {
        &mut self.class_map
    }

    pub fn function_map_mut(&mut self) -> &mut SymbolMap {
        &mut self.function_map
    }

    /// Consume the generator, returning the class map and the function map
    pub fn into_maps(self) -> (SymbolMap, SymbolMap) {
        (self.class_map, self.function_map)
    }

    /// Scan `input` and fold every declaration into the maps.
    ///
    /// Files are extracted in parallel but folded in enumeration order, so the
    /// canonical path of a symbol does not depend on thread scheduling. A file
    /// that fails to extract is reported and skipped.
    pub fn scan_paths(
        &mut self,
        input: impl Into<ScanInput>,
        excluded: Option<&Regex>,
        excluded_dirs: &[String],
    ) -> Result<ScanReport, GeneratorError> {
        let input = input.into();
        let candidates = match &input {
            ScanInput::Path(path) => discover(path, &self.extensions, excluded_dirs)?,
            ScanInput::Files(files) => files.clone(),
        };
        logging::scan_started(&input.describe(), self.strategy.name(), candidates.len());

        let cwd = current_dir()?;
        let mut report = ScanReport::default();
        let mut planned = Vec::with_capacity(candidates.len());

        for candidate in &candidates {
            if !has_extension(candidate, &self.extensions) {
                continue;
            }

            let file_path = absolute_path(&cwd, candidate);
            if file_path.is_empty() {
                return Err(GeneratorError::EmptyPath(candidate.clone()));
            }

            let real_path = fs::canonicalize(&file_path)
                .map(|p| p.to_string_lossy().into_owned())
                .map_err(|source| GeneratorError::Realpath {
                    path: file_path.clone(),
                    source,
                })?;

            if self
                .scanned_files
                .as_ref()
                .is_some_and(|list| list.contains(&real_path))
            {
                logging::file_skipped(&file_path, "already scanned");
                report.duplicates += 1;
                continue;
            }

            // the realpath resolves symlinks, the plain path catches symlinked directories
            if let Some(pattern) = excluded {
                if pattern.is_match(&real_path.replace('\\', "/"))
                    || pattern.is_match(&file_path.replace('\\', "/"))
                {
                    logging::file_skipped(&file_path, "excluded");
                    report.excluded += 1;
                    continue;
                }
            }

            if let Some(list) = self.scanned_files.as_mut() {
                list.add(real_path);
            }
            planned.push(Planned { path: file_path });
        }

        let strategy = self.strategy.as_ref();
        let results: Vec<_> = planned
            .par_iter()
            .map(|file| strategy.extract_file(Path::new(&file.path)))
            .collect();

        for (file, result) in planned.into_iter().zip(results) {
            match result {
                Ok(symbols) => {
                    let ambiguous = self.class_map.fold(symbols.class_like(), &file.path)
                        + self.function_map.fold(symbols.functions(), &file.path);
                    if ambiguous > 0 {
                        logging::ambiguity_found(&file.path, ambiguous);
                    }
                    report.scanned += 1;
                }
                Err(error) => {
                    logging::file_failed(&file.path, &error.to_string());
                    report.failures.push(ScanFailure {
                        path: file.path,
                        error,
                    });
                }
            }
        }

        logging::scan_finished(&report);
        Ok(report)
    }
}

fn current_dir() -> Result<String, GeneratorError> {
    let cwd = std::env::current_dir()
        .and_then(fs::canonicalize)
        .map_err(|source| GeneratorError::Io {
            path: PathBuf::from("."),
            source,
        })?;
    Ok(cwd.to_string_lossy().into_owned())
}

/// Comparable absolute form of a candidate path
fn absolute_path(cwd: &str, candidate: &Path) -> String {
    let path = candidate.to_string_lossy();
    if is_absolute_path(&path) {
        collapse_separators(&path)
    } else {
        normalize_path(&format!("{}/{}", cwd, path))
    }
}
