//! Output formatting for symbolmap
//!
//! Supports text, JSON and PHP (`return array(...)`) output formats.

use anyhow::Result;
use colored::*;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use symbolmap_core::{Divergence, SymbolMap};
use symbolmap_generator::ScanReport;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Php,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "php" => Some(OutputFormat::Php),
            _ => None,
        }
    }
}

/// A file left out of the maps
#[derive(Debug, Clone, Serialize)]
pub struct FailureInfo {
    pub path: String,
    pub offset: Option<usize>,
    pub message: String,
}

/// A file on which the two extraction strategies disagree
#[derive(Debug, Clone, Serialize)]
pub struct DivergenceInfo {
    pub path: String,
    pub kind: String,
    pub text_scan: Vec<String>,
    pub token_stream: Vec<String>,
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_scanned: usize,
    pub duplicates: usize,
    pub excluded: usize,
    pub failures: usize,
    pub symbols: usize,
    pub ambiguous: usize,
    pub divergences: usize,
}

/// Ambiguous ledger serialized as a name to paths object, in ledger order
struct AmbiguousEntries<'a>(&'a [(String, Vec<String>)]);

impl Serialize for AmbiguousEntries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, paths) in self.0 {
            map.serialize_entry(name, paths)?;
        }
        map.end()
    }
}

/// Full JSON output structure
#[derive(Serialize)]
struct JsonOutput<'a> {
    version: &'static str,
    summary: &'a Summary,
    map: &'a SymbolMap,
    ambiguous: AmbiguousEntries<'a>,
    #[serde(skip_serializing_if = "is_empty")]
    failures: &'a [FailureInfo],
    #[serde(skip_serializing_if = "is_empty")]
    divergences: &'a [DivergenceInfo],
}

fn is_empty<T>(items: &&[T]) -> bool {
    items.is_empty()
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    failures: Vec<FailureInfo>,
    divergences: Vec<DivergenceInfo>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            failures: Vec::new(),
            divergences: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Account for one `scan_paths` call
    pub fn report_scan(&mut self, input: &str, report: &ScanReport) {
        self.summary.files_scanned += report.scanned;
        self.summary.duplicates += report.duplicates;
        self.summary.excluded += report.excluded;
        self.summary.failures += report.failures.len();

        if self.verbose && self.format == OutputFormat::Text {
            eprintln!(
                "{}: {} file(s) from {}",
                "Scanned".bold(),
                report.scanned,
                input
            );
        }

        for failure in &report.failures {
            eprintln!(
                "{}: {} - {}",
                "Warning".yellow(),
                failure.path,
                failure.error
            );
            self.failures.push(FailureInfo {
                path: failure.path.clone(),
                offset: failure.error.offset(),
                message: failure.error.to_string(),
            });
        }
    }

    pub fn report_divergence(&mut self, path: &str, divergence: &Divergence) {
        self.summary.divergences += 1;
        eprintln!("{}: {} - {}", "Mismatch".red(), path, divergence);
        self.divergences.push(DivergenceInfo {
            path: path.to_string(),
            kind: divergence.kind.to_string(),
            text_scan: divergence.text_scan.clone(),
            token_stream: divergence.token_stream.clone(),
        });
    }

    /// Print the map, or the ambiguous ledger when `ambiguous_only` is set.
    ///
    /// Only the map goes to stdout; warnings and the summary go to stderr.
    pub fn finish(
        mut self,
        map: &SymbolMap,
        ambiguous: &[(String, Vec<String>)],
        ambiguous_only: bool,
    ) -> Result<Summary> {
        self.summary.symbols = map.count();
        self.summary.ambiguous = ambiguous.len();

        match self.format {
            OutputFormat::Text => {
                if ambiguous_only {
                    print!("{}", render_ambiguous_text(ambiguous));
                } else {
                    print!("{}", render_map_text(map));
                    for (name, paths) in ambiguous {
                        eprintln!("{}: {}", "Warning".yellow(), ambiguity_warning(name, map, paths));
                    }
                }

                if self.verbose {
                    eprintln!();
                    eprintln!("{}", "Summary".bold().underline());
                    eprintln!("  Files scanned: {}", self.summary.files_scanned);
                    eprintln!("  Symbols: {}", self.summary.symbols);
                    eprintln!("  Ambiguous: {}", self.summary.ambiguous);
                    if self.summary.duplicates > 0 {
                        eprintln!("  Duplicate scans avoided: {}", self.summary.duplicates);
                    }
                    if self.summary.excluded > 0 {
                        eprintln!("  Excluded: {}", self.summary.excluded);
                    }
                    if self.summary.failures > 0 {
                        eprintln!("  Failures: {}", self.summary.failures);
                    }
                    if self.summary.divergences > 0 {
                        eprintln!("  Divergences: {}", self.summary.divergences);
                    }
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    render_json(map, ambiguous, &self.summary, &self.failures, &self.divergences)?
                );
            }
            OutputFormat::Php => {
                if ambiguous_only {
                    print!("{}", render_ambiguous_php(ambiguous));
                } else {
                    print!("{}", render_map_php(map));
                }
            }
        }

        Ok(self.summary)
    }
}

/// One `name => path` line per entry
pub fn render_map_text(map: &SymbolMap) -> String {
    let mut out = String::new();
    for (name, path) in map.iter() {
        out.push_str(name);
        out.push_str(" => ");
        out.push_str(path);
        out.push('\n');
    }
    out
}

/// Each ambiguous name followed by its extra paths, indented
pub fn render_ambiguous_text(ambiguous: &[(String, Vec<String>)]) -> String {
    let mut out = String::new();
    for (name, paths) in ambiguous {
        out.push_str(name);
        out.push('\n');
        for path in paths {
            out.push_str("    ");
            out.push_str(path);
            out.push('\n');
        }
    }
    out
}

fn ambiguity_warning(name: &str, map: &SymbolMap, paths: &[String]) -> String {
    let canonical = map.get_symbol_path(name).unwrap_or_default();
    format!(
        "Ambiguous class resolution, \"{}\" was found in both \"{}\" and \"{}\", the first will be used.",
        name,
        canonical,
        paths.join("\", \"")
    )
}

pub fn render_json(
    map: &SymbolMap,
    ambiguous: &[(String, Vec<String>)],
    summary: &Summary,
    failures: &[FailureInfo],
    divergences: &[DivergenceInfo],
) -> Result<String> {
    let output = JsonOutput {
        version: env!("CARGO_PKG_VERSION"),
        summary,
        map,
        ambiguous: AmbiguousEntries(ambiguous),
        failures,
        divergences,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Map as a PHP file returning an array, in the layout of a Composer classmap
pub fn render_map_php(map: &SymbolMap) -> String {
    let mut out = String::from("<?php\n\nreturn array(\n");
    for (name, path) in map.iter() {
        out.push_str(&format!("    {} => {},\n", php_string(name), php_string(path)));
    }
    out.push_str(");\n");
    out
}

pub fn render_ambiguous_php(ambiguous: &[(String, Vec<String>)]) -> String {
    let mut out = String::from("<?php\n\nreturn array(\n");
    for (name, paths) in ambiguous {
        out.push_str(&format!("    {} => array(\n", php_string(name)));
        for path in paths {
            out.push_str(&format!("        {},\n", php_string(path)));
        }
        out.push_str("    ),\n");
    }
    out.push_str(");\n");
    out
}

/// Single-quoted PHP string literal
pub fn php_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> SymbolMap {
        let mut map = SymbolMap::new();
        map.add_symbol("App\\Model\\User", "/app/src/Model/User.php");
        map.add_symbol("Legacy", "/app/lib/it's.php");
        map
    }

    fn sample_ambiguous() -> Vec<(String, Vec<String>)> {
        vec![(
            "Legacy".to_string(),
            vec!["/app/old/Legacy.php".to_string(), "/app/older/Legacy.php".to_string()],
        )]
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("Php"), Some(OutputFormat::Php));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_php_string_escaping() {
        assert_eq!(php_string("Foo\\Bar"), "'Foo\\\\Bar'");
        assert_eq!(php_string("it's"), "'it\\'s'");
        assert_eq!(php_string(""), "''");
    }

    #[test]
    fn test_render_map_text() {
        assert_eq!(
            render_map_text(&sample_map()),
            "App\\Model\\User => /app/src/Model/User.php\nLegacy => /app/lib/it's.php\n"
        );
    }

    #[test]
    fn test_render_map_php() {
        let expected = "<?php\n\nreturn array(\n    'App\\\\Model\\\\User' => '/app/src/Model/User.php',\n    'Legacy' => '/app/lib/it\\'s.php',\n);\n";
        assert_eq!(render_map_php(&sample_map()), expected);
        assert_eq!(render_map_php(&SymbolMap::new()), "<?php\n\nreturn array(\n);\n");
    }

    #[test]
    fn test_render_ambiguous() {
        assert_eq!(
            render_ambiguous_text(&sample_ambiguous()),
            "Legacy\n    /app/old/Legacy.php\n    /app/older/Legacy.php\n"
        );
        assert_eq!(
            render_ambiguous_php(&sample_ambiguous()),
            "<?php\n\nreturn array(\n    'Legacy' => array(\n        '/app/old/Legacy.php',\n        '/app/older/Legacy.php',\n    ),\n);\n"
        );
    }

    #[test]
    fn test_ambiguity_warning_names_both_paths() {
        let warning = ambiguity_warning("Legacy", &sample_map(), &sample_ambiguous()[0].1);
        assert!(warning.contains("\"Legacy\""));
        assert!(warning.contains("\"/app/lib/it's.php\" and \"/app/old/Legacy.php\", \"/app/older/Legacy.php\""));
    }

    #[test]
    fn test_json_serialization() {
        let summary = Summary {
            files_scanned: 2,
            symbols: 2,
            ambiguous: 1,
            ..Default::default()
        };
        let json = render_json(&sample_map(), &sample_ambiguous(), &summary, &[], &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["files_scanned"], 2);
        assert_eq!(value["map"]["App\\Model\\User"], "/app/src/Model/User.php");
        assert_eq!(value["ambiguous"]["Legacy"][1], "/app/older/Legacy.php");
        assert!(value.get("failures").is_none());
        assert!(value.get("divergences").is_none());
    }

    #[test]
    fn test_json_includes_failures() {
        let failures = vec![FailureInfo {
            path: "/app/Broken.php".to_string(),
            offset: Some(19),
            message: "unterminated body".to_string(),
        }];
        let json = render_json(&SymbolMap::new(), &[], &Summary::default(), &failures, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["failures"][0]["offset"], 19);
        assert!(value["map"].as_object().unwrap().is_empty());
    }
}
