//! Run log for symbol map generation
//!
//! Disabled until [`open`] is called. Every scan event becomes one or more
//! timestamped lines, written under a single lock so that concurrent scans
//! never interleave inside one event.

use crate::generator::ScanReport;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use symbolmap_core::Divergence;

static RUN_LOG: Mutex<Option<RunLog>> = Mutex::new(None);

struct RunLog {
    file: File,
}

impl RunLog {
    fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self { file })
    }

    fn write_event(&mut self, lines: &[String]) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        for line in lines {
            let _ = writeln!(self.file, "[{}] {}", timestamp, line);
        }
        let _ = self.file.flush();
    }
}

/// Start logging to `path`, truncating it and replacing any open log
pub fn open(path: &Path) -> io::Result<()> {
    let log = RunLog::create(path)?;
    if let Ok(mut guard) = RUN_LOG.lock() {
        *guard = Some(log);
    }
    Ok(())
}

fn event(lines: &[String]) {
    if let Ok(mut guard) = RUN_LOG.lock() {
        if let Some(log) = guard.as_mut() {
            log.write_event(lines);
        }
    }
}

pub fn scan_started(input: &str, strategy: &str, candidates: usize) {
    event(&[format!(
        "SCAN {} with {} strategy, {} candidate file(s)",
        input, strategy, candidates
    )]);
}

pub fn file_skipped(path: &str, reason: &str) {
    event(&[format!("Skipped {} ({})", path, reason)]);
}

pub fn file_failed(path: &str, error: &str) {
    event(&[
        format!("FAILED to extract: {}", path),
        format!("  Error: {}", error),
    ]);
}

/// Symbols that gained a second path from `path`
pub fn ambiguity_found(path: &str, count: usize) {
    event(&[format!("{} ambiguous symbol(s) re-declared in {}", count, path)]);
}

pub fn scan_finished(report: &ScanReport) {
    event(&[summary_line(report)]);
}

pub fn strategies_disagree(path: &str, divergence: &Divergence) {
    event(&[format!("Strategies disagree on {}: {}", path, divergence)]);
}

fn summary_line(report: &ScanReport) -> String {
    format!(
        "DONE scanned {}, duplicates {}, excluded {}, failed {}",
        report.scanned,
        report.duplicates,
        report.excluded,
        report.failures.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_event_lines_share_a_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let mut log = RunLog::create(&path).unwrap();
        log.write_event(&["FAILED to extract: a.php".to_string(), "  Error: x".to_string()]);
        log.write_event(&["Skipped b.php (excluded)".to_string()]);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.starts_with('[')));
        assert_eq!(lines[0].split(']').next(), lines[1].split(']').next());
        assert!(lines[1].ends_with("]   Error: x"));
        assert!(lines[2].ends_with("] Skipped b.php (excluded)"));
    }

    #[test]
    fn test_summary_line() {
        let report = ScanReport {
            scanned: 4,
            duplicates: 1,
            excluded: 2,
            failures: Vec::new(),
        };
        assert_eq!(
            summary_line(&report),
            "DONE scanned 4, duplicates 1, excluded 2, failed 0"
        );
    }
}
