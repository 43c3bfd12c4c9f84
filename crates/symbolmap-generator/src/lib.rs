//! symbolmap-generator: Class and function maps for PHP autoloading
//!
//! This crate provides:
//! - `SymbolMapGenerator`: Scans files, folds declarations into a class map
//!   and a function map in a deterministic order
//! - `FileList`: Duplicate-scan list shared across scans
//! - `discover()`: File discovery with extension and directory filters
//! - `normalize_path()` / `is_absolute_path()`: Comparable path strings
//! - `logging`: Optional run log

mod discovery;
mod error;
mod file_list;
mod generator;
pub mod logging;
mod path;

pub use discovery::discover;
pub use error::GeneratorError;
pub use file_list::FileList;
pub use generator::{ScanFailure, ScanInput, ScanReport, SymbolMapGenerator};
pub use path::{collapse_separators, is_absolute_path, normalize_path};
