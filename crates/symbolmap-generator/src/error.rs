//! Generator errors

use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a scan
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(
        "Could not scan for symbols inside \"{}\" which does not appear to be a file nor a folder",
        .0.display()
    )]
    InvalidPath(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("Got an empty path for {}", .0.display())]
    EmptyPath(PathBuf),

    #[error("realpath of {path} failed to resolve: {source}")]
    Realpath {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
