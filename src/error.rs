//! Error types for sanitizer runs.
//!
//! Per-file failures (`MalformedBlock`, `Io`) are collected in directory mode;
//! path-level precondition failures abort the whole run before anything is copied.

use crate::sanitizer::Mode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SanitizeError {
    /// A START or REPLACE-WITH region was never closed by END.
    #[error("{}: file ended after {line} lines inside {mode} with no REPOBEE-SANITIZER-END", .path.display())]
    MalformedBlock { path: PathBuf, line: usize, mode: Mode },

    #[error("Input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Output directory already exists: {}", .0.display())]
    OutputCollision(PathBuf),

    #[error("Input is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Output directory {} is inside the input directory", .0.display())]
    OutputInsideInput(PathBuf),

    #[error("Sanitizing a directory requires an output path (-o/--output)")]
    OutputRequired,

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SanitizeError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SanitizeError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// True for errors confined to a single file, which directory mode reports and skips
    pub fn is_per_file(&self) -> bool {
        matches!(self, SanitizeError::MalformedBlock { .. } | SanitizeError::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, SanitizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_block_message_names_file() {
        let err = SanitizeError::MalformedBlock {
            path: PathBuf::from("hw1/solution.py"),
            line: 12,
            mode: Mode::InSanitizer,
        };
        let msg = err.to_string();
        assert!(msg.contains("hw1/solution.py"));
        assert!(msg.contains("12 lines"));
        assert!(msg.contains("REPOBEE-SANITIZER-START"));
        assert!(err.is_per_file());
    }

    #[test]
    fn io_error_message_includes_action_and_path() {
        let err = SanitizeError::io(
            "Failed to read",
            "a/b.c",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Failed to read a/b.c: denied");
        assert!(err.is_per_file());
    }

    #[test]
    fn precondition_errors_are_not_per_file() {
        assert!(!SanitizeError::InputNotFound(PathBuf::from("x")).is_per_file());
        assert!(!SanitizeError::OutputCollision(PathBuf::from("x")).is_per_file());
        assert!(!SanitizeError::OutputRequired.is_per_file());
    }
}
