//! assgn-sanitizer: strip solution regions from programming assignments
//!
//! The library holds the sentinel grammar, the sanitizing state machine and the
//! file/directory driver. The binary is at src/main.rs.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_processor;
pub mod logger;
pub mod markers;
pub mod report_formatter;
pub mod sanitizer;

// Re-export commonly used types for convenience
pub use error::SanitizeError;
pub use file_processor::{FileOutcome, FileProcessor, FileReport, SanitizeReport, TextChange};
pub use markers::{Directive, LineKind, MarkerTable};
pub use sanitizer::{sanitize, sanitize_text, BlockError, Mode, Sanitized};
