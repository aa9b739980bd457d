use crate::error::{Result, SanitizeError};
use crate::markers::MarkerTable;
use crate::sanitizer::{self, Sanitized};
use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// What happened to a single file
#[derive(Debug)]
pub enum FileOutcome {
    /// Sentinel regions were processed and the result written
    Sanitized { lines_removed: usize },
    /// The file had a SHRED directive or nothing left after sanitizing, and is absent from the output
    Shredded,
    /// Unsupported extension, copied byte for byte
    Copied,
    /// Sanitizing failed; the output copy (if any) was left untouched
    Failed(SanitizeError),
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::Failed(_))
    }
}

/// Original and sanitized text of a file, kept for previews
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub before: String,
    pub after: String,
}

#[derive(Debug)]
pub struct FileReport {
    /// Path relative to the input root (the file name in single-file mode)
    pub path: PathBuf,
    pub outcome: FileOutcome,
    /// Present when the processor was asked to keep text
    pub change: Option<TextChange>,
}

/// Per-file results of a run, in walk order
#[derive(Debug, Default)]
pub struct SanitizeReport {
    pub files: Vec<FileReport>,
}

impl SanitizeReport {
    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn sanitized(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Sanitized { .. }))
    }

    pub fn shredded(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Shredded))
    }

    pub fn copied(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Copied))
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.outcome.is_failure())
    }
}

/// Applies the sanitizer to files and directory trees
pub struct FileProcessor<'a> {
    markers: &'a MarkerTable,
    dry_run: bool,
    keep_text: bool,
}

impl<'a> FileProcessor<'a> {
    pub fn new(markers: &'a MarkerTable) -> Self {
        Self {
            markers,
            dry_run: false,
            keep_text: false,
        }
    }

    /// Compute outcomes without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Record before/after text of sanitized files in the report
    pub fn keep_text(mut self, keep_text: bool) -> Self {
        self.keep_text = keep_text;
        self
    }

    /// Sanitize a single file into `output`.
    ///
    /// A malformed file is returned as an error and `output` is not written.
    pub fn sanitize_file(&self, input: &Path, output: &Path) -> Result<FileReport> {
        if !input.exists() {
            return Err(SanitizeError::InputNotFound(input.to_path_buf()));
        }

        let name = input
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| input.to_path_buf());

        let (outcome, change) = self.process(input, output)?;
        Ok(FileReport {
            path: name,
            outcome,
            change,
        })
    }

    /// Sanitized bytes of `input`, for printing to stdout.
    ///
    /// Unsupported files come back verbatim; a shredded file yields nothing.
    pub fn render(&self, input: &Path) -> Result<Vec<u8>> {
        if !input.exists() {
            return Err(SanitizeError::InputNotFound(input.to_path_buf()));
        }

        let Some(marker) = self.markers.marker_for_path(input) else {
            return fs::read(input).map_err(|e| SanitizeError::io("Failed to read", input, e));
        };

        let content = read_text(input)?;
        let sanitized = sanitize_content(input, &content, marker)?;
        Ok(sanitized.to_text().into_bytes())
    }

    /// Sanitize every file under `input_dir` into a fresh `output_dir`.
    ///
    /// The tree is copied first and each file is then rewritten in place.
    /// Per-file failures are recorded in the report and leave that file's copy as-is.
    pub fn sanitize_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<SanitizeReport> {
        if !input_dir.exists() {
            return Err(SanitizeError::InputNotFound(input_dir.to_path_buf()));
        }
        if !input_dir.is_dir() {
            return Err(SanitizeError::NotADirectory(input_dir.to_path_buf()));
        }
        if output_dir.exists() {
            return Err(SanitizeError::OutputCollision(output_dir.to_path_buf()));
        }
        check_not_nested(input_dir, output_dir)?;

        let root = if self.dry_run {
            input_dir
        } else {
            copy_tree(input_dir, output_dir)?;
            output_dir
        };

        let mut report = SanitizeReport::default();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

            let (outcome, change) = match self.process(path, path) {
                Ok(result) => result,
                Err(err) if err.is_per_file() => {
                    warn!("{}", err);
                    (FileOutcome::Failed(err), None)
                }
                Err(err) => return Err(err),
            };

            report.files.push(FileReport {
                path: relative,
                outcome,
                change,
            });
        }

        info!(
            sanitized = report.sanitized(),
            shredded = report.shredded(),
            copied = report.copied(),
            failed = report.failures().count(),
            "Finished sanitizing {}",
            input_dir.display()
        );

        Ok(report)
    }

    /// Sanitize `input` into `output`; both may be the same path.
    fn process(&self, input: &Path, output: &Path) -> Result<(FileOutcome, Option<TextChange>)> {
        let in_place = input == output;

        let Some(marker) = self.markers.marker_for_path(input) else {
            debug!("Copying unsupported file {}", input.display());
            if !in_place && !self.dry_run {
                fs::copy(input, output).map_err(|e| SanitizeError::io("Failed to copy", input, e))?;
            }
            return Ok((FileOutcome::Copied, None));
        };

        let content = read_text(input)?;
        let sanitized = sanitize_content(input, &content, marker)?;

        let change = self.keep_text.then(|| TextChange {
            before: content.clone(),
            after: sanitized.to_text(),
        });

        match sanitized {
            // An empty result means the file has nothing left to hand out
            Sanitized::Lines(lines) if lines.is_empty() => {
                debug!("Removing {} (nothing left after sanitizing)", input.display());
                if !self.dry_run {
                    remove_if_present(output)?;
                }
                Ok((FileOutcome::Shredded, change))
            }
            Sanitized::Shred => {
                debug!("Shredding {}", input.display());
                if !self.dry_run {
                    remove_if_present(output)?;
                }
                Ok((FileOutcome::Shredded, change))
            }
            Sanitized::Lines(lines) => {
                let lines_removed = sanitizer::split_lines(&content).len().saturating_sub(lines.len());
                debug!("Sanitized {} ({} lines removed)", input.display(), lines_removed);
                if !self.dry_run {
                    let permissions = fs::metadata(input).ok().map(|m| m.permissions());
                    write_atomic(output, &lines.concat(), permissions)?;
                }
                Ok((FileOutcome::Sanitized { lines_removed }, change))
            }
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SanitizeError::io("Failed to read", path, e))
}

fn sanitize_content(path: &Path, content: &str, marker: &str) -> Result<Sanitized> {
    sanitizer::sanitize_text(content, Some(marker)).map_err(|err| SanitizeError::MalformedBlock {
        path: path.to_path_buf(),
        line: err.line,
        mode: err.mode,
    })
}

/// Replace `path` with `content` via a temp file in the same directory,
/// so a failure never leaves a partially written file behind.
fn write_atomic(path: &Path, content: &str, permissions: Option<Permissions>) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent_dir)
        .map_err(|e| SanitizeError::io("Failed to create temp file in", parent_dir, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| SanitizeError::io("Failed to write", path, e))?;

    if let Some(permissions) = permissions {
        temp_file
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| SanitizeError::io("Failed to set permissions on", path, e))?;
    }

    temp_file
        .persist(path)
        .map_err(|e| SanitizeError::io("Failed to write", path, e.error))?;

    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SanitizeError::io("Failed to delete", path, e)),
    }
}

/// Copy the whole tree, including files the sanitizer will not touch.
/// Symlinks to files are copied as regular files; other symlinks are skipped.
fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| SanitizeError::io("Failed to create directory", &target, e))?;
        } else if file_type.is_file() || entry.path().is_file() {
            fs::copy(entry.path(), &target)
                .map_err(|e| SanitizeError::io("Failed to copy", entry.path(), e))?;
        } else {
            debug!("Skipping {}", entry.path().display());
        }
    }
    Ok(())
}

/// Refuse an output directory located inside the input tree
fn check_not_nested(input_dir: &Path, output_dir: &Path) -> Result<()> {
    let input_abs = input_dir
        .canonicalize()
        .map_err(|e| SanitizeError::io("Failed to resolve", input_dir, e))?;

    if resolve_path(output_dir).starts_with(&input_abs) {
        return Err(SanitizeError::OutputInsideInput(output_dir.to_path_buf()));
    }
    Ok(())
}

/// Canonicalize the nearest existing ancestor of `path` and re-append the
/// components that do not exist yet.
fn resolve_path(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        if let Ok(mut resolved) = existing.canonicalize() {
            resolved.extend(missing.iter().rev());
            return resolved;
        }

        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}
