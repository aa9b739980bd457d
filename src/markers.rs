//! Sentinel comment grammar
//!
//! Every supported source language has a line-comment token (`#`, `//`, ...).
//! A sentinel is a line that, after leading whitespace, starts with
//! `<marker> REPOBEE-SANITIZER-<KIND>`. Anything after the directive name is ignored.

use std::collections::BTreeMap;
use std::path::Path;

const SENTINEL_PREFIX: &str = "REPOBEE-SANITIZER-";

/// Built-in extension → comment token entries
const DEFAULT_MARKERS: &[(&str, &str)] = &[
    (".py", "#"),
    (".c", "//"),
    (".cpp", "//"),
    (".h", "//"),
    (".hpp", "//"),
    (".java", "//"),
    (".fs", "//"),
    (".yml", "#"),
    (".yaml", "#"),
];

/// A sanitizer directive recognized on a sentinel line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Discard the whole file
    Shred,
    /// Open a deletable region
    Start,
    /// Switch from the deleted region to the replacement region
    ReplaceWith,
    /// Close the current region
    End,
}

impl Directive {
    /// Checked most-specific first; none of the names is a prefix of another,
    /// but the order keeps classification unambiguous if one ever is.
    const ALL: [Directive; 4] = [
        Directive::Shred,
        Directive::End,
        Directive::ReplaceWith,
        Directive::Start,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Directive::Shred => "SHRED",
            Directive::Start => "START",
            Directive::ReplaceWith => "REPLACE-WITH",
            Directive::End => "END",
        }
    }
}

/// Result of classifying one raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Sentinel(Directive),
    Ordinary,
}

/// Classify a line against the sentinel grammar for `marker`
pub fn classify(marker: &str, line: &str) -> LineKind {
    let Some(rest) = line.trim_start().strip_prefix(marker) else {
        return LineKind::Ordinary;
    };
    let Some(rest) = rest.strip_prefix(' ') else {
        return LineKind::Ordinary;
    };
    let Some(name) = rest.strip_prefix(SENTINEL_PREFIX) else {
        return LineKind::Ordinary;
    };

    Directive::ALL
        .into_iter()
        .find(|directive| name.starts_with(directive.name()))
        .map_or(LineKind::Ordinary, LineKind::Sentinel)
}

/// Un-comment a replacement line.
///
/// Removes the first `<marker> `; falls back to the first bare `<marker>` so an
/// empty comment line becomes an empty line. Lines without the marker are kept as-is.
pub fn strip_marker(marker: &str, line: &str) -> String {
    let with_space = format!("{} ", marker);
    if let Some(idx) = line.find(&with_space) {
        return format!("{}{}", &line[..idx], &line[idx + with_space.len()..]);
    }
    if let Some(idx) = line.find(marker) {
        return format!("{}{}", &line[..idx], &line[idx + marker.len()..]);
    }
    line.to_string()
}

/// Immutable extension → comment token mapping
///
/// Built once at startup and handed to the processor by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    markers: BTreeMap<String, String>,
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS
                .iter()
                .map(|(ext, marker)| (ext.to_string(), marker.to_string()))
                .collect(),
        }
    }
}

impl MarkerTable {
    /// An empty table: every file is passed through untouched
    pub fn empty() -> Self {
        Self {
            markers: BTreeMap::new(),
        }
    }

    /// Built-in table with `overrides` added on top (later entries win)
    pub fn with_overrides<I, K, V>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (ext, marker) in overrides {
            table.markers.insert(ext.into(), marker.into());
        }
        table
    }

    /// Comment token for an extension such as `.py`
    pub fn marker_for_extension(&self, extension: &str) -> Option<&str> {
        self.markers.get(extension).map(String::as_str)
    }

    /// Comment token for a path, or `None` if its extension is unsupported
    pub fn marker_for_path(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?;
        self.marker_for_extension(&format!(".{}", ext))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.markers.iter().map(|(e, m)| (e.as_str(), m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_all_directives() {
        assert_eq!(classify("#", "# REPOBEE-SANITIZER-SHRED"), LineKind::Sentinel(Directive::Shred));
        assert_eq!(classify("#", "# REPOBEE-SANITIZER-START\n"), LineKind::Sentinel(Directive::Start));
        assert_eq!(
            classify("//", "// REPOBEE-SANITIZER-REPLACE-WITH\n"),
            LineKind::Sentinel(Directive::ReplaceWith)
        );
        assert_eq!(classify("//", "// REPOBEE-SANITIZER-END"), LineKind::Sentinel(Directive::End));
    }

    #[test]
    fn test_classify_allows_leading_whitespace() {
        assert_eq!(
            classify("//", "\t    // REPOBEE-SANITIZER-START\r\n"),
            LineKind::Sentinel(Directive::Start)
        );
    }

    #[test]
    fn test_classify_ignores_trailing_content() {
        assert_eq!(
            classify("#", "# REPOBEE-SANITIZER-END of the solution"),
            LineKind::Sentinel(Directive::End)
        );
    }

    #[test]
    fn test_classify_requires_single_space_after_marker() {
        assert_eq!(classify("#", "#REPOBEE-SANITIZER-START"), LineKind::Ordinary);
    }

    #[test]
    fn test_classify_requires_line_start() {
        assert_eq!(classify("#", "x = 1  # REPOBEE-SANITIZER-START"), LineKind::Ordinary);
        assert_eq!(classify("#", "print('# REPOBEE-SANITIZER-END')"), LineKind::Ordinary);
    }

    #[test]
    fn test_classify_wrong_marker() {
        assert_eq!(classify("//", "# REPOBEE-SANITIZER-START"), LineKind::Ordinary);
    }

    #[test]
    fn test_classify_unknown_directive() {
        assert_eq!(classify("#", "# REPOBEE-SANITIZER-BEGIN"), LineKind::Ordinary);
        assert_eq!(classify("#", "# REPOBEE-SANITIZER-"), LineKind::Ordinary);
    }

    #[test]
    fn test_strip_marker_keeps_indentation() {
        assert_eq!(strip_marker("#", "    # return 42\n"), "    return 42\n");
        assert_eq!(strip_marker("//", "// TODO: implement\n"), "TODO: implement\n");
    }

    #[test]
    fn test_strip_marker_first_occurrence_only() {
        assert_eq!(strip_marker("#", "# x = 1  # comment\n"), "x = 1  # comment\n");
    }

    #[test]
    fn test_strip_marker_bare_marker() {
        assert_eq!(strip_marker("#", "#\n"), "\n");
    }

    #[test]
    fn test_strip_marker_without_marker() {
        assert_eq!(strip_marker("#", "pass\n"), "pass\n");
    }

    #[test]
    fn test_default_table() {
        let table = MarkerTable::default();
        assert_eq!(table.marker_for_extension(".py"), Some("#"));
        assert_eq!(table.marker_for_extension(".java"), Some("//"));
        assert_eq!(table.marker_for_extension(".yml"), Some("#"));
        assert_eq!(table.marker_for_extension(".txt"), None);
    }

    #[test]
    fn test_marker_for_path() {
        let table = MarkerTable::default();
        assert_eq!(table.marker_for_path(Path::new("src/main.cpp")), Some("//"));
        assert_eq!(table.marker_for_path(Path::new("README")), None);
        assert_eq!(table.marker_for_path(Path::new("notes.md")), None);
        assert_eq!(table.marker_for_path(Path::new("Main.PY")), None);
    }

    #[test]
    fn test_with_overrides() {
        let table = MarkerTable::with_overrides([(".rs", "//"), (".py", ";")]);
        assert_eq!(table.marker_for_extension(".rs"), Some("//"));
        assert_eq!(table.marker_for_extension(".py"), Some(";"));
        assert_eq!(table.marker_for_extension(".c"), Some("//"));
    }
}
