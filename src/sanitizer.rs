//! Line-oriented sanitizing state machine
//!
//! A single pass over a file's lines. The transition table is a pure function
//! of (mode, line kind), so it can be tested without touching the filesystem.

use crate::markers::{classify, strip_marker, Directive, LineKind};
use std::fmt;

/// Where the scanner currently is relative to sanitizer regions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Passthrough,
    /// Between START and REPLACE-WITH/END
    InSanitizer,
    /// Between REPLACE-WITH and END
    InReplace,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Passthrough => "passthrough",
            Mode::InSanitizer => "REPOBEE-SANITIZER-START",
            Mode::InReplace => "REPOBEE-SANITIZER-REPLACE-WITH",
        };
        f.write_str(name)
    }
}

/// What happens to the current line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Append the line unchanged
    Keep,
    /// Append the line with its comment marker removed
    Uncomment,
    /// Drop the line
    Discard,
    /// Drop the whole file
    Shred,
}

/// One entry of the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub next: Mode,
    pub action: Action,
}

const fn step(next: Mode, action: Action) -> Step {
    Step { next, action }
}

/// Transition table: mode × line kind → next mode and line action
pub fn transition(mode: Mode, kind: LineKind) -> Step {
    use Action::*;
    use Mode::*;

    match (mode, kind) {
        (_, LineKind::Sentinel(Directive::Shred)) => step(mode, Shred),

        (Passthrough, LineKind::Sentinel(Directive::Start)) => step(InSanitizer, Discard),
        (Passthrough, _) => step(Passthrough, Keep),

        (InSanitizer, LineKind::Sentinel(Directive::End)) => step(Passthrough, Discard),
        (InSanitizer, LineKind::Sentinel(Directive::ReplaceWith)) => step(InReplace, Discard),
        // A nested START is just more solution text
        (InSanitizer, _) => step(InSanitizer, Discard),

        (InReplace, LineKind::Sentinel(Directive::End)) => step(Passthrough, Discard),
        (InReplace, _) => step(InReplace, Uncomment),
    }
}

/// Output of sanitizing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sanitized {
    /// Lines to write, terminators included
    Lines(Vec<String>),
    /// The file carried a SHRED directive and must not appear in the output
    Shred,
}

impl Sanitized {
    pub fn is_shred(&self) -> bool {
        matches!(self, Sanitized::Shred)
    }

    /// True when nothing of the file survives; such a file is deleted from the output
    pub fn is_empty(&self) -> bool {
        match self {
            Sanitized::Lines(lines) => lines.is_empty(),
            Sanitized::Shred => true,
        }
    }

    /// Concatenated output text; empty for a shredded file
    pub fn to_text(&self) -> String {
        match self {
            Sanitized::Lines(lines) => lines.concat(),
            Sanitized::Shred => String::new(),
        }
    }
}

/// A file ended inside an open region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockError {
    /// Number of lines consumed before the end of input
    pub line: usize,
    /// The region that was left open
    pub mode: Mode,
}

/// Split text into lines, keeping each line's terminator
///
/// Joining the result reproduces the input exactly, including `\r\n` and a
/// missing trailing newline.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Run the state machine over `lines`.
///
/// With no marker the extension is unsupported and the lines come back untouched.
pub fn sanitize<S: AsRef<str>>(lines: &[S], marker: Option<&str>) -> Result<Sanitized, BlockError> {
    let Some(marker) = marker else {
        return Ok(Sanitized::Lines(
            lines.iter().map(|l| l.as_ref().to_string()).collect(),
        ));
    };

    let mut mode = Mode::Passthrough;
    let mut output = Vec::with_capacity(lines.len());

    for line in lines {
        let line = line.as_ref();
        let Step { next, action } = transition(mode, classify(marker, line));
        match action {
            Action::Keep => output.push(line.to_string()),
            Action::Uncomment => output.push(strip_marker(marker, line)),
            Action::Discard => {}
            Action::Shred => return Ok(Sanitized::Shred),
        }
        mode = next;
    }

    match mode {
        Mode::Passthrough => Ok(Sanitized::Lines(output)),
        open => Err(BlockError {
            line: lines.len(),
            mode: open,
        }),
    }
}

/// Convenience wrapper over [`sanitize`] for whole-file text
pub fn sanitize_text(content: &str, marker: Option<&str>) -> Result<Sanitized, BlockError> {
    sanitize(&split_lines(content), marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "# REPOBEE-SANITIZER-START\n";
    const REPLACE: &str = "# REPOBEE-SANITIZER-REPLACE-WITH\n";
    const END: &str = "# REPOBEE-SANITIZER-END\n";
    const SHRED: &str = "# REPOBEE-SANITIZER-SHRED\n";

    fn run(input: &str) -> Result<Sanitized, BlockError> {
        sanitize_text(input, Some("#"))
    }

    fn text(input: &str) -> String {
        run(input).unwrap().to_text()
    }

    #[test]
    fn test_transition_table() {
        use Action::*;
        use Mode::*;

        let start = LineKind::Sentinel(Directive::Start);
        let replace = LineKind::Sentinel(Directive::ReplaceWith);
        let end = LineKind::Sentinel(Directive::End);
        let shred = LineKind::Sentinel(Directive::Shred);
        let plain = LineKind::Ordinary;

        let table = [
            (Passthrough, plain, Passthrough, Keep),
            (Passthrough, start, InSanitizer, Discard),
            (Passthrough, replace, Passthrough, Keep),
            (Passthrough, end, Passthrough, Keep),
            (Passthrough, shred, Passthrough, Shred),
            (InSanitizer, plain, InSanitizer, Discard),
            (InSanitizer, start, InSanitizer, Discard),
            (InSanitizer, replace, InReplace, Discard),
            (InSanitizer, end, Passthrough, Discard),
            (InSanitizer, shred, InSanitizer, Shred),
            (InReplace, plain, InReplace, Uncomment),
            (InReplace, start, InReplace, Uncomment),
            (InReplace, replace, InReplace, Uncomment),
            (InReplace, end, Passthrough, Discard),
            (InReplace, shred, InReplace, Shred),
        ];

        for (mode, kind, next, action) in table {
            assert_eq!(
                transition(mode, kind),
                Step { next, action },
                "transition({:?}, {:?})",
                mode,
                kind
            );
        }
    }

    #[test]
    fn test_passthrough_is_exact() {
        let input = "  x = 1   \r\n\tdef f():\n\n# normal comment\nno newline";
        assert_eq!(text(input), input);
    }

    #[test]
    fn test_region_deletion() {
        let input = format!("A\n{}B\nC\n{}D\n", START, END);
        assert_eq!(text(&input), "A\nD\n");
    }

    #[test]
    fn test_replacement() {
        let input = format!("A\n{}B\n{}# stub\n{}C\n", START, REPLACE, END);
        assert_eq!(text(&input), "A\nstub\nC\n");
    }

    #[test]
    fn test_replacement_keeps_indentation_and_trailing_content() {
        let input = format!(
            "def f():\n    {}    return 42\n    {}    # raise NotImplementedError  # TODO\n    {}",
            START, REPLACE, END
        );
        assert_eq!(text(&input), "def f():\n    raise NotImplementedError  # TODO\n");
    }

    #[test]
    fn test_multiple_regions() {
        let input = format!("A\n{}x\n{}B\n{}y\n{}# z\n{}C\n", START, END, START, REPLACE, END);
        assert_eq!(text(&input), "A\nB\nz\nC\n");
    }

    #[test]
    fn test_shred_anywhere() {
        assert_eq!(run(&format!("{}A\n", SHRED)).unwrap(), Sanitized::Shred);
        assert_eq!(run(&format!("A\nB\n{}", SHRED)).unwrap(), Sanitized::Shred);
        assert_eq!(run(&format!("{}A\n{}", START, SHRED)).unwrap(), Sanitized::Shred);
        assert_eq!(
            run(&format!("{}A\n{}# b\n{}", START, REPLACE, SHRED)).unwrap(),
            Sanitized::Shred
        );
    }

    #[test]
    fn test_shred_wins_over_later_malformed_block() {
        assert_eq!(run(&format!("{}{}A\n", SHRED, START)).unwrap(), Sanitized::Shred);
    }

    #[test]
    fn test_unterminated_start() {
        let err = run(&format!("A\n{}B\nC\n", START)).unwrap_err();
        assert_eq!(err, BlockError { line: 4, mode: Mode::InSanitizer });
    }

    #[test]
    fn test_unterminated_replace() {
        let err = run(&format!("{}B\n{}# c\n", START, REPLACE)).unwrap_err();
        assert_eq!(err, BlockError { line: 4, mode: Mode::InReplace });
    }

    #[test]
    fn test_nested_start_is_discarded() {
        let input = format!("A\n{}x\n{}y\n{}B\n", START, START, END);
        assert_eq!(text(&input), "A\nB\n");
    }

    #[test]
    fn test_stray_end_in_passthrough_is_kept() {
        let input = format!("A\n{}B\n", END);
        assert_eq!(text(&input), input);
    }

    #[test]
    fn test_no_marker_passes_everything() {
        let input = format!("{}A\n{}", START, SHRED);
        assert_eq!(sanitize_text(&input, None).unwrap().to_text(), input);
    }

    #[test]
    fn test_whole_file_region_gives_empty_sequence() {
        let input = format!("{}A\n{}", START, END);
        let output = run(&input).unwrap();
        assert_eq!(output, Sanitized::Lines(Vec::new()));
        assert!(output.is_empty());
    }

    #[test]
    fn test_sentinel_without_trailing_newline() {
        let input = "A\n# REPOBEE-SANITIZER-START\nB\n# REPOBEE-SANITIZER-END";
        assert_eq!(text(input), "A\n");
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::InSanitizer.to_string(), "REPOBEE-SANITIZER-START");
        assert_eq!(Mode::InReplace.to_string(), "REPOBEE-SANITIZER-REPLACE-WITH");
    }
}
