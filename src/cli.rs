use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser, Debug)]
#[command(name = "assgn-sanitizer")]
#[command(about = "Remove solutions from the files of a programming assignment")]
#[command(long_about = "assgn-sanitizer strips instructor-only solution regions from source files
before an assignment is handed out to students.

Regions are delimited by sentinel comments written with the line comment of the
file's language:

  # REPOBEE-SANITIZER-START          begin a region to delete
  # REPOBEE-SANITIZER-REPLACE-WITH   lines after this are un-commented and kept
  # REPOBEE-SANITIZER-END            end the region
  # REPOBEE-SANITIZER-SHRED          drop the whole file from the output

Files with an unknown extension are copied unchanged. The input is never modified.

EXAMPLES:
  assgn-sanitizer solution.py -o stub.py      Sanitize a single file
  assgn-sanitizer solution.py                  Print the sanitized file to stdout
  assgn-sanitizer -r lab1/ -o lab1-student/    Sanitize a whole directory tree
  assgn-sanitizer lab1/ -o out/ --dry-run --diff
                                               Preview without writing anything")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
struct Cli {
    /// File or directory to sanitize
    #[arg(value_name = "INPUT", required_unless_present = "print_config")]
    input: Option<PathBuf>,

    /// Output file or directory (a directory must not exist yet)
    #[arg(short = 'o', long, alias = "outfile", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Treat the input as a directory and recurse into it
    #[arg(short = 'r', long)]
    recurse: bool,

    /// Show what would happen without writing anything
    #[arg(short = 'd', long)]
    dry_run: bool,

    /// Print a unified diff for every sanitized file
    #[arg(long)]
    diff: bool,

    /// Number of context lines in diffs
    #[arg(short = 'n', long, value_name = "NUM", default_value_t = 3)]
    context: usize,

    /// Only print errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ~/.assgn-sanitizer/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the effective extension → comment marker table and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub recurse: bool,
    pub dry_run: bool,
    pub diff: bool,
    pub context: usize,
    pub quiet: bool,
    pub verbose: u8,
    pub config: Option<PathBuf>,
    pub print_config: bool,
}

impl From<Cli> for Args {
    fn from(cli: Cli) -> Self {
        Args {
            input: cli.input,
            output: cli.output,
            recurse: cli.recurse,
            dry_run: cli.dry_run,
            diff: cli.diff,
            context: cli.context,
            quiet: cli.quiet,
            verbose: cli.verbose,
            config: cli.config,
            print_config: cli.print_config,
        }
    }
}

pub fn parse_args() -> Args {
    Cli::parse().into()
}

/// Parse from an explicit argument list (argv[0] included)
pub fn parse_from<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args).map(Args::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_single_file() {
        let args = parse_from(["assgn-sanitizer", "a.py", "-o", "b.py"]).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("a.py")));
        assert_eq!(args.output, Some(PathBuf::from("b.py")));
        assert!(!args.recurse);
        assert_eq!(args.context, 3);
    }

    #[test]
    fn test_parse_recursive_with_outfile_alias() {
        let args = parse_from(["assgn-sanitizer", "-r", "lab", "--outfile", "out"]).unwrap();
        assert!(args.recurse);
        assert_eq!(args.output, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_parse_verbosity() {
        let args = parse_from(["assgn-sanitizer", "-vv", "a.py"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(parse_from(["assgn-sanitizer", "-q", "-v", "a.py"]).is_err());
    }

    #[test]
    fn test_input_is_required() {
        assert!(parse_from(["assgn-sanitizer"]).is_err());
    }

    #[test]
    fn test_print_config_needs_no_input() {
        let args = parse_from(["assgn-sanitizer", "--print-config"]).unwrap();
        assert!(args.print_config);
        assert_eq!(args.input, None);
    }
}
