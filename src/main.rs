use anyhow::Result;
use assgn_sanitizer::cli::{self, Args};
use assgn_sanitizer::config;
use assgn_sanitizer::error::SanitizeError;
use assgn_sanitizer::file_processor::{FileOutcome, FileProcessor, FileReport, SanitizeReport};
use assgn_sanitizer::logger;
use assgn_sanitizer::markers::MarkerTable;
use assgn_sanitizer::report_formatter::ReportFormatter;
use std::io::{self, Write};
use std::path::Path;

fn main() -> Result<()> {
    let args = cli::parse_args();

    let config = config::load_config(args.config.as_deref())?;
    logger::init_logging(args.verbose, config.logging.file.as_deref())?;

    // Built once and shared read-only by everything below
    let markers = config.marker_table();

    if args.print_config {
        match config::active_config_path(args.config.as_deref()) {
            Some(path) => println!("Config file: {}\n", path.display()),
            None => println!("{}", config::DEFAULT_CONFIG),
        }
        print_markers(&markers);
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        anyhow::bail!("Missing input path");
    };

    if !input.exists() {
        return Err(SanitizeError::InputNotFound(input.to_path_buf()).into());
    }

    if args.recurse || input.is_dir() {
        if !input.is_dir() {
            return Err(SanitizeError::NotADirectory(input.to_path_buf()).into());
        }
        let output = args.output.as_deref().ok_or(SanitizeError::OutputRequired)?;
        sanitize_directory(&args, &markers, input, output)
    } else {
        sanitize_file(&args, &markers, input)
    }
}

fn sanitize_directory(args: &Args, markers: &MarkerTable, input: &Path, output: &Path) -> Result<()> {
    let processor = FileProcessor::new(markers)
        .dry_run(args.dry_run)
        .keep_text(args.diff);

    let report = processor.sanitize_directory(input, output)?;

    print_diffs(args, &report.files);

    let use_color = ReportFormatter::should_use_color();
    if args.quiet {
        // Failures are still reported, but never change the exit status
        for failure in report.failures() {
            if let FileOutcome::Failed(err) = &failure.outcome {
                eprintln!("Error: {}", err);
            }
        }
    } else {
        print!("{}", ReportFormatter::format_report(&report, args.dry_run, use_color));
    }

    Ok(())
}

fn sanitize_file(args: &Args, markers: &MarkerTable, input: &Path) -> Result<()> {
    let processor = FileProcessor::new(markers)
        .dry_run(args.dry_run)
        .keep_text(args.diff);

    let Some(output) = args.output.as_deref() else {
        // No output path: write the sanitized text to stdout
        let bytes = processor.render(input)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(&bytes)?;
        stdout.flush()?;
        return Ok(());
    };

    let report = processor.sanitize_file(input, output)?;
    print_diffs(args, std::slice::from_ref(&report));

    if !args.quiet {
        let use_color = ReportFormatter::should_use_color();
        let report = SanitizeReport {
            files: vec![report],
        };
        print!("{}", ReportFormatter::format_report(&report, args.dry_run, use_color));
    }

    Ok(())
}

fn print_diffs(args: &Args, files: &[FileReport]) {
    if !args.diff {
        return;
    }

    let use_color = ReportFormatter::should_use_color();
    for file in files {
        if let Some(change) = &file.change {
            print!("{}", ReportFormatter::format_diff(&file.path, change, args.context, use_color));
        }
    }
}

fn print_markers(markers: &MarkerTable) {
    println!("Extension  Marker");
    for (ext, marker) in markers.iter() {
        println!("{:<10} {}", ext, marker);
    }
}
