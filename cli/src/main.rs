//! unlegacy CLI - replay and inspect document event scripts

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unlegacy::sink::{to_json, CompositeSink, JsonFormat, NestingValidator, StatsSink};
use unlegacy::{
    assemble, AssemblerOptions, Diagnostics, RecordingSink, ScriptDecoder, TablePageBreaks,
    TextSink,
};

#[derive(Parser)]
#[command(name = "unlegacy")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Assemble legacy document event scripts into well-nested documents", long_about = None)]
struct Cli {
    /// Input script file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script and print the assembled events as JSON
    #[command(alias = "events")]
    Replay {
        /// Input script file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Replay a script and print its plain text
    Text {
        /// Input script file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include header and footer text
        #[arg(long)]
        headers: bool,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Check that scripts assemble into well-nested documents
    Check {
        /// Input script files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Print every warning key with its count
        #[arg(short, long)]
        verbose: bool,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Show document statistics
    Stats {
        /// Input script file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output statistics as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        assembly: AssemblyArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Copy)]
struct AssemblyArgs {
    /// NFC-normalize text before it reaches the output
    #[arg(long)]
    normalize: bool,

    /// Drop page breaks requested inside tables instead of deferring them
    #[arg(long)]
    suppress_table_breaks: bool,

    /// Keep runs of spaces as plain text
    #[arg(long)]
    keep_spaces: bool,

    /// How many times each kind of warning is logged
    #[arg(long, default_value = "1", env = "UNLEGACY_WARNING_LIMIT")]
    warning_limit: u32,
}

impl From<AssemblyArgs> for AssemblerOptions {
    fn from(args: AssemblyArgs) -> Self {
        let breaks = if args.suppress_table_breaks {
            TablePageBreaks::Suppress
        } else {
            TablePageBreaks::Defer
        };
        AssemblerOptions::new()
            .with_normalization(args.normalize)
            .with_table_page_breaks(breaks)
            .with_space_runs(!args.keep_spaces)
            .with_warning_limit(args.warning_limit)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Replay {
            input,
            output,
            compact,
            assembly,
        }) => cmd_replay(&input, output.as_deref(), compact, assembly.into()),
        Some(Commands::Text {
            input,
            output,
            headers,
            assembly,
        }) => cmd_text(&input, output.as_deref(), headers, assembly.into()),
        Some(Commands::Check {
            inputs,
            verbose,
            assembly,
        }) => cmd_check(&inputs, verbose, assembly.into()),
        Some(Commands::Stats {
            input,
            json,
            assembly,
        }) => cmd_stats(&input, json, assembly.into()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: print the text if input is provided
            if let Some(input) = cli.input {
                cmd_text(&input, None, false, AssemblerOptions::default())
            } else {
                println!("{}", "Usage: unlegacy <FILE>".yellow());
                println!("       unlegacy --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_replay(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    options: AssemblerOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = ScriptDecoder::open(input)?;
    let mut sink = RecordingSink::new();
    assemble(&decoder, &mut sink, options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(sink.events(), format)?;
    write_output(output, &json)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    headers: bool,
    options: AssemblerOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = ScriptDecoder::open(input)?;
    let mut sink = TextSink::new().with_headers_footers(headers);
    assemble(&decoder, &mut sink, options)?;
    write_output(output, &sink.into_text())
}

struct CheckReport {
    path: PathBuf,
    violations: Vec<String>,
    diagnostics: Option<Diagnostics>,
    error: Option<String>,
}

fn check_one(path: &Path, options: AssemblerOptions) -> CheckReport {
    log::debug!("checking {}", path.display());
    let mut report = CheckReport {
        path: path.to_path_buf(),
        violations: Vec::new(),
        diagnostics: None,
        error: None,
    };
    let decoder = match ScriptDecoder::open(path) {
        Ok(decoder) => decoder,
        Err(e) => {
            report.error = Some(e.to_string());
            return report;
        }
    };
    let mut validator = NestingValidator::new();
    match assemble(&decoder, &mut validator, options) {
        Ok(diagnostics) => report.diagnostics = Some(diagnostics),
        Err(e) => report.error = Some(e.to_string()),
    }
    report.violations = validator.finish().iter().map(|v| v.to_string()).collect();
    report
}

fn cmd_check(
    inputs: &[PathBuf],
    verbose: bool,
    options: AssemblerOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut reports = Vec::with_capacity(inputs.len());
    for path in inputs {
        pb.set_message(path.display().to_string());
        reports.push(check_one(path, options.clone()));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut failed = 0;
    for report in &reports {
        let ok = report.error.is_none() && report.violations.is_empty();
        if ok {
            println!("{} {}", "ok".green().bold(), report.path.display());
        } else {
            failed += 1;
            println!("{} {}", "FAIL".red().bold(), report.path.display());
        }
        if let Some(ref error) = report.error {
            println!("  {} {}", "└─".dimmed(), error.red());
        }
        for violation in &report.violations {
            println!("  {} {}", "├─".dimmed(), violation);
        }
        if let Some(ref diagnostics) = report.diagnostics {
            if verbose {
                for (key, count) in diagnostics.summary() {
                    println!("  {} {} x{}", "·".dimmed(), key.yellow(), count);
                }
            } else if diagnostics.total() > 0 {
                println!("  {} {} warnings", "·".dimmed(), diagnostics.total());
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} {} scripts checked", "Done!".green().bold(), reports.len());
        Ok(())
    } else {
        Err(format!("{} of {} scripts failed", failed, reports.len()).into())
    }
}

fn cmd_stats(
    input: &Path,
    json: bool,
    options: AssemblerOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = ScriptDecoder::open(input)?;
    let mut stats_sink = StatsSink::new();
    let mut validator = NestingValidator::new();
    let diagnostics = {
        let mut sink = CompositeSink::new()
            .with_sink(&mut stats_sink)
            .with_sink(&mut validator);
        assemble(&decoder, &mut sink, options)?
    };
    let stats = stats_sink.into_stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Document Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref metadata) = decoder.script().metadata {
        if let Some(ref title) = metadata.title {
            println!("{}: {}", "Title".bold(), title);
        }
        if let Some(ref author) = metadata.author {
            println!("{}: {}", "Author".bold(), author);
        }
    }
    println!("{}: {}", "Page spans".bold(), stats.page_span_count);
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Sections".bold(), stats.section_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!("{}: {}", "List items".bold(), stats.list_item_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Frames".bold(), stats.frame_count);
    println!("{}: {}", "Notes".bold(), stats.note_count);
    println!("{}: {}", "Comments".bold(), stats.comment_count);
    println!("{}: {}", "Max depth".bold(), stats.max_depth);

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);
    println!(
        "{}: {} ({} images, {} bytes)",
        "Objects".bold(),
        stats.object_count,
        stats.image_count,
        stats.object_bytes
    );
    println!("{}: {}", "Fields".bold(), stats.field_count);

    println!();
    let well_formed = if validator.finish().is_empty() {
        "Yes".green()
    } else {
        "No".red()
    };
    println!("{}: {}", "Well formed".bold(), well_formed);
    println!("{}: {}", "Warnings".bold(), diagnostics.total());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unlegacy".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Legacy document assembler");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unlegacy".dimmed());
    println!("License: MIT");
}
