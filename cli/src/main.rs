//! treecp - concurrent recursive copy
//!
//! A file/directory copy command powered by treecopy.

use clap::Parser;
use clap::error::ErrorKind;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use treecopy::{
    CopyOptions, CopyStats, DEFAULT_BATCH_SIZE, DEFAULT_MAX_PATH_LEN, DEFAULT_PARALLEL,
    ProgressReporter, Reporter, RetryPolicy, TracingReporter, copy_tree_with_reporter,
    create_spinner,
};

/// treecp - Copy a file or directory tree concurrently
///
/// Files keep their permission bits, directories are created with mode 0755.
/// Symlinks, FIFOs, sockets and devices inside the tree are skipped.
/// Failures of individual entries are reported on stderr and do not change
/// the exit status.
#[derive(Parser, Debug)]
#[command(name = "treecp", version, about, long_about = None)]
struct Args {
    /// Source file or directory
    source: PathBuf,

    /// Destination path (must not be inside the source)
    destination: PathBuf,

    /// Number of worker threads
    #[arg(short = 'j', long, default_value_t = DEFAULT_PARALLEL)]
    jobs: usize,

    /// Children launched per batch in one directory
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Retries when running out of file descriptors
    #[arg(long, default_value_t = 10, conflicts_with = "retry_forever")]
    max_retries: u32,

    /// Retry every second, forever, when running out of file descriptors
    #[arg(long)]
    retry_forever: bool,

    /// Reject paths of this many bytes or more
    #[arg(long, default_value_t = DEFAULT_MAX_PATH_LEN)]
    max_path_len: usize,

    /// Show a progress spinner
    #[arg(long)]
    progress: bool,

    /// Verbose output
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Copy(#[from] treecopy::Error),

    #[error("invalid {name}: must be at least 1")]
    InvalidValue { name: &'static str },
}

type CliResult<T> = Result<T, CliError>;

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    init_logging(&args);

    match run(&args) {
        Ok(stats) => {
            if args.verbose {
                print_stats(&stats);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: &Args) -> CliResult<CopyStats> {
    let options = build_options(args)?;
    tracing::info!(
        source = %args.source.display(),
        destination = %args.destination.display(),
        jobs = options.parallel,
        batch_size = options.batch_size,
        "copying"
    );

    let stats = if args.progress {
        let reporter = ProgressReporter::new(create_spinner(), TracingReporter);
        let result = copy(args, &options, &reporter);
        reporter.finish();
        result?
    } else {
        copy(args, &options, &TracingReporter)?
    };

    if !stats.is_complete() {
        tracing::error!("{} entries could not be copied", stats.failures);
    }
    Ok(stats)
}

fn copy(args: &Args, options: &CopyOptions, reporter: &dyn Reporter) -> CliResult<CopyStats> {
    Ok(copy_tree_with_reporter(
        &args.source,
        &args.destination,
        options,
        reporter,
    )?)
}

fn build_options(args: &Args) -> CliResult<CopyOptions> {
    if args.jobs == 0 {
        return Err(CliError::InvalidValue { name: "--jobs" });
    }
    if args.batch_size == 0 {
        return Err(CliError::InvalidValue {
            name: "--batch-size",
        });
    }
    if args.max_path_len == 0 {
        return Err(CliError::InvalidValue {
            name: "--max-path-len",
        });
    }

    let retry = if args.retry_forever {
        RetryPolicy::unbounded(Duration::from_secs(1))
    } else {
        RetryPolicy::default().with_max_retries(args.max_retries)
    };

    Ok(CopyOptions::default()
        .with_parallel(args.jobs)
        .with_batch_size(args.batch_size)
        .with_retry(retry)
        .with_max_path_len(args.max_path_len))
}

fn print_stats(stats: &CopyStats) {
    println!("Copy completed in {:?}", stats.duration);
    println!("  Files copied:   {}", stats.files_copied);
    println!("  Directories:    {}", stats.dirs_created);
    println!("  Skipped:        {}", stats.entries_skipped);
    println!("  Failed:         {}", stats.failures);
    println!("  Retries:        {}", stats.retries);
    println!("  Total size:     {}", format_bytes(stats.bytes_copied));
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
