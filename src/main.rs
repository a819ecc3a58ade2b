/*!
 * Command-line interface for catdir
 */

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::LevelFilter;

use catdir::clipboard::{copy_to_clipboard, paste_from_clipboard};
use catdir::config::{Args, Config};
use catdir::report::{CollectionReport, ReconstructionReport, Reporter};
use catdir::reconstruct::Reconstructor;
use catdir::scanner::Scanner;
use catdir::utils::count_files;
use catdir::writer::TreeWriter;
use catdir::IgnoreRules;

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "catdir", &mut io::stdout());
        return Ok(());
    }

    // Create configuration
    let config = Config::from_args(args);
    setup_logging(config.log_level);
    log::debug!("Configuration: {:?}", config);

    // Validate configuration
    if let Err(e) = config.validate() {
        log::error!("{}", e);
        return Err(e.into());
    }

    if config.reconstruct {
        run_reconstruct(&config)
    } else {
        run_collect(&config)
    }
}

fn setup_logging(level: LevelFilter) {
    // Diagnostics go to stderr; stdout is reserved for the stream
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
    log::trace!("Logger initialized with level: {:?}", level);
}

fn progress_bar(config: &Config, rules: &IgnoreRules) -> ProgressBar {
    if config.log_level == LevelFilter::Off || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::with_draw_target(
        Some(count_files(&config.target_dir, rules, config.recursive)),
        ProgressDrawTarget::stderr(),
    );
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_prefix("Collecting");
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn run_collect(config: &Config) -> io::Result<()> {
    let start_time = Instant::now();

    let rules = IgnoreRules::for_collection(&config.target_dir, &config.ignore_file);
    let progress = progress_bar(config, &rules);
    let mut scanner = Scanner::new(config.clone(), rules, Arc::new(progress.clone()));

    let tree = scanner.collect()?;
    progress.finish_and_clear();

    let writer = TreeWriter::new(config.binary_encoding);
    let stream = writer.render(&tree);

    let destination = match &config.output_file {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            out.write_all(&stream)?;
            out.flush()?;
            path.display().to_string()
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            out.write_all(&stream)?;
            out.flush()?;
            "stdout".to_string()
        }
    };

    if config.clip {
        match copy_to_clipboard(&stream) {
            Ok(()) => log::info!("Copied {} bytes to the clipboard", stream.len()),
            Err(e) => log::error!("Failed to copy to clipboard: {}", e),
        }
    }

    if config.summary {
        let report = CollectionReport {
            target: config.target_dir.display().to_string(),
            destination,
            duration: start_time.elapsed(),
            statistics: scanner.statistics().clone(),
            stream_bytes: stream.len() as u64,
        };
        let reporter = Reporter::new();
        reporter.print(&reporter.collection_summary(&report));
    }

    Ok(())
}

fn run_reconstruct(config: &Config) -> io::Result<()> {
    let start_time = Instant::now();

    let raw = if config.paste {
        paste_from_clipboard().map_err(catdir::CatDirError::from)?
    } else if let Some(path) = &config.input_file {
        std::fs::read(path)?
    } else {
        let mut buf = Vec::new();
        io::stdin().lock().read_to_end(&mut buf)?;
        buf
    };
    // Raw binary bodies may carry invalid UTF-8; they are lossy by format
    let text = String::from_utf8_lossy(&raw);

    let outcome = Reconstructor::new(&config.target_dir).reconstruct(&text)?;
    if !outcome.failed.is_empty() {
        log::warn!("{} files could not be written", outcome.failed.len());
    }

    if config.summary {
        let report = ReconstructionReport {
            target: config.target_dir.display().to_string(),
            duration: start_time.elapsed(),
            outcome,
        };
        let reporter = Reporter::new();
        reporter.print(&reporter.reconstruction_summary(&report));
    }

    Ok(())
}
