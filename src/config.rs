/*!
 * Configuration handling for catdir
 */

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;
use log::LevelFilter;

use crate::error::Result;
use crate::utils::DEFAULT_IGNORE_FILE;
use crate::{bail, ensure};

/// How binary file bodies are written into the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BinaryEncoding {
    /// Raw bytes, readable by any reader of the format but lossy on reconstruction
    Raw,
    /// Lowercase hex wrapped at the banner width, reconstructed exactly
    Hex,
}

impl Default for BinaryEncoding {
    fn default() -> Self {
        Self::Raw
    }
}

/// Command-line arguments for catdir
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "catdir",
    version = env!("CARGO_PKG_VERSION"),
    about = "Cat over a directory respecting .catignore, or reconstruct a directory from that output",
    long_about = "Writes every file of a directory tree into a single text stream on stdout, \
                  skipping paths matched by the .catignore file at the target root. With \
                  --reconstruct, reads such a stream from stdin and writes the files back under \
                  the target directory."
)]
pub struct Args {
    /// Target directory (default: current directory)
    #[clap(default_value = ".")]
    pub target: String,

    /// Recurse into subdirectories
    #[clap(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub recursive: bool,

    /// Reconstruct the directory structure from input
    #[clap(long)]
    pub reconstruct: bool,

    /// Name of the ignore file read from the target root
    #[clap(long, default_value_t = DEFAULT_IGNORE_FILE.to_string(), value_name = "NAME")]
    pub ignore_file: String,

    /// Encoding used for binary file bodies
    #[clap(long, value_enum, default_value_t = BinaryEncoding::default())]
    pub binary_encoding: BinaryEncoding,

    /// Write the stream to a file instead of stdout
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Read the stream from a file instead of stdin (reconstruct mode)
    #[clap(short, long, value_name = "FILE")]
    pub input: Option<String>,

    /// Also copy the stream to the system clipboard
    #[clap(long)]
    pub clip: bool,

    /// Read the stream from the system clipboard (reconstruct mode)
    #[clap(long)]
    pub paste: bool,

    /// Print a summary table to stderr when done
    #[clap(long)]
    pub summary: bool,

    /// Increase diagnostic verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Silence all diagnostics
    #[clap(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory to serialize, or to reconstruct into
    pub target_dir: PathBuf,

    /// Whether to descend into subdirectories
    pub recursive: bool,

    /// Parse a stream instead of producing one
    pub reconstruct: bool,

    /// Name of the ignore file at the target root
    pub ignore_file: String,

    /// Encoding used for binary bodies
    pub binary_encoding: BinaryEncoding,

    /// Output file (stdout when absent)
    pub output_file: Option<PathBuf>,

    /// Input file (stdin when absent)
    pub input_file: Option<PathBuf>,

    /// Copy the rendered stream to the clipboard
    pub clip: bool,

    /// Read the stream from the clipboard
    pub paste: bool,

    /// Print a summary table
    pub summary: bool,

    /// Diagnostic level
    pub log_level: LevelFilter,
}

impl Config {
    /// Configuration with defaults for `target_dir`
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            recursive: true,
            reconstruct: false,
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            binary_encoding: BinaryEncoding::default(),
            output_file: None,
            input_file: None,
            clip: false,
            paste: false,
            summary: false,
            log_level: LevelFilter::Warn,
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let log_level = if args.quiet {
            LevelFilter::Off
        } else {
            match args.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        };

        Self {
            target_dir: PathBuf::from(args.target),
            recursive: args.recursive,
            reconstruct: args.reconstruct,
            ignore_file: args.ignore_file,
            binary_encoding: args.binary_encoding,
            output_file: args.output.map(PathBuf::from),
            input_file: args.input.map(PathBuf::from),
            clip: args.clip,
            paste: args.paste,
            summary: args.summary,
            log_level,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.ignore_file.trim().is_empty(),
            InvalidArgument,
            "ignore file name must not be empty"
        );

        if self.reconstruct {
            if self.target_dir.exists() && !self.target_dir.is_dir() {
                bail!(
                    Config,
                    "Reconstruction target is not a directory: {}",
                    self.target_dir.display()
                );
            }
            ensure!(
                !self.clip,
                InvalidArgument,
                "--clip only applies when serializing"
            );
            ensure!(
                self.output_file.is_none(),
                InvalidArgument,
                "--output only applies when serializing"
            );
            ensure!(
                !(self.paste && self.input_file.is_some()),
                InvalidArgument,
                "--paste and --input are mutually exclusive"
            );
            if let Some(input) = &self.input_file {
                ensure!(
                    input.is_file(),
                    PathNotFound,
                    "Input file not found: {}",
                    input.display()
                );
            }
        } else {
            ensure!(
                self.target_dir.is_dir(),
                PathNotFound,
                "Target directory not found: {}",
                self.target_dir.display()
            );
            ensure!(
                !self.paste && self.input_file.is_none(),
                InvalidArgument,
                "--paste and --input only apply with --reconstruct"
            );
            // Check if output file directory exists
            if let Some(parent) = self.output_file.as_ref().and_then(|p| p.parent()) {
                ensure!(
                    parent.as_os_str().is_empty() || parent.exists(),
                    PathNotFound,
                    "Output directory not found: {}",
                    parent.display()
                );
            }
        }

        Ok(())
    }
}
