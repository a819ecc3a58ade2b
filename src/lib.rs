/*!
 * catdir - Cat a directory tree into one text stream and back
 *
 * Collection walks a directory honoring `.catignore`, the writer turns the
 * collected files into a banner-delimited text stream, and the
 * reconstructor parses that stream to write the files out again.
 */

pub mod clipboard;
pub mod config;
pub mod error;
pub mod format;
pub mod matcher;
pub mod reconstruct;
pub mod report;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;

// Re-export main components for easier access
pub use config::{Args, BinaryEncoding, Config};
pub use error::{CatDirError, Result};
pub use matcher::IgnoreRules;
pub use reconstruct::{parse, BodyKind, ParsedEntry, ReconstructOutcome, Reconstructor, StreamParser};
pub use report::{CollectionReport, ReconstructionReport, Reporter};
pub use scanner::{Scanner, ScannerStatistics};
pub use types::{ContentKind, FileTree};
pub use utils::DEFAULT_IGNORE_FILE;
pub use writer::TreeWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load the ignore patterns for collecting `root`, including the ignore file itself
pub fn load_rules(root: &Path) -> IgnoreRules {
    IgnoreRules::for_collection(root, DEFAULT_IGNORE_FILE)
}

/// Collect the files under `root` that survive `rules`
pub fn collect(root: &Path, recursive: bool, rules: IgnoreRules) -> Result<FileTree> {
    let mut config = Config::new(root);
    config.recursive = recursive;
    Scanner::new(config, rules, Arc::new(ProgressBar::hidden())).collect()
}

/// Render a tree with raw binary bodies
pub fn render(tree: &FileTree) -> Vec<u8> {
    TreeWriter::default().render(tree)
}

/// Parse `text` and write its files under `root`
pub fn reconstruct(root: &Path, text: &str) -> Result<ReconstructOutcome> {
    Reconstructor::new(root).reconstruct(text)
}
