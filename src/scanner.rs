/*!
 * Directory walking and file collection
 */

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::{CatDirError, Result};
use crate::matcher::IgnoreRules;
use crate::types::{ContentKind, FileTree};
use crate::utils::relative_slash_path;
use crate::{bail, ensure};

/// Scanner statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerStatistics {
    /// Files added to the tree
    pub files_collected: usize,
    /// Files classified as text
    pub text_files: usize,
    /// Files classified as binary
    pub binary_files: usize,
    /// Files and directories excluded by ignore rules
    pub entries_ignored: usize,
    /// Files or directories that could not be read
    pub read_failures: usize,
    /// Total bytes collected
    pub total_bytes: u64,
}

/// Collects the files under a root directory into a [`FileTree`]
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Ignore rules for this run
    rules: IgnoreRules,
    /// Resolved location of the output file, never collected
    output_path: Option<PathBuf>,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
    /// Scanner statistics
    statistics: ScannerStatistics,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, rules: IgnoreRules, progress: Arc<ProgressBar>) -> Self {
        let output_path = config.output_file.as_deref().and_then(resolve_output);
        Self {
            config,
            rules,
            output_path,
            progress,
            statistics: ScannerStatistics::default(),
        }
    }

    /// Scanner that loads its own rules from the ignore file at the target root
    pub fn from_config(config: Config, progress: Arc<ProgressBar>) -> Self {
        let rules = IgnoreRules::for_collection(&config.target_dir, &config.ignore_file);
        Self::new(config, rules, progress)
    }

    /// Get scanner statistics
    pub fn statistics(&self) -> &ScannerStatistics {
        &self.statistics
    }

    /// Ignore rules in effect
    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    /// Walk the target directory and collect every surviving file
    ///
    /// Fails only when the root itself cannot be accessed; per-entry
    /// failures are logged and skipped.
    pub fn collect(&mut self) -> Result<FileTree> {
        let root = self.config.target_dir.clone();
        let metadata = match fs::metadata(&root) {
            Ok(metadata) => metadata,
            Err(e) => bail!(PathNotFound, "{}: {}", root.display(), e),
        };
        ensure!(
            metadata.is_dir(),
            PathNotFound,
            "Target is not a directory: {}",
            root.display()
        );
        // Fail early on an unreadable root rather than logging it as one bad entry
        fs::read_dir(&root)?;

        self.statistics = ScannerStatistics::default();
        let mut tree = FileTree::new();
        log::info!("Collecting files under {}", root.display());
        self.scan_directory(&root, &root, &mut tree);
        log::debug!("Collected {} files", tree.len());
        Ok(tree)
    }

    /// Collect one directory's files, then descend into its subdirectories
    fn scan_directory(&mut self, root: &Path, dir: &Path, tree: &mut FileTree) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        dirs.push(entry);
                    } else {
                        files.push(entry);
                    }
                }
                Err(e) => {
                    log::warn!("Error reading directory {}: {}", dir.display(), e);
                    self.statistics.read_failures += 1;
                }
            }
        }

        for entry in files {
            self.process_file(root, &entry, tree);
        }

        if !self.config.recursive {
            return;
        }

        for entry in dirs {
            if self.rules.is_ignored(entry.path(), root, true) {
                log::debug!("Pruning ignored directory {}", entry.path().display());
                self.statistics.entries_ignored += 1;
                continue;
            }
            self.scan_directory(root, entry.path(), tree);
        }
    }

    /// Read a single file into the tree unless it is ignored
    fn process_file(&mut self, root: &Path, entry: &DirEntry, tree: &mut FileTree) {
        let path = entry.path();

        // Symlinks are followed to files only; directory links are not descended
        if entry.path_is_symlink() && !path.is_file() {
            log::debug!("Skipping symlink {}", path.display());
            return;
        }

        if self.should_ignore(root, path) {
            log::trace!("Ignoring {}", path.display());
            self.statistics.entries_ignored += 1;
            return;
        }

        let rel_path = relative_slash_path(path, root);
        self.progress.inc(1);
        self.progress.set_message(format!("Current file: {}", rel_path));

        match fs::read(path) {
            Ok(content) => {
                match ContentKind::classify(&content) {
                    ContentKind::Text => self.statistics.text_files += 1,
                    ContentKind::Binary => self.statistics.binary_files += 1,
                }
                self.statistics.files_collected += 1;
                self.statistics.total_bytes += content.len() as u64;
                if tree.insert(rel_path.clone(), content).is_some() {
                    log::warn!("Duplicate path {} replaced an earlier entry", rel_path);
                }
            }
            Err(source) => {
                let err = CatDirError::FileRead {
                    path: path.to_path_buf(),
                    source,
                };
                log::warn!("{}", err);
                self.statistics.read_failures += 1;
            }
        }
    }

    /// Check if a file should be skipped
    pub fn should_ignore(&self, root: &Path, path: &Path) -> bool {
        if self.rules.is_ignored(path, root, false) {
            return true;
        }

        // Don't collect the output file itself
        match &self.output_path {
            Some(output) => {
                path.file_name() == output.file_name()
                    && fs::canonicalize(path).is_ok_and(|p| &p == output)
            }
            None => false,
        }
    }
}

/// Absolute, symlink-free location of an output file that may not exist yet
fn resolve_output(output: &Path) -> Option<PathBuf> {
    let absolute = if output.is_absolute() {
        output.to_path_buf()
    } else {
        env::current_dir().ok()?.join(output)
    };
    if let Ok(resolved) = fs::canonicalize(&absolute) {
        return Some(resolved);
    }

    let parent = absolute.parent()?;
    let name = absolute.file_name()?;
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}
