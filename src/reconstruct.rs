/*!
 * Rebuilding a directory tree from a catdir stream
 *
 * Parsing is a three-state machine fed one line at a time:
 *
 * - `Idle`: outside any file. Only a `>> File:` marker matters; the tree
 *   listing, section banners and stray `>> Type:` lines are ignored.
 * - `Header`: a file marker was seen. `>> Type:` sets the body kind, the
 *   `-` banner opens the body, any other plain line opens it implicitly.
 * - `Body`: lines are buffered verbatim until the `=` banner or the next
 *   file marker. `-` banners inside a body are dropped.
 *
 * The parser never fails. Entries without a path or without a single
 * content line are dropped, so a hand-written entry with nothing between
 * its banners does not produce a file.
 */

use std::fs;
use std::mem;
use std::path::{Component, Path, PathBuf};

use crate::error::{CatDirError, Result};
use crate::format::{
    is_banner, CLOSING_CHAR, FILE_MARKER, SEPARATOR_CHAR, TYPE_BINARY_HEX, TYPE_MARKER, TYPE_TEXT,
};

/// How a parsed body maps back to bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Lines joined with newlines
    Text,
    /// Lines joined with newlines; reference-compatible and lossy for real binaries
    RawBinary,
    /// Hex digits spread over lines
    HexBinary,
}

impl BodyKind {
    /// Kind named by a `>> Type:` line
    fn from_type_line(line: &str) -> Self {
        if line.contains(TYPE_TEXT) {
            BodyKind::Text
        } else if line.contains(TYPE_BINARY_HEX) {
            BodyKind::HexBinary
        } else {
            BodyKind::RawBinary
        }
    }
}

/// A complete file entry recovered from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Path relative to the reconstruction root, as written in the stream
    pub path: String,
    /// Body kind from the `>> Type:` line
    pub kind: BodyKind,
    /// Buffered body lines
    pub lines: Vec<String>,
}

impl ParsedEntry {
    /// Decode the buffered lines into file bytes
    pub fn content(&self) -> Result<Vec<u8>> {
        match self.kind {
            BodyKind::Text | BodyKind::RawBinary => Ok(self.lines.join("\n").into_bytes()),
            BodyKind::HexBinary => {
                let digits: String = self.lines.iter().map(|l| l.trim()).collect();
                hex::decode(digits).map_err(|source| CatDirError::Decode {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Header {
        path: String,
        kind: BodyKind,
    },
    Body {
        path: String,
        kind: BodyKind,
        lines: Vec<String>,
    },
}

/// Line-driven parser for the catdir stream
#[derive(Debug, Default)]
pub struct StreamParser {
    state: State,
    dropped: usize,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries discarded so far for lacking a path or content
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Feed one line (without its terminator); returns an entry when one completes
    pub fn feed(&mut self, line: &str) -> Option<ParsedEntry> {
        let state = mem::take(&mut self.state);

        if let Some(rest) = line.strip_prefix(FILE_MARKER) {
            let finished = self.complete(state);
            self.state = State::Header {
                path: rest.trim().to_string(),
                kind: BodyKind::Text,
            };
            return finished;
        }

        match state {
            State::Idle => None,
            State::Header { path, kind } => {
                if line.starts_with(TYPE_MARKER) {
                    self.state = State::Header {
                        path,
                        kind: BodyKind::from_type_line(line),
                    };
                } else if is_banner(line, SEPARATOR_CHAR) {
                    self.state = State::Body {
                        path,
                        kind,
                        lines: Vec::new(),
                    };
                } else if is_banner(line, CLOSING_CHAR) {
                    self.dropped += 1;
                } else {
                    self.state = State::Body {
                        path,
                        kind,
                        lines: vec![line.to_string()],
                    };
                }
                None
            }
            State::Body {
                path,
                kind,
                mut lines,
            } => {
                if is_banner(line, CLOSING_CHAR) {
                    return self.complete(State::Body { path, kind, lines });
                }
                if !is_banner(line, SEPARATOR_CHAR) {
                    lines.push(line.to_string());
                }
                self.state = State::Body { path, kind, lines };
                None
            }
        }
    }

    /// Signal end of input; a body still being buffered is emitted
    pub fn finish(&mut self) -> Option<ParsedEntry> {
        let state = mem::take(&mut self.state);
        self.complete(state)
    }

    /// Turn a pending state into an entry if it has both a path and content
    fn complete(&mut self, state: State) -> Option<ParsedEntry> {
        match state {
            State::Idle => None,
            State::Body { path, kind, lines } if !path.is_empty() && !lines.is_empty() => {
                Some(ParsedEntry { path, kind, lines })
            }
            State::Header { .. } | State::Body { .. } => {
                self.dropped += 1;
                None
            }
        }
    }
}

/// Parse a whole stream into its entries
pub fn parse(text: &str) -> Vec<ParsedEntry> {
    let mut parser = StreamParser::new();
    let mut entries: Vec<ParsedEntry> = text
        .split_terminator('\n')
        .filter_map(|line| parser.feed(line))
        .collect();
    entries.extend(parser.finish());
    entries
}

/// Result of a reconstruction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconstructOutcome {
    /// Relative paths written, in stream order
    pub written: Vec<String>,
    /// Relative paths that could not be written, with the reason
    pub failed: Vec<(String, String)>,
    /// Entries dropped for lacking a path or content
    pub dropped: usize,
    /// Bytes written in total
    pub total_bytes: u64,
}

/// Writes parsed entries under a root directory
#[derive(Debug, Clone)]
pub struct Reconstructor {
    root: PathBuf,
}

impl Reconstructor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse `text` and write every complete entry as soon as it is parsed
    ///
    /// Only a failure to create the root itself is returned as an error.
    /// Per-entry failures are logged, recorded in the outcome, and skipped.
    pub fn reconstruct(&self, text: &str) -> Result<ReconstructOutcome> {
        fs::create_dir_all(&self.root).map_err(|source| CatDirError::DirCreation {
            path: self.root.clone(),
            source,
        })?;

        let mut outcome = ReconstructOutcome::default();
        let mut parser = StreamParser::new();
        for line in text.split_terminator('\n') {
            if let Some(entry) = parser.feed(line) {
                self.apply(&entry, &mut outcome);
            }
        }
        if let Some(entry) = parser.finish() {
            self.apply(&entry, &mut outcome);
        }
        outcome.dropped = parser.dropped();
        if outcome.dropped > 0 {
            log::debug!("Dropped {} entries without path or content", outcome.dropped);
        }

        Ok(outcome)
    }

    fn apply(&self, entry: &ParsedEntry, outcome: &mut ReconstructOutcome) {
        match self.write_entry(entry) {
            Ok(bytes) => {
                log::info!("Reconstructed file: {}", entry.path);
                outcome.written.push(entry.path.clone());
                outcome.total_bytes += bytes;
            }
            Err(e) => {
                log::warn!("Error writing file {}: {}", entry.path, e);
                outcome.failed.push((entry.path.clone(), e.to_string()));
            }
        }
    }

    /// Write one entry, creating parent directories; last write wins
    pub fn write_entry(&self, entry: &ParsedEntry) -> Result<u64> {
        let target = self.resolve(&entry.path)?;
        let content = entry.content()?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| CatDirError::DirCreation {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, &content).map_err(|source| CatDirError::FileWrite {
            path: target.clone(),
            source,
        })?;

        Ok(content.len() as u64)
    }

    /// Resolve a stream path under the root, refusing anything that escapes it
    fn resolve(&self, rel_path: &str) -> Result<PathBuf> {
        let mut target = self.root.clone();
        let mut depth = 0;
        for component in Path::new(rel_path).components() {
            match component {
                Component::Normal(part) => {
                    target.push(part);
                    depth += 1;
                }
                Component::CurDir => {}
                _ => return Err(CatDirError::UnsafePath(rel_path.to_string())),
            }
        }
        if depth == 0 {
            return Err(CatDirError::UnsafePath(rel_path.to_string()));
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::banner;

    use tempfile::tempdir;

    fn dashes() -> String {
        banner(SEPARATOR_CHAR)
    }

    fn equals() -> String {
        banner(CLOSING_CHAR)
    }

    fn entry_text(path: &str, kind: &str, body: &str) -> String {
        format!(
            ">> File: {}\n>> Type: {}\n{}\n{}\n{}\n",
            path,
            kind,
            dashes(),
            body,
            equals()
        )
    }

    #[test]
    fn test_parse_two_closed_entries() {
        let text = entry_text("a.txt", "text", "hi") + &entry_text("sub/b.txt", "text", "bye");
        let entries = parse(&text);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "a.txt");
        assert_eq!(entries[0].lines, vec!["hi"]);
        assert_eq!(entries[1].path, "sub/b.txt");
        assert_eq!(entries[1].content().unwrap(), b"bye");
    }

    #[test]
    fn test_missing_final_banner_still_flushes() {
        let text = format!(">> File: a.txt\n>> Type: text\n{}\nline one\nline two\n", dashes());
        let entries = parse(&text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content().unwrap(), b"line one\nline two");
    }

    #[test]
    fn test_new_marker_flushes_pending_entry() {
        let text = format!(
            ">> File: a.txt\n{}\nfirst\n>> File: b.txt\n{}\nsecond\n{}\n",
            dashes(),
            dashes(),
            equals()
        );
        let entries = parse(&text);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "b.txt"]);
        assert_eq!(entries[0].lines, vec!["first"]);
    }

    #[test]
    fn test_entry_without_content_is_dropped() {
        let text = format!(">> File: empty.txt\n>> Type: text\n{}\n{}\n", dashes(), equals());
        let mut parser = StreamParser::new();
        let entries: Vec<_> = text
            .split_terminator('\n')
            .filter_map(|l| parser.feed(l))
            .collect();
        assert!(entries.is_empty());
        assert!(parser.finish().is_none());
        assert_eq!(parser.dropped(), 1);
    }

    #[test]
    fn test_rendered_empty_file_keeps_one_empty_line() {
        let entries = parse(&entry_text("empty.txt", "text", ""));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content().unwrap(), b"");
    }

    #[test]
    fn test_entry_without_path_is_dropped() {
        let entries = parse(&entry_text("", "text", "orphan"));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_listing_and_stray_lines_are_ignored_when_idle() {
        let text = format!(
            "{}\n# TREE:\na.txt\n>> Type: binary\nnoise\n{}",
            banner('#'),
            entry_text("a.txt", "text", "hi")
        );
        let entries = parse(&text);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, BodyKind::Text);
    }

    #[test]
    fn test_type_line_sets_kind() {
        assert_eq!(parse(&entry_text("a", "text", "x"))[0].kind, BodyKind::Text);
        assert_eq!(parse(&entry_text("a", "binary", "x"))[0].kind, BodyKind::RawBinary);
        assert_eq!(parse(&entry_text("a", "binary/hex", "00"))[0].kind, BodyKind::HexBinary);
    }

    #[test]
    fn test_type_marker_inside_body_is_content() {
        let entries = parse(&entry_text("doc.md", "text", ">> Type: binary"));
        assert_eq!(entries[0].kind, BodyKind::Text);
        assert_eq!(entries[0].lines, vec![">> Type: binary"]);
    }

    #[test]
    fn test_body_without_separator_starts_implicitly() {
        let text = format!(">> File: a.txt\ncontent\n{}\n", equals());
        let entries = parse(&text);
        assert_eq!(entries[0].lines, vec!["content"]);
    }

    #[test]
    fn test_separator_lines_in_body_are_skipped() {
        let text = entry_text("a.txt", "text", &format!("top\n{}\nbottom", dashes()));
        assert_eq!(parse(&text)[0].lines, vec!["top", "bottom"]);
    }

    #[test]
    fn test_carriage_returns_are_preserved() {
        let entries = parse(&entry_text("win.txt", "text", "a\r\nb\r"));
        assert_eq!(entries[0].content().unwrap(), b"a\r\nb\r");
    }

    #[test]
    fn test_hex_body_decodes() {
        let entries = parse(&entry_text("blob", "binary/hex", "00ff\n10"));
        assert_eq!(entries[0].content().unwrap(), vec![0x00, 0xff, 0x10]);

        let entries = parse(&entry_text("blob", "binary/hex", "zz"));
        assert!(matches!(
            entries[0].content(),
            Err(CatDirError::Decode { .. })
        ));
    }

    #[test]
    fn test_reconstruct_writes_files() {
        let dir = tempdir().unwrap();
        let text = entry_text("a.txt", "text", "hi") + &entry_text("sub/b.txt", "text", "bye");

        let outcome = Reconstructor::new(dir.path()).reconstruct(&text).unwrap();
        assert_eq!(outcome.written, vec!["a.txt", "sub/b.txt"]);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.total_bytes, 5);
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hi");
        assert_eq!(
            fs::read_to_string(dir.path().join("sub").join("b.txt")).unwrap(),
            "bye"
        );
    }

    #[test]
    fn test_reconstruct_overwrites_existing_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "old").unwrap();
        Reconstructor::new(dir.path())
            .reconstruct(&entry_text("a.txt", "text", "new"))
            .unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn test_unsafe_paths_are_skipped_and_processing_continues() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        let text = entry_text("../escape.txt", "text", "x")
            + &entry_text("/abs.txt", "text", "x")
            + &entry_text("ok.txt", "text", "fine");

        let outcome = Reconstructor::new(&root).reconstruct(&text).unwrap();
        assert_eq!(outcome.written, vec!["ok.txt"]);
        assert_eq!(outcome.failed.len(), 2);
        assert!(!dir.path().join("escape.txt").exists());
        assert_eq!(fs::read_to_string(root.join("ok.txt")).unwrap(), "fine");
    }

    #[test]
    fn test_write_failure_is_isolated() {
        let dir = tempdir().unwrap();
        // A file where a directory is needed makes the first entry unwritable
        fs::write(dir.path().join("blocker"), "").unwrap();
        let text = entry_text("blocker/inner.txt", "text", "x") + &entry_text("b.txt", "text", "y");

        let outcome = Reconstructor::new(dir.path()).reconstruct(&text).unwrap();
        assert_eq!(outcome.written, vec!["b.txt"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "blocker/inner.txt");
    }

    #[test]
    fn test_root_creation_failure_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("file"), "").unwrap();
        let result = Reconstructor::new(dir.path().join("file").join("root")).reconstruct("");
        assert!(matches!(result, Err(CatDirError::DirCreation { .. })));
    }
}
