//! Ignore rules loaded from the `.catignore` file
//!
//! Two kinds of pattern are supported. A pattern ending in `/` names
//! directories: it matches when its segments equal a contiguous run of the
//! candidate's directory segments, anywhere in the relative path. Every other
//! pattern is a shell-style glob tested against both the bare file name and
//! the full forward-slash relative path. Against the full path a `*` also
//! matches `/`, so `docs/*.md` covers `docs/api/v1.md`.

use std::fs;
use std::io;
use std::path::Path;

use glob_match::glob_match;
use regex::Regex;

use crate::utils::relative_slash_path;

#[derive(Debug, Clone)]
enum Rule {
    /// Segment sequence from a pattern with a trailing slash
    Directory(Vec<String>),
    /// General glob, with its whole-path form where it compiles
    Glob {
        pattern: String,
        path_regex: Option<Regex>,
    },
}

impl Rule {
    fn parse(pattern: &str) -> Self {
        if pattern.ends_with('/') {
            let segments = pattern
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            Rule::Directory(segments)
        } else {
            let path_regex = match Regex::new(&translate_glob(pattern)) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::debug!("Pattern {} only matches segment-wise: {}", pattern, e);
                    None
                }
            };
            Rule::Glob {
                pattern: pattern.to_string(),
                path_regex,
            }
        }
    }

    fn matches(&self, rel_path: &str, is_dir: bool) -> bool {
        match self {
            Rule::Directory(segments) => {
                if segments.is_empty() {
                    return false;
                }
                let mut parts: Vec<&str> = rel_path.split('/').collect();
                // A file's own name is never a directory segment
                if !is_dir {
                    parts.pop();
                }
                parts
                    .windows(segments.len())
                    .any(|w| w.iter().zip(segments).all(|(a, b)| *a == b.as_str()))
            }
            Rule::Glob {
                pattern,
                path_regex,
            } => {
                let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
                glob_match(pattern, file_name)
                    || glob_match(pattern, rel_path)
                    || path_regex.as_ref().is_some_and(|re| re.is_match(rel_path))
            }
        }
    }
}

/// Translate a shell glob into an anchored regex where `*` crosses `/`
///
/// `*` and `?` match any character, `[...]` is a set with `!` for negation,
/// and an unterminated `[` is literal. Everything else matches itself.
fn translate_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut j = i;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("\\[");
                    continue;
                }

                let mut set = String::from("[");
                for (k, &ch) in chars[i..j].iter().enumerate() {
                    match ch {
                        '!' if k == 0 => set.push('^'),
                        '^' if k == 0 => set.push_str("\\^"),
                        '\\' | '[' | '&' | '~' => {
                            set.push('\\');
                            set.push(ch);
                        }
                        _ => set.push(ch),
                    }
                }
                set.push(']');
                out.push_str(&set);
                i = j + 1;
            }
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    out
}

/// Immutable, ordered set of ignore patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<String>,
    rules: Vec<Rule>,
}

impl PartialEq for IgnoreRules {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for IgnoreRules {}

impl IgnoreRules {
    /// Rules that ignore nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build rules from raw pattern strings, skipping blanks and comments
    pub fn from_patterns<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .filter_map(|p| {
                let p = p.as_ref().trim();
                (!p.is_empty() && !p.starts_with('#')).then(|| p.to_string())
            })
            .collect();
        let rules = patterns.iter().map(|p| Rule::parse(p)).collect();
        Self { patterns, rules }
    }

    /// Parse the contents of an ignore file
    pub fn parse(contents: &str) -> Self {
        Self::from_patterns(contents.lines())
    }

    /// Load patterns from `ignore_file` inside `root`
    ///
    /// A missing file yields no patterns. An unreadable file is reported and
    /// also yields no patterns; it never aborts the run.
    pub fn load(root: &Path, ignore_file: &str) -> Self {
        let path = root.join(ignore_file);
        match fs::read_to_string(&path) {
            Ok(contents) => {
                let rules = Self::parse(&contents);
                log::debug!(
                    "Loaded {} ignore patterns from {}",
                    rules.len(),
                    path.display()
                );
                rules
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No ignore file at {}", path.display());
                Self::empty()
            }
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// Rules for a collection run: the loaded patterns plus the ignore file itself
    pub fn for_collection(root: &Path, ignore_file: &str) -> Self {
        Self::load(root, ignore_file).with_pattern(ignore_file)
    }

    /// Return a copy with one more pattern appended
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        let pattern = pattern.trim();
        if !pattern.is_empty() {
            self.rules.push(Rule::parse(pattern));
            self.patterns.push(pattern.to_string());
        }
        self
    }

    /// Patterns in load order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether `candidate` is excluded, with paths taken relative to `root`
    pub fn is_ignored(&self, candidate: &Path, root: &Path, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let rel_path = relative_slash_path(candidate, root);
        self.is_ignored_relative(&rel_path, is_dir)
    }

    /// Whether an already relative, forward-slash path is excluded
    pub fn is_ignored_relative(&self, rel_path: &str, is_dir: bool) -> bool {
        self.rules.iter().any(|rule| rule.matches(rel_path, is_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use tempfile::tempdir;

    use crate::utils::DEFAULT_IGNORE_FILE;

    #[test]
    fn test_parse_skips_blanks_and_comments() {
        let rules = IgnoreRules::parse("# comment\n\n*.log\n  build/  \n#*.txt\n");
        assert_eq!(rules.patterns(), &["*.log".to_string(), "build/".to_string()]);
    }

    #[test]
    fn test_glob_matches_file_name_and_relative_path() {
        let rules = IgnoreRules::from_patterns(["*.ignore", "docs/*.md"]);
        assert!(rules.is_ignored_relative("file.ignore", false));
        assert!(rules.is_ignored_relative("nested/deep/file.ignore", false));
        assert!(rules.is_ignored_relative("docs/readme.md", false));
        assert!(!rules.is_ignored_relative("src/readme.md", false));
        assert!(!rules.is_ignored_relative("test.txt", false));
    }

    #[test]
    fn test_glob_star_crosses_directories_in_full_path() {
        let rules = IgnoreRules::from_patterns(["docs/*.md"]);
        assert!(rules.is_ignored_relative("docs/api/v1.md", false));
        assert!(rules.is_ignored_relative("docs/a/b/c.md", false));
        assert!(!rules.is_ignored_relative("src/docs/readme.md", false));
        assert!(!rules.is_ignored_relative("docs/api/v1.txt", false));

        let rules = IgnoreRules::from_patterns(["src/*"]);
        assert!(rules.is_ignored_relative("src/deep/mod.rs", false));
        assert!(!rules.is_ignored_relative("lib/src.rs", false));
    }

    #[test]
    fn test_translate_glob() {
        assert_eq!(translate_glob("*.md"), "(?s)^.*\\.md$");
        assert_eq!(translate_glob("a?[!xy]"), "(?s)^a.[^xy]$");
        assert_eq!(translate_glob("[abc"), "(?s)^\\[abc$");
        assert!(Regex::new(&translate_glob("odd[&~]+(x)")).is_ok());
    }

    #[test]
    fn test_glob_character_classes() {
        let rules = IgnoreRules::from_patterns(["file?.[ab]"]);
        assert!(rules.is_ignored_relative("file1.a", false));
        assert!(rules.is_ignored_relative("x/file2.b", false));
        assert!(!rules.is_ignored_relative("file1.c", false));
        assert!(!rules.is_ignored_relative("file12.a", false));
    }

    #[test]
    fn test_directory_pattern_is_segment_equality() {
        let rules = IgnoreRules::from_patterns(["build/"]);
        assert!(rules.is_ignored_relative("build", true));
        assert!(rules.is_ignored_relative("build/out.o", false));
        assert!(rules.is_ignored_relative("sub/build/deep/out.o", false));
        assert!(!rules.is_ignored_relative("build2/out.o", false));
        assert!(!rules.is_ignored_relative("rebuild/out.o", false));
        assert!(!rules.is_ignored_relative("rebuild", true));
        // A plain file called build is not a directory
        assert!(!rules.is_ignored_relative("sub/build", false));
    }

    #[test]
    fn test_multi_segment_directory_pattern() {
        let rules = IgnoreRules::from_patterns(["assets/generated/"]);
        assert!(rules.is_ignored_relative("web/assets/generated/a.js", false));
        assert!(!rules.is_ignored_relative("web/assets/a.js", false));
        assert!(!rules.is_ignored_relative("generated/assets/a.js", false));
    }

    #[test]
    fn test_is_ignored_uses_root_relative_path() {
        let root = PathBuf::from("/tmp/project");
        let rules = IgnoreRules::from_patterns(["sub/"]);
        assert!(rules.is_ignored(&root.join("sub"), &root, true));
        assert!(rules.is_ignored(&root.join("sub").join("b.txt"), &root, false));
        assert!(!rules.is_ignored(&root.join("a.txt"), &root, false));
        // The root's own name never takes part in matching
        let rules = IgnoreRules::from_patterns(["project/"]);
        assert!(!rules.is_ignored(&root.join("a.txt"), &root, false));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let rules = IgnoreRules::load(dir.path(), DEFAULT_IGNORE_FILE);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_load_unreadable_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        // A directory in place of the ignore file cannot be read as text
        fs::create_dir(dir.path().join(DEFAULT_IGNORE_FILE)).unwrap();
        let rules = IgnoreRules::load(dir.path(), DEFAULT_IGNORE_FILE);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_for_collection_adds_self_exclusion() {
        let dir = tempdir().unwrap();
        let rules = IgnoreRules::for_collection(dir.path(), DEFAULT_IGNORE_FILE);
        assert_eq!(rules.patterns(), &[DEFAULT_IGNORE_FILE.to_string()]);
        assert!(rules.is_ignored(
            &dir.path().join(DEFAULT_IGNORE_FILE),
            dir.path(),
            false
        ));

        fs::write(dir.path().join(DEFAULT_IGNORE_FILE), "*.ignore\n").unwrap();
        let rules = IgnoreRules::for_collection(dir.path(), DEFAULT_IGNORE_FILE);
        assert_eq!(
            rules.patterns(),
            &["*.ignore".to_string(), DEFAULT_IGNORE_FILE.to_string()]
        );
    }
}
