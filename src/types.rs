/*!
 * Core types and data structures for catdir
 */

use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;

/// Classification of a file body in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Valid UTF-8 content
    Text,
    /// Anything that fails strict UTF-8 decoding
    Binary,
}

impl ContentKind {
    /// Classify raw bytes: text iff they decode as strict UTF-8
    pub fn classify(content: &[u8]) -> Self {
        if std::str::from_utf8(content).is_ok() {
            ContentKind::Text
        } else {
            ContentKind::Binary
        }
    }
}

/// Ordered mapping from root-relative path to raw file content
///
/// Iteration follows insertion order, which is the walk discovery order.
/// Keys always use forward slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    entries: IndexMap<String, Vec<u8>>,
}

impl FileTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; an existing path keeps its position and gets the new content
    pub fn insert(&mut self, path: impl Into<String>, content: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(path.into(), content)
    }

    /// Content stored for `path`
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Relative paths in discovery order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in discovery order
    pub fn iter(&self) -> Iter<'_, String, Vec<u8>> {
        self.entries.iter()
    }

    /// Total size of all contents in bytes
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|c| c.len() as u64).sum()
    }
}

impl<'a> IntoIterator for &'a FileTree {
    type Item = (&'a String, &'a Vec<u8>);
    type IntoIter = Iter<'a, String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for FileTree {
    type Item = (String, Vec<u8>);
    type IntoIter = IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<u8>)> for FileTree {
    fn from_iter<I: IntoIterator<Item = (K, Vec<u8>)>>(iter: I) -> Self {
        let mut tree = FileTree::new();
        for (path, content) in iter {
            tree.insert(path, content);
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ContentKind::classify(b"hello\n"), ContentKind::Text);
        assert_eq!(ContentKind::classify("héllo".as_bytes()), ContentKind::Text);
        assert_eq!(ContentKind::classify(b""), ContentKind::Text);
        assert_eq!(ContentKind::classify(&[0xff, 0xfe, 0x00]), ContentKind::Binary);
        // Truncated multi-byte sequence
        assert_eq!(ContentKind::classify(&[0xe2, 0x82]), ContentKind::Binary);
    }

    #[test]
    fn test_insert_keeps_order_and_overwrites() {
        let mut tree = FileTree::new();
        tree.insert("b.txt", b"1".to_vec());
        tree.insert("a.txt", b"2".to_vec());
        let previous = tree.insert("b.txt", b"3".to_vec());

        assert_eq!(previous, Some(b"1".to_vec()));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.paths().collect::<Vec<_>>(), vec!["b.txt", "a.txt"]);
        assert_eq!(tree.get("b.txt"), Some(&b"3"[..]));
        assert_eq!(tree.total_bytes(), 2);
    }
}
