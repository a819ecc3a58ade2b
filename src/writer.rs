/*!
 * Text stream writer for collected file trees
 */

use std::io::{self, Write};

use crate::config::BinaryEncoding;
use crate::format::{
    banner, CLOSING_CHAR, FILES_LABEL, FILE_MARKER, LINE_WIDTH, SECTION_CHAR, SEPARATOR_CHAR,
    TREE_LABEL, TYPE_BINARY, TYPE_BINARY_HEX, TYPE_MARKER, TYPE_TEXT,
};
use crate::types::{ContentKind, FileTree};

/// Serializes a [`FileTree`] into the catdir stream format
#[derive(Debug, Clone, Default)]
pub struct TreeWriter {
    /// Encoding used for binary bodies
    binary_encoding: BinaryEncoding,
}

impl TreeWriter {
    /// Create a new writer
    pub fn new(binary_encoding: BinaryEncoding) -> Self {
        Self { binary_encoding }
    }

    /// Render the whole stream into memory
    pub fn render(&self, tree: &FileTree) -> Vec<u8> {
        let mut out = Vec::with_capacity(tree.total_bytes() as usize + 512);
        self.write_to(tree, &mut out)
            .expect("writing to a Vec cannot fail");
        out
    }

    /// Write the stream to `out`, one entry at a time
    pub fn write_to<W: Write>(&self, tree: &FileTree, out: &mut W) -> io::Result<()> {
        let section = banner(SECTION_CHAR);

        writeln!(out, "{}", section)?;
        writeln!(out, "{}", TREE_LABEL)?;
        writeln!(out, "{}", section)?;
        for path in tree.paths() {
            writeln!(out, "{}", path)?;
        }

        writeln!(out, "{}", section)?;
        writeln!(out, "{}", FILES_LABEL)?;
        writeln!(out, "{}", section)?;

        let separator = banner(SEPARATOR_CHAR);
        let closing = banner(CLOSING_CHAR);
        for (path, content) in tree {
            let kind = ContentKind::classify(content);
            writeln!(out, "{} {}", FILE_MARKER, path)?;
            writeln!(out, "{} {}", TYPE_MARKER, self.type_tag(kind))?;
            writeln!(out, "{}", separator)?;
            self.write_body(kind, content, out)?;
            writeln!(out)?;
            writeln!(out, "{}", closing)?;
        }

        out.flush()
    }

    fn type_tag(&self, kind: ContentKind) -> &'static str {
        match (kind, self.binary_encoding) {
            (ContentKind::Text, _) => TYPE_TEXT,
            (ContentKind::Binary, BinaryEncoding::Raw) => TYPE_BINARY,
            (ContentKind::Binary, BinaryEncoding::Hex) => TYPE_BINARY_HEX,
        }
    }

    fn write_body<W: Write>(&self, kind: ContentKind, content: &[u8], out: &mut W) -> io::Result<()> {
        match (kind, self.binary_encoding) {
            (ContentKind::Text, _) => {
                out.write_all(String::from_utf8_lossy(content).as_bytes())
            }
            (ContentKind::Binary, BinaryEncoding::Raw) => out.write_all(content),
            (ContentKind::Binary, BinaryEncoding::Hex) => {
                let encoded = hex::encode(content);
                let mut lines = encoded.as_bytes().chunks(LINE_WIDTH).peekable();
                while let Some(line) = lines.next() {
                    out.write_all(line)?;
                    if lines.peek().is_some() {
                        out.write_all(b"\n")?;
                    }
                }
                Ok(())
            }
        }
    }
}
