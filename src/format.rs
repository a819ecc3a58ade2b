/*!
 * Wire format shared by the tree writer and the reconstructor
 *
 * Both sides recognize the layout through these constants only; the banner
 * width in particular must never be spelled out anywhere else.
 */

/// Width of every banner line in the stream
pub const LINE_WIDTH: usize = 100;

/// Character used for section banners
pub const SECTION_CHAR: char = '#';
/// Character used for the banner opening a file body
pub const SEPARATOR_CHAR: char = '-';
/// Character used for the banner closing a file body
pub const CLOSING_CHAR: char = '=';

/// Label of the tree listing section
pub const TREE_LABEL: &str = "# TREE:";
/// Label of the file contents section
pub const FILES_LABEL: &str = "# FILES";

/// Marker preceding each file path
pub const FILE_MARKER: &str = ">> File:";
/// Marker preceding each content type
pub const TYPE_MARKER: &str = ">> Type:";

/// Type tag for text bodies
pub const TYPE_TEXT: &str = "text";
/// Type tag for raw binary bodies
pub const TYPE_BINARY: &str = "binary";
/// Type tag for hex-encoded binary bodies
pub const TYPE_BINARY_HEX: &str = "binary/hex";

/// Build a banner line of `ch` repeated to [`LINE_WIDTH`]
pub fn banner(ch: char) -> String {
    std::iter::repeat(ch).take(LINE_WIDTH).collect()
}

/// Whether `line` starts with a full-width banner of `ch`
pub fn is_banner(line: &str, ch: char) -> bool {
    line.len() >= LINE_WIDTH && line.chars().take(LINE_WIDTH).all(|c| c == ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_width() {
        assert_eq!(banner('=').len(), LINE_WIDTH);
        assert!(banner('#').chars().all(|c| c == '#'));
    }

    #[test]
    fn test_is_banner_prefix_match() {
        assert!(is_banner(&banner('-'), '-'));
        assert!(is_banner(&format!("{}---", banner('-')), '-'));
        assert!(!is_banner(&"-".repeat(LINE_WIDTH - 1), '-'));
        assert!(!is_banner(&banner('-'), '='));
    }
}
