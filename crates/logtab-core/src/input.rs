//! Whole-file input helpers shared by both parsers.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ParseError, Result};

/// Read the whole log file into memory.
pub fn read_log(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ParseError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => ParseError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Lines of `text` with surrounding whitespace of the whole text removed,
/// paired with their 1-based line number in the input text.
///
/// Whitespace-only input yields no lines. Interior blank lines are kept.
pub fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let trimmed = text.trim();
    let leading = text.len() - text.trim_start().len();
    let offset = text[..leading].matches('\n').count();

    let lines = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.split('\n'))
    };

    lines
        .into_iter()
        .flatten()
        .enumerate()
        .map(move |(idx, line)| (idx + 1 + offset, line.strip_suffix('\r').unwrap_or(line)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_numbered_lines_skips_outer_blank_lines() {
        let lines: Vec<_> = numbered_lines("\n\na\nb\n\n").collect();
        assert_eq!(lines, vec![(3, "a"), (4, "b")]);
    }

    #[test]
    fn test_numbered_lines_keeps_interior_blank() {
        let lines: Vec<_> = numbered_lines("a\n\nb").collect();
        assert_eq!(lines, vec![(1, "a"), (2, ""), (3, "b")]);
    }

    #[test]
    fn test_numbered_lines_strips_carriage_return() {
        let lines: Vec<_> = numbered_lines("a\r\nb\r\n").collect();
        assert_eq!(lines, vec![(1, "a"), (2, "b")]);
    }

    #[test]
    fn test_numbered_lines_empty_input() {
        assert_eq!(numbered_lines("  \n\t\n").count(), 0);
        assert_eq!(numbered_lines("").count(), 0);
    }

    #[test]
    fn test_read_log_missing_file() {
        let err = read_log(Path::new("/definitely/not/here.log")).unwrap_err();
        assert!(matches!(err, ParseError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_log_reads_contents() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "time:x").unwrap();
        assert_eq!(read_log(file.path()).unwrap(), "time:x");
    }
}
