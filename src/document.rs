use ignore::WalkBuilder;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

/// Maps byte offsets of one text snapshot to character offsets and
/// line/column positions.
pub struct LineIndex<'a> {
    text: &'a str,
    // byte offset of each line start
    line_starts: Vec<usize>,
    // char offset of each line start
    char_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        let mut char_starts = vec![0];

        for (chars, (byte, ch)) in text.char_indices().enumerate() {
            if ch == '\n' {
                line_starts.push(byte + 1);
                char_starts.push(chars + 1);
            }
        }

        Self {
            text,
            line_starts,
            char_starts,
        }
    }

    /// Position of a byte offset. Offsets past the end clamp to the end; the
    /// offset must fall on a char boundary.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = self.text[self.line_starts[line]..offset].chars().count();

        Position { line, column }
    }

    /// Character index of a byte offset.
    pub fn char_offset(&self, offset: usize) -> usize {
        let pos = self.position(offset);
        self.char_starts[pos.line] + pos.column
    }

    /// Text of a zero-based line without its terminator.
    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\r'))
    }
}

/// Whether a file's extension is one of `extensions` (case-insensitive).
pub fn is_supported(path: &Path, extensions: &[String]) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext))
}

/// Expand the given paths into files to check.
///
/// Files named explicitly are always kept. Directories are walked honouring
/// ignore files, keeping only supported extensions.
pub fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkBuilder::new(path).build() {
            match entry {
                Ok(entry) => {
                    let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
                    if is_file && is_supported(entry.path(), extensions) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => log::warn!("skipping entry under {}: {}", path.display(), e),
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_positions_count_characters() {
        let text = "第一行\n请帮忙处理";
        let index = LineIndex::new(text);
        let offset = text.find("帮忙").unwrap();

        assert_eq!(index.position(0), Position { line: 0, column: 0 });
        assert_eq!(index.position(offset), Position { line: 1, column: 1 });
        assert_eq!(index.char_offset(offset), 5);
        assert_eq!(index.line_text(1), Some("请帮忙处理"));
        assert_eq!(index.line_text(2), None);
    }

    #[test]
    fn test_position_clamps_to_end() {
        let index = LineIndex::new("ab\n");
        assert_eq!(index.position(100), Position { line: 1, column: 0 });
    }

    #[test]
    fn test_line_text() {
        let index = LineIndex::new("一\r\n二\n三");
        assert_eq!(index.line_text(0), Some("一"));
        assert_eq!(index.line_text(1), Some("二"));
        assert_eq!(index.line_text(2), Some("三"));
        assert_eq!(index.line_text(3), None);
    }

    #[test]
    fn test_extension_filter() {
        let exts = vec!["md".to_string(), "txt".to_string()];
        assert!(is_supported(Path::new("notes.MD"), &exts));
        assert!(is_supported(Path::new("a/b.txt"), &exts));
        assert!(!is_supported(Path::new("main.rs"), &exts));
        assert!(!is_supported(Path::new("README"), &exts));
    }

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("sub").join("b.txt"), "").unwrap();
        fs::write(dir.path().join("c.rs"), "").unwrap();
        let explicit = dir.path().join("c.rs");

        let exts = vec!["md".to_string(), "txt".to_string()];
        let files = collect_files(&[dir.path().to_path_buf(), explicit.clone()], &exts);

        assert_eq!(files.len(), 3);
        assert!(files.contains(&explicit));
        assert!(files.iter().any(|f| f.ends_with("b.txt")));
    }
}
