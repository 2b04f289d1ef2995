//! File classification by extension

use std::path::Path;

use crate::constants::SHORTCUT_EXTENSION;

/// Kinds of files the router recognizes
///
/// Anything outside this set is silently ignored by the router — no event is
/// emitted for unrecognized files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// An office spreadsheet (`.xlsx` / `.xls`)
    Spreadsheet,
    /// An office word-processing document (`.docx` / `.doc`)
    Document,
    /// A previously written shortcut file (`.gdoc`)
    Shortcut,
}

impl FileKind {
    /// Classify a path by its extension, case-insensitively.
    ///
    /// Returns `None` for unrecognized extensions (and for paths with no
    /// extension at all).
    #[must_use]
    pub fn classify(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            ext if ext == SHORTCUT_EXTENSION => Some(Self::Shortcut),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            "docx" | "doc" => Some(Self::Document),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for classification.
    use std::path::PathBuf;

    use super::*;

    /// Validates `FileKind::classify` behavior for the recognized extensions
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms spreadsheet, document, and shortcut extensions classify to
    ///   their kinds.
    /// - Ensures classification is case-insensitive.
    #[test]
    fn classify_recognized_extensions() {
        assert_eq!(FileKind::classify(Path::new("report.xlsx")), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::classify(Path::new("old.XLS")), Some(FileKind::Spreadsheet));
        assert_eq!(FileKind::classify(Path::new("notes.docx")), Some(FileKind::Document));
        assert_eq!(FileKind::classify(Path::new("memo.DOC")), Some(FileKind::Document));
        assert_eq!(FileKind::classify(Path::new("report.xlsx.gdoc")), Some(FileKind::Shortcut));
    }

    /// Validates `FileKind::classify` behavior for the unrecognized input
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures unknown extensions, bare names, and directories classify to
    ///   `None`.
    #[test]
    fn classify_rejects_unrecognized() {
        assert_eq!(FileKind::classify(Path::new("archive.zip")), None);
        assert_eq!(FileKind::classify(Path::new("README")), None);
        assert_eq!(FileKind::classify(&PathBuf::from("/tmp/dir/")), None);
    }
}
