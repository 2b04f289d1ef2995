//! Upload request/response types

use serde::{Deserialize, Serialize};

use super::classification::FileKind;

/// Google Workspace format an office file converts into on upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionTarget {
    Spreadsheet,
    Document,
}

impl ConversionTarget {
    /// Target Google Workspace mime type for the converted document.
    #[must_use]
    pub fn google_mime_type(self) -> &'static str {
        match self {
            Self::Spreadsheet => "application/vnd.google-apps.spreadsheet",
            Self::Document => "application/vnd.google-apps.document",
        }
    }

    /// Mime type the original bytes are uploaded as.
    #[must_use]
    pub fn upload_content_type(self) -> &'static str {
        match self {
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Document => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// Conversion target for an office file kind; shortcuts have none.
    #[must_use]
    pub fn for_kind(kind: FileKind) -> Option<Self> {
        match kind {
            FileKind::Spreadsheet => Some(Self::Spreadsheet),
            FileKind::Document => Some(Self::Document),
            FileKind::Shortcut => None,
        }
    }
}

/// Result of a successful upload-and-convert call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    /// Remote document id
    pub remote_id: String,
    /// Browser URL of the remote document
    pub remote_view_url: String,
}
