//! Embedded upload markers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prior-upload metadata embedded on an office file
///
/// When an office file already carries a marker, the router short-circuits
/// straight to opening the existing remote document instead of uploading
/// again. Markers are stamped onto restored originals for exactly that
/// reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMarker {
    pub document_url: String,
    pub account_id: String,
    pub account_email: String,
    pub uploaded_at: DateTime<Utc>,
    pub tool_version: String,
}
