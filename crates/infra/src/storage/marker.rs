//! Embedded upload markers via extended attributes
//!
//! Markers travel with the file itself (an xattr on unix), so a restored or
//! re-downloaded original keeps its link to the remote document without any
//! sidecar bookkeeping. On platforms without extended-attribute support,
//! lookups simply report no marker.

use std::path::Path;

use docrouter_core::ports::UploadMarkerStore;
use docrouter_domain::{DocumentMarker, Result};

#[cfg(unix)]
use docrouter_domain::DocRouterError;

#[cfg(unix)]
const MARKER_ATTRIBUTE: &str = "user.docrouter.upload";

/// Extended-attribute marker store
#[derive(Debug, Default, Clone, Copy)]
pub struct XattrMarkerStore;

impl UploadMarkerStore for XattrMarkerStore {
    #[cfg(unix)]
    fn load(&self, path: &Path) -> Option<DocumentMarker> {
        let raw = xattr::get(path, MARKER_ATTRIBUTE).ok().flatten()?;
        serde_json::from_slice(&raw).ok()
    }

    #[cfg(not(unix))]
    fn load(&self, _path: &Path) -> Option<DocumentMarker> {
        None
    }

    #[cfg(unix)]
    fn save(&self, path: &Path, marker: &DocumentMarker) -> Result<()> {
        let payload = serde_json::to_vec(marker)
            .map_err(|err| DocRouterError::Internal(err.to_string()))?;
        xattr::set(path, MARKER_ATTRIBUTE, &payload)?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn save(&self, _path: &Path, _marker: &DocumentMarker) -> Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn clear(&self, path: &Path) {
        let _ = xattr::remove(path, MARKER_ATTRIBUTE);
    }

    #[cfg(not(unix))]
    fn clear(&self, _path: &Path) {}
}
