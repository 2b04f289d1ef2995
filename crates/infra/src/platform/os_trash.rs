//! OS trash adapter

use std::path::{Path, PathBuf};

use docrouter_core::ports::TrashProvider;
use docrouter_domain::{DocRouterError, Result};
use tracing::debug;

/// Relocates files to the platform trash/recycle facility
///
/// Never a hard delete: whatever the rest of a replacement does, the user
/// can always recover the file through normal OS mechanisms. The trash
/// destination is opaque to the facility, so callers get back the path the
/// file was trashed from.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsTrash;

impl TrashProvider for OsTrash {
    fn trash(&self, path: &Path) -> Result<PathBuf> {
        trash::delete(path).map_err(|err| DocRouterError::Io(err.to_string()))?;
        debug!(path = %path.display(), "file moved to OS trash");
        Ok(path.to_path_buf())
    }
}
