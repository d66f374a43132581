use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::manifest::Manifest;

/// Find the nearest directory at or above `start` whose manifest declares workspaces.
///
/// Directories are probed one at a time, innermost first, and the walk stops at the
/// filesystem root. A manifest that is missing, unreadable or malformed just means the
/// directory is not the root. `start` is expected to be absolute.
pub async fn locate_root(start: &Path) -> Option<PathBuf> {
    debug!("Searching for workspace root from {}", start.display());
    for dir in start.ancestors() {
        match Manifest::from_dir(dir).await {
            Ok(manifest) if manifest.declares_workspaces() => {
                debug!("Found workspace root: {}", dir.display());
                return Some(dir.to_path_buf());
            }
            Ok(_) => trace!("{} has no workspaces", dir.display()),
            Err(e) => trace!("Skipping {}: {e}", dir.display()),
        }
    }
    None
}
