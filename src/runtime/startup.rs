use std::env;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config;
use crate::library::{self, SharedTrack};

/// Library root: first CLI argument, else `[library] root`, else the
/// working directory.
pub fn library_root(settings: &config::Settings) -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Load the library at `root`. A broken listing leaves the library empty
/// rather than stopping the app.
pub fn load_library(root: &Path, settings: &config::Settings) -> Vec<SharedTrack> {
    let listing = library::open_listing(root, &settings.library);
    match listing.list_tracks() {
        Ok(tracks) => {
            info!(count = tracks.len(), root = %root.display(), "library loaded");
            tracks
        }
        Err(e) => {
            warn!(error = %e, root = %root.display(), "failed to load library");
            Vec::new()
        }
    }
}
