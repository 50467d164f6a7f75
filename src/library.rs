//! Music library: the track model, track-listing providers and the
//! locator resolver the player uses to find media files.
//!
//! A library root either carries a TOML manifest describing artists and
//! tracks, or is scanned as a plain directory of audio files.

use std::path::Path;

use tracing::{debug, info};

use crate::config::LibrarySettings;

mod error;
mod manifest;
mod model;
mod resolve;
mod scan;

pub use error::{LibraryError, ResolveError};
pub use manifest::ManifestListing;
pub use model::*;
pub use resolve::{LibraryRoot, LocatorResolver};
pub use scan::DirectoryListing;

/// Source of the tracks a session can browse and queue.
pub trait TrackListing {
    fn list_tracks(&self) -> Result<Vec<SharedTrack>, LibraryError>;
}

/// Pick the listing for `root`: the manifest when present, else a directory scan.
pub fn open_listing(root: &Path, settings: &LibrarySettings) -> Box<dyn TrackListing> {
    let manifest = root.join(&settings.manifest);
    if manifest.is_file() {
        info!(path = %manifest.display(), "using library manifest");
        Box::new(ManifestListing::new(root, manifest))
    } else {
        debug!(root = %root.display(), "no manifest, scanning directory");
        Box::new(DirectoryListing::new(root, settings.clone()))
    }
}

#[cfg(test)]
mod tests;
