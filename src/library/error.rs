use std::path::PathBuf;

use thiserror::Error;

use super::model::TrackId;

/// Failures while building a track listing.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("library root {0:?} does not exist")]
    MissingRoot(PathBuf),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("track id {0} appears more than once")]
    DuplicateId(TrackId),

    #[error("track {track} references unknown artist {artist}")]
    UnknownArtist { track: TrackId, artist: u64 },
}

/// Failures while turning a stored locator into a playable path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("empty media locator")]
    Empty,

    #[error("media file not found: {0:?}")]
    NotFound(PathBuf),
}
