use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

/// Identifier of a track. Two tracks with the same id are the same track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An artist profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub id: u64,
    pub name: String,
    pub genre: Option<String>,
}

/// How a track refers to its artist: a bare name or a full profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtistRef {
    Name(String),
    Profile(Artist),
}

impl ArtistRef {
    pub fn display_name(&self) -> &str {
        let name = match self {
            ArtistRef::Name(n) => n.as_str(),
            ArtistRef::Profile(a) => a.name.as_str(),
        };
        let name = name.trim();
        if name.is_empty() { "Unknown Artist" } else { name }
    }
}

/// Which of a track's media locators is in use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Primary,
    Secondary,
}

impl Variant {
    pub fn flipped(self) -> Self {
        match self {
            Variant::Primary => Variant::Secondary,
            Variant::Secondary => Variant::Primary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub artist: ArtistRef,
    /// Primary media locator.
    pub file_path: String,
    /// Alternate recording of the same song, if any.
    pub secondary_file_path: Option<String>,
    pub lyrics: Option<String>,
    pub duration: Option<Duration>,
}

impl Track {
    /// Locator for `variant`, or `None` when the track has no such version.
    pub fn locator(&self, variant: Variant) -> Option<&str> {
        match variant {
            Variant::Primary => Some(self.file_path.as_str()),
            Variant::Secondary => self.secondary_file_path.as_deref(),
        }
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary_file_path.is_some()
    }

    /// "Artist - Name", as shown in lists.
    pub fn display(&self) -> String {
        format!("{} - {}", self.artist.display_name(), self.name)
    }
}

pub type SharedTrack = Arc<Track>;
