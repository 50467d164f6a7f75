//! TOML library manifest.
//!
//! ```toml
//! [[artists]]
//! id = 1
//! name = "Nova"
//! genre = "synthwave"
//!
//! [[tracks]]
//! id = 10
//! name = "Night Drive"
//! artist_id = 1
//! file_path = "nova/night-drive.mp3"
//! secondary_file_path = "nova/night-drive-acoustic.mp3"
//! lyrics_file = "nova/night-drive.txt"
//! duration_secs = 215
//! ```
//!
//! A track names its artist either with `artist_id` (a profile from
//! `[[artists]]`) or with a plain `artist` string.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::error::LibraryError;
use super::model::{Artist, ArtistRef, SharedTrack, Track, TrackId};
use super::TrackListing;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Manifest {
    artists: Vec<ArtistEntry>,
    tracks: Vec<TrackEntry>,
}

#[derive(Debug, Deserialize)]
struct ArtistEntry {
    id: u64,
    name: String,
    genre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    id: TrackId,
    name: String,
    artist: Option<String>,
    artist_id: Option<u64>,
    file_path: String,
    secondary_file_path: Option<String>,
    lyrics: Option<String>,
    lyrics_file: Option<String>,
    duration_secs: Option<u64>,
}

/// Lists tracks from a manifest file; locators are relative to `root`.
pub struct ManifestListing {
    root: PathBuf,
    path: PathBuf,
}

impl ManifestListing {
    pub fn new(root: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            path: path.into(),
        }
    }
}

impl TrackListing for ManifestListing {
    fn list_tracks(&self) -> Result<Vec<SharedTrack>, LibraryError> {
        let text = fs::read_to_string(&self.path).map_err(|source| LibraryError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_manifest(&text, &self.path, &self.root)
    }
}

pub(super) fn parse_manifest(
    text: &str,
    path: &Path,
    root: &Path,
) -> Result<Vec<SharedTrack>, LibraryError> {
    let manifest: Manifest = toml::from_str(text).map_err(|source| LibraryError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;

    let artists: HashMap<u64, Artist> = manifest
        .artists
        .into_iter()
        .map(|a| {
            (
                a.id,
                Artist {
                    id: a.id,
                    name: a.name,
                    genre: a.genre,
                },
            )
        })
        .collect();

    let mut seen = HashSet::new();
    let mut tracks = Vec::with_capacity(manifest.tracks.len());

    for entry in manifest.tracks {
        if !seen.insert(entry.id) {
            return Err(LibraryError::DuplicateId(entry.id));
        }

        let artist = match entry.artist_id {
            Some(artist_id) => {
                let Some(profile) = artists.get(&artist_id).cloned() else {
                    return Err(LibraryError::UnknownArtist {
                        track: entry.id,
                        artist: artist_id,
                    });
                };
                ArtistRef::Profile(profile)
            }
            None => ArtistRef::Name(entry.artist.unwrap_or_default()),
        };

        let lyrics = match (entry.lyrics, entry.lyrics_file) {
            (Some(inline), _) => Some(inline),
            (None, Some(file)) => {
                let lyrics_path = root.join(&file);
                let text = fs::read_to_string(&lyrics_path).map_err(|source| {
                    LibraryError::Io {
                        path: lyrics_path,
                        source,
                    }
                })?;
                Some(text.trim().to_string())
            }
            (None, None) => None,
        };

        tracks.push(Arc::new(Track {
            id: entry.id,
            name: entry.name,
            artist,
            file_path: entry.file_path,
            secondary_file_path: entry.secondary_file_path,
            lyrics,
            duration: entry.duration_secs.map(Duration::from_secs),
        }));
    }

    Ok(tracks)
}
