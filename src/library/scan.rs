use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::error::LibraryError;
use super::model::{ArtistRef, SharedTrack, Track, TrackId};
use super::TrackListing;

/// Lists tracks by walking a directory tree and reading tags.
pub struct DirectoryListing {
    root: PathBuf,
    settings: LibrarySettings,
}

impl DirectoryListing {
    pub fn new(root: impl Into<PathBuf>, settings: LibrarySettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }
}

impl TrackListing for DirectoryListing {
    fn list_tracks(&self) -> Result<Vec<SharedTrack>, LibraryError> {
        if !self.root.is_dir() {
            return Err(LibraryError::MissingRoot(self.root.clone()));
        }
        Ok(scan(&self.root, &self.settings))
    }
}

fn normalized_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_audio_file(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Split `song.alt` into `song` when `marker` is `alt`.
fn strip_marker<'a>(stem: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    let (base, tail) = stem.rsplit_once('.')?;
    (tail.eq_ignore_ascii_case(marker) && !base.is_empty()).then_some(base)
}

/// Locator of `path` relative to `root`, with `/` separators.
fn locator_for(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn sidecar_lyrics(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path.with_extension("txt")).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

struct Scanned {
    path: PathBuf,
    name: String,
    artist: Option<String>,
    duration: Option<Duration>,
}

fn read_tags(path: &Path) -> Scanned {
    let mut name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist: Option<String> = None;
    let mut duration: Option<Duration> = None;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration = Some(tagged.properties().duration());

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    name = v.trim().to_string();
                }
            }
            if let Some(v) = tag.artist() {
                let v = v.trim();
                if !v.is_empty() {
                    artist = Some(v.to_string());
                }
            }
        }
    }

    Scanned {
        path: path.to_path_buf(),
        name,
        artist,
        duration,
    }
}

pub fn scan(root: &Path, settings: &LibrarySettings) -> Vec<SharedTrack> {
    let exts = normalized_extensions(settings);
    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let files: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_audio_file(p, &exts))
        .collect();

    // Index primaries by (dir, lowercase stem) so alternates can find them.
    let mut primaries: HashMap<(PathBuf, String), usize> = HashMap::new();
    let mut alternates: Vec<(PathBuf, String, PathBuf)> = Vec::new();
    let mut scanned: Vec<Scanned> = Vec::new();

    for path in files {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        if let Some(base) = strip_marker(&stem, &settings.secondary_marker) {
            alternates.push((dir, base.to_ascii_lowercase(), path));
            continue;
        }

        primaries.insert((dir, stem.to_ascii_lowercase()), scanned.len());
        scanned.push(read_tags(&path));
    }

    let mut secondary: HashMap<usize, PathBuf> = HashMap::new();
    for (dir, base, path) in alternates {
        match primaries.get(&(dir, base)) {
            Some(&i) => {
                secondary.insert(i, path);
            }
            // An alternate without its primary is still a playable song.
            None => scanned.push(read_tags(&path)),
        }
    }

    let mut tracks: Vec<Track> = scanned
        .into_iter()
        .enumerate()
        .map(|(i, s)| Track {
            id: TrackId(0),
            name: s.name,
            artist: ArtistRef::Name(s.artist.unwrap_or_default()),
            file_path: locator_for(root, &s.path),
            secondary_file_path: secondary.get(&i).map(|p| locator_for(root, p)),
            lyrics: sidecar_lyrics(&s.path),
            duration: s.duration,
        })
        .collect();

    tracks.sort_by_key(|t| t.display().to_lowercase());
    tracks
        .into_iter()
        .enumerate()
        .map(|(i, mut t)| {
            t.id = TrackId(i as u64 + 1);
            Arc::new(t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let exts = normalized_extensions(&LibrarySettings::default());
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &exts));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &exts));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &exts));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &exts));
        assert!(!is_audio_file(Path::new("/tmp/a"), &exts));
    }

    #[test]
    fn strip_marker_only_matches_trailing_marker() {
        assert_eq!(strip_marker("song.alt", "alt"), Some("song"));
        assert_eq!(strip_marker("song.ALT", "alt"), Some("song"));
        assert_eq!(strip_marker("my.song.alt", "alt"), Some("my.song"));
        assert_eq!(strip_marker("alt.song", "alt"), None);
        assert_eq!(strip_marker("song", "alt"), None);
        assert_eq!(strip_marker(".alt", "alt"), None);
        assert_eq!(strip_marker("song.alt", ""), None);
    }

    #[test]
    fn scan_filters_non_audio_sorts_and_assigns_ids() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "A");
        assert_eq!(tracks[0].id, TrackId(1));
        assert_eq!(tracks[0].file_path, "A.ogg");
        assert_eq!(tracks[0].artist.display_name(), "Unknown Artist");
        assert_eq!(tracks[1].name, "b");
        assert_eq!(tracks[1].id, TrackId(2));
    }

    #[test]
    fn scan_pairs_alternate_versions_and_sidecar_lyrics() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("album");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("song.mp3"), b"not real").unwrap();
        fs::write(sub.join("song.alt.mp3"), b"not real").unwrap();
        fs::write(sub.join("song.txt"), "la la la\n").unwrap();
        fs::write(sub.join("lonely.alt.mp3"), b"not real").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 2);

        let song = tracks.iter().find(|t| t.name == "song").unwrap();
        assert_eq!(song.file_path, "album/song.mp3");
        assert_eq!(song.secondary_file_path.as_deref(), Some("album/song.alt.mp3"));
        assert_eq!(song.lyrics.as_deref(), Some("la la la"));

        let lonely = tracks.iter().find(|t| t.name == "lonely.alt").unwrap();
        assert!(lonely.secondary_file_path.is_none());
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "visible");
    }

    #[test]
    fn scan_respects_recursive_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "root");
    }

    #[test]
    fn directory_listing_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let listing = DirectoryListing::new(dir.path().join("nope"), LibrarySettings::default());
        assert!(matches!(
            listing.list_tracks(),
            Err(LibraryError::MissingRoot(_))
        ));
    }
}
