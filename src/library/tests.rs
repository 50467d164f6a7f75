use super::manifest::parse_manifest;
use super::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const MANIFEST: &str = r#"
[[artists]]
id = 1
name = "Nova"
genre = "synthwave"

[[tracks]]
id = 10
name = "Night Drive"
artist_id = 1
file_path = "nova/night-drive.mp3"
secondary_file_path = "nova/night-drive-acoustic.mp3"
lyrics = "headlights on"
duration_secs = 215

[[tracks]]
id = 11
name = "Loose Change"
artist = "Street Band"
file_path = "street/loose-change.mp3"
"#;

#[test]
fn manifest_keeps_order_and_resolves_artist_profiles() {
    let tracks = parse_manifest(MANIFEST, Path::new("library.toml"), Path::new("/music")).unwrap();
    assert_eq!(tracks.len(), 2);

    let first = &tracks[0];
    assert_eq!(first.id, TrackId(10));
    assert_eq!(first.artist.display_name(), "Nova");
    let ArtistRef::Profile(profile) = &first.artist else {
        panic!("expected an artist profile, got {:?}", first.artist);
    };
    assert_eq!(profile.genre.as_deref(), Some("synthwave"));
    assert_eq!(first.locator(Variant::Secondary), Some("nova/night-drive-acoustic.mp3"));
    assert_eq!(first.lyrics.as_deref(), Some("headlights on"));
    assert_eq!(first.duration, Some(std::time::Duration::from_secs(215)));

    let second = &tracks[1];
    assert_eq!(second.artist, ArtistRef::Name("Street Band".into()));
    assert_eq!(second.locator(Variant::Secondary), None);
    assert_eq!(second.display(), "Street Band - Loose Change");
}

#[test]
fn manifest_rejects_duplicate_ids() {
    let text = r#"
[[tracks]]
id = 1
name = "A"
file_path = "a.mp3"

[[tracks]]
id = 1
name = "B"
file_path = "b.mp3"
"#;
    let err = parse_manifest(text, Path::new("m.toml"), Path::new("/")).unwrap_err();
    assert!(matches!(err, LibraryError::DuplicateId(TrackId(1))));
}

#[test]
fn manifest_rejects_unknown_artist_id() {
    let text = r#"
[[tracks]]
id = 3
name = "A"
artist_id = 99
file_path = "a.mp3"
"#;
    let err = parse_manifest(text, Path::new("m.toml"), Path::new("/")).unwrap_err();
    assert!(matches!(
        err,
        LibraryError::UnknownArtist {
            track: TrackId(3),
            artist: 99
        }
    ));
}

#[test]
fn manifest_reads_lyrics_file_relative_to_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("words.txt"), "  verse one\n").unwrap();
    fs::write(
        dir.path().join("library.toml"),
        r#"
[[tracks]]
id = 1
name = "A"
file_path = "a.mp3"
lyrics_file = "words.txt"
"#,
    )
    .unwrap();

    let listing = open_listing(dir.path(), &crate::config::LibrarySettings::default());
    let tracks = listing.list_tracks().unwrap();
    assert_eq!(tracks[0].lyrics.as_deref(), Some("verse one"));
}

#[test]
fn open_listing_falls_back_to_directory_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("song.mp3"), b"not real").unwrap();

    let listing = open_listing(dir.path(), &crate::config::LibrarySettings::default());
    let tracks = listing.list_tracks().unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].file_path, "song.mp3");
}

#[test]
fn artist_display_name_falls_back_for_blank_names() {
    assert_eq!(ArtistRef::Name("   ".into()).display_name(), "Unknown Artist");
    assert_eq!(ArtistRef::Name(" Ada ".into()).display_name(), "Ada");
}

#[test]
fn library_root_resolves_relative_and_rejects_missing() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("x")).unwrap();
    fs::write(dir.path().join("x/song.mp3"), b"not real").unwrap();

    let root = LibraryRoot::new(dir.path());
    assert_eq!(root.path(), dir.path());
    assert_eq!(
        root.resolve("x/song.mp3").unwrap(),
        dir.path().join("x/song.mp3")
    );
    assert_eq!(root.resolve("  "), Err(ResolveError::Empty));
    assert!(matches!(
        root.resolve("x/missing.mp3"),
        Err(ResolveError::NotFound(_))
    ));

    let absolute = dir.path().join("x/song.mp3");
    assert_eq!(root.resolve(absolute.to_str().unwrap()).unwrap(), absolute);
}
