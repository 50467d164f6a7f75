//! Audio-related small types and handles.
//!
//! This module defines the command vocabulary of the player, the events a
//! media backend reports, and the snapshot shared with the UI.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::{SharedTrack, Variant};

use super::error::PlayerError;

/// Identifies one load of a media locator into the backend.
///
/// Every load gets a fresh generation; events tagged with any other token
/// belong to a superseded load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadToken {
    pub generation: u64,
    pub locator: String,
}

/// Events reported by a media backend.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Decoded far enough to start playing.
    Ready,
    PlayStarted,
    Paused,
    Position(Duration),
    DurationKnown(Duration),
    /// The track played through to its end.
    Ended,
    /// The environment refused to start playback.
    PlayRejected(String),
    /// The source failed to open or decode.
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaNotice {
    pub token: LoadToken,
    pub event: MediaEvent,
}

/// Receives every notice a backend emits. Installed when the backend is built.
pub type MediaListener = Box<dyn Fn(MediaNotice) + Send + 'static>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing is loaded.
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Playback state as last reported by the media backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportState {
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub variant: Variant,
    pub status: LoadStatus,
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            playing: false,
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
            variant: Variant::Primary,
            status: LoadStatus::Idle,
        }
    }
}

impl TransportState {
    /// Fraction of the track played so far, when the duration is known.
    pub fn progress(&self) -> Option<f64> {
        let total = self.duration?.as_secs_f64();
        if total <= 0.0 {
            return None;
        }
        Some((self.position.as_secs_f64() / total).clamp(0.0, 1.0))
    }

    pub fn is_muted(&self) -> bool {
        self.volume == 0.0
    }
}

#[derive(Debug)]
pub enum PlayerCmd {
    /// Append a track to the end of the queue.
    AddToQueue(SharedTrack),
    /// Remove the queue entry at the given position.
    RemoveFromQueue(usize),
    /// Make the track current, queueing it first if needed, and play it.
    PlaySong(SharedTrack),
    /// Replace the queue with `tracks[start..]` and play `tracks[start]`.
    PlayFrom {
        tracks: Vec<SharedTrack>,
        start: usize,
    },
    Next,
    Prev,
    ClearQueue,
    TogglePlay,
    /// Seek to a fraction (0.0 to 1.0) of the track.
    Seek(f64),
    /// Seek by the specified number of seconds (positive or negative).
    SeekBy(i64),
    SetVolume(f32),
    ToggleMute,
    /// Switch between the primary and secondary recording.
    ToggleVersion,
    /// Stop the player thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Read-only view of the engine, published after every change.
#[derive(Debug, Clone, Default)]
pub struct PlayerSnapshot {
    pub queue: Vec<SharedTrack>,
    /// `None` when nothing is selected.
    pub cursor: Option<usize>,
    pub transport: TransportState,
    pub last_error: Option<PlayerError>,
}

impl PlayerSnapshot {
    pub fn current(&self) -> Option<&SharedTrack> {
        self.cursor.and_then(|i| self.queue.get(i))
    }

    /// The cursor with `-1` standing in for "nothing selected".
    pub fn cursor_index(&self) -> isize {
        self.cursor.map_or(-1, |i| i as isize)
    }
}

pub type PlaybackHandle = Arc<Mutex<PlayerSnapshot>>;
