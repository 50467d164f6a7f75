//! Application model types: `App`, `Pane` and `PlaybackState`.
//!
//! The `App` struct holds the library listing, the selections in both panes
//! and the view flags used by the UI and runtime. Player state itself lives
//! in the audio thread and is read through the attached `PlaybackHandle`.

use crate::audio::{PlaybackHandle, PlayerSnapshot};
use crate::library::SharedTrack;

/// The playback state shown to the user and reported over MPRIS.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    /// Nothing current is `Stopped`; otherwise the playing flag decides.
    pub fn from_snapshot(snapshot: &PlayerSnapshot) -> Self {
        match (snapshot.current(), snapshot.transport.playing) {
            (None, _) => Self::Stopped,
            (Some(_), true) => Self::Playing,
            (Some(_), false) => Self::Paused,
        }
    }
}

/// Which list has keyboard focus.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Pane {
    #[default]
    Library,
    Queue,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<SharedTrack>,
    /// Selection in the library pane.
    pub selected: usize,
    /// Selection in the queue pane.
    pub queue_selected: usize,
    pub focus: Pane,
    pub expanded: bool,
    pub lyrics_window: bool,
    pub playback_handle: Option<PlaybackHandle>,
    pub current_dir: Option<String>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<SharedTrack>) -> Self {
        Self {
            tracks,
            selected: 0,
            queue_selected: 0,
            focus: Pane::Library,
            expanded: false,
            lyrics_window: false,
            playback_handle: None,
            current_dir: None,
        }
    }

    /// Attach a `PlaybackHandle` used to observe the player.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    /// Record the library directory in the app state.
    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    /// Latest published player state, or an empty one when detached.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|s| s.clone()))
            .unwrap_or_default()
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&SharedTrack> {
        self.tracks.get(self.selected)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Library => Pane::Queue,
            Pane::Queue => Pane::Library,
        };
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn toggle_lyrics_window(&mut self) {
        self.lyrics_window = !self.lyrics_window;
    }

    /// Move the focused pane's selection down, stopping at the last row.
    pub fn next(&mut self, queue_len: usize) {
        let (sel, len) = self.focused_mut(queue_len);
        if *sel + 1 < len {
            *sel += 1;
        }
    }

    /// Move the focused pane's selection up, stopping at the first row.
    pub fn prev(&mut self, queue_len: usize) {
        let (sel, _) = self.focused_mut(queue_len);
        *sel = sel.saturating_sub(1);
    }

    pub fn select_top(&mut self, queue_len: usize) {
        let (sel, _) = self.focused_mut(queue_len);
        *sel = 0;
    }

    pub fn select_bottom(&mut self, queue_len: usize) {
        let (sel, len) = self.focused_mut(queue_len);
        *sel = len.saturating_sub(1);
    }

    /// Keep the queue selection inside a queue that may have shrunk.
    pub fn clamp_queue_selection(&mut self, queue_len: usize) {
        if self.queue_selected >= queue_len {
            self.queue_selected = queue_len.saturating_sub(1);
        }
    }

    fn focused_mut(&mut self, queue_len: usize) -> (&mut usize, usize) {
        match self.focus {
            Pane::Library => (&mut self.selected, self.tracks.len()),
            Pane::Queue => (&mut self.queue_selected, queue_len),
        }
    }
}
