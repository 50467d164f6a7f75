//! Keyboard and media-key bindings.
//!
//! Keys become `Action`s first; actions that touch the player are then
//! turned into `PlayerCmd`s against the latest snapshot. Both steps are
//! pure so they can be tested without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Pane, PlaybackState};
use crate::audio::{PlayerCmd, PlayerSnapshot};
use crate::config::Settings;
use crate::mpris::ControlCmd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TogglePlay,
    Prev,
    Next,
    ToggleMute,
    ToggleExpanded,
    SelectNext,
    SelectPrev,
    SelectTop,
    SelectBottom,
    SwitchPane,
    /// Enter: play what is selected in the focused pane.
    Activate,
    AddToQueue,
    RemoveFromQueue,
    ClearQueue,
    ToggleVersion,
    ToggleLyrics,
    VolumeUp,
    VolumeDown,
    SeekForward,
    SeekBack,
    /// Jump to a tenth of the track, 0 to 9.
    SeekTenth(u8),
    Quit,
}

/// Tracks the `g` prefix between key presses.
#[derive(Debug, Default)]
pub struct KeyMap {
    pending_g: bool,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action_for(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.pending_g = false;
            return None;
        }

        if key.code == KeyCode::Char('g') {
            if self.pending_g {
                self.pending_g = false;
                return Some(Action::SelectTop);
            }
            self.pending_g = true;
            return None;
        }
        self.pending_g = false;

        let action = match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => Action::TogglePlay,
            KeyCode::Left | KeyCode::Char('h') => Action::Prev,
            KeyCode::Right | KeyCode::Char('l') => Action::Next,
            KeyCode::Char('m') => Action::ToggleMute,
            KeyCode::Char('f') => Action::ToggleExpanded,
            KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
            KeyCode::Up | KeyCode::Char('k') => Action::SelectPrev,
            KeyCode::Char('G') => Action::SelectBottom,
            KeyCode::Tab => Action::SwitchPane,
            KeyCode::Enter => Action::Activate,
            KeyCode::Char('a') => Action::AddToQueue,
            KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Delete => Action::RemoveFromQueue,
            KeyCode::Char('c') => Action::ClearQueue,
            KeyCode::Char('v') => Action::ToggleVersion,
            KeyCode::Char('y') => Action::ToggleLyrics,
            KeyCode::Char('+') | KeyCode::Char('=') => Action::VolumeUp,
            KeyCode::Char('-') => Action::VolumeDown,
            KeyCode::Char('L') => Action::SeekForward,
            KeyCode::Char('H') => Action::SeekBack,
            KeyCode::Char(c @ '0'..='9') => Action::SeekTenth(c as u8 - b'0'),
            KeyCode::Char('q') => Action::Quit,
            _ => return None,
        };
        Some(action)
    }
}

/// The player command for `action`, if it has one.
pub fn player_command(
    action: Action,
    app: &App,
    snapshot: &PlayerSnapshot,
    settings: &Settings,
) -> Option<PlayerCmd> {
    match action {
        Action::TogglePlay => start_or_toggle(app, snapshot),
        Action::Prev => Some(PlayerCmd::Prev),
        Action::Next => Some(PlayerCmd::Next),
        Action::ToggleMute => Some(PlayerCmd::ToggleMute),
        Action::Activate => match app.focus {
            Pane::Library => play_from_selection(app),
            Pane::Queue => snapshot
                .queue
                .get(app.queue_selected)
                .cloned()
                .map(PlayerCmd::PlaySong),
        },
        Action::AddToQueue => match app.focus {
            // Queue entries stay unique by track id.
            Pane::Library => app
                .selected_track()
                .filter(|track| !snapshot.queue.iter().any(|q| q.id == track.id))
                .cloned()
                .map(PlayerCmd::AddToQueue),
            Pane::Queue => None,
        },
        Action::RemoveFromQueue => match app.focus {
            Pane::Queue if app.queue_selected < snapshot.queue.len() => {
                Some(PlayerCmd::RemoveFromQueue(app.queue_selected))
            }
            _ => None,
        },
        Action::ClearQueue => Some(PlayerCmd::ClearQueue),
        Action::ToggleVersion => Some(PlayerCmd::ToggleVersion),
        Action::VolumeUp => Some(PlayerCmd::SetVolume(
            snapshot.transport.volume + settings.audio.volume_step,
        )),
        Action::VolumeDown => Some(PlayerCmd::SetVolume(
            snapshot.transport.volume - settings.audio.volume_step,
        )),
        Action::SeekForward => Some(PlayerCmd::SeekBy(seek_secs(settings))),
        Action::SeekBack => Some(PlayerCmd::SeekBy(-seek_secs(settings))),
        Action::SeekTenth(n) => Some(PlayerCmd::Seek(f64::from(n) / 10.0)),
        Action::ToggleExpanded
        | Action::SelectNext
        | Action::SelectPrev
        | Action::SelectTop
        | Action::SelectBottom
        | Action::SwitchPane
        | Action::ToggleLyrics
        | Action::Quit => None,
    }
}

/// The player command for an MPRIS request. `Quit` is handled by the caller.
pub fn control_command(
    cmd: &ControlCmd,
    app: &App,
    snapshot: &PlayerSnapshot,
) -> Option<PlayerCmd> {
    let playback = PlaybackState::from_snapshot(snapshot);
    match cmd {
        ControlCmd::Play => match playback {
            PlaybackState::Playing => None,
            _ => start_or_toggle(app, snapshot),
        },
        // Stop only pauses: the queue stays as it is.
        ControlCmd::Pause | ControlCmd::Stop => match playback {
            PlaybackState::Playing => Some(PlayerCmd::TogglePlay),
            _ => None,
        },
        ControlCmd::PlayPause => start_or_toggle(app, snapshot),
        ControlCmd::Next => Some(PlayerCmd::Next),
        ControlCmd::Prev => Some(PlayerCmd::Prev),
        ControlCmd::Quit => None,
    }
}

/// Toggle the current track; with nothing current, start the queue or,
/// failing that, the library from the selection.
fn start_or_toggle(app: &App, snapshot: &PlayerSnapshot) -> Option<PlayerCmd> {
    if snapshot.current().is_some() {
        Some(PlayerCmd::TogglePlay)
    } else if !snapshot.queue.is_empty() {
        Some(PlayerCmd::Next)
    } else {
        play_from_selection(app)
    }
}

fn play_from_selection(app: &App) -> Option<PlayerCmd> {
    if !app.has_tracks() {
        return None;
    }
    Some(PlayerCmd::PlayFrom {
        tracks: app.tracks.clone(),
        start: app.selected.min(app.tracks.len() - 1),
    })
}

fn seek_secs(settings: &Settings) -> i64 {
    settings.controls.seek_seconds.min(i64::MAX as u64) as i64
}
