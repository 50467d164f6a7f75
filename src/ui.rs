//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock, time::Duration};

use crate::app::{App, Pane, PlaybackState};
use crate::audio::{LoadStatus, PlayerSnapshot};
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{Artist, ArtistRef, Variant};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("tab".to_string(), "switch pane".to_string());
    map.insert("enter".to_string(), "play selected".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next song".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "seek to %".to_string());
    map.insert("a".to_string(), "queue".to_string());
    map.insert("d".to_string(), "unqueue".to_string());
    map.insert("c".to_string(), "clear queue".to_string());
    map.insert("v".to_string(), "version".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("m".to_string(), "mute".to_string());
    map.insert("f".to_string(), "expand".to_string());
    map.insert("y".to_string(), "lyrics".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "gg/G", "tab", "enter", "space/p", "h/l", "H/L", "0-9", "a", "d", "c", "v", "+/-",
        "m", "f", "y", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] seek -/+{}s", seek_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(
    elapsed: Duration,
    total: Option<Duration>,
    ui: &UiSettings,
) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => {
                if let Some(t) = total {
                    parts.push(format_mmss(t));
                }
            }
            TimeField::Remaining => {
                if let Some(t) = total {
                    let rem = t.saturating_sub(elapsed);
                    parts.push(format!("-{}", format_mmss(rem)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Rows `start..end` to render so `selected` sits near the middle, and the
/// selection's offset inside that window.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    let selected = selected.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn state_label(snapshot: &PlayerSnapshot) -> &'static str {
    match snapshot.transport.status {
        LoadStatus::Loading => "Loading",
        LoadStatus::Failed => "Unplayable",
        LoadStatus::Idle | LoadStatus::Ready => match PlaybackState::from_snapshot(snapshot) {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        },
    }
}

fn volume_label(volume: f32) -> String {
    if volume == 0.0 {
        "muted".to_string()
    } else {
        format!("{:.0}%", volume * 100.0)
    }
}

fn now_playing_lines(snapshot: &PlayerSnapshot, ui: &UiSettings, expanded: bool) -> Vec<String> {
    let transport = &snapshot.transport;
    let Some(track) = snapshot.current() else {
        let mut lines = vec!["Nothing playing".to_string()];
        if let Some(err) = &snapshot.last_error {
            lines.push(format!("! {err}"));
        }
        return lines;
    };

    let mut head = format!("{} • {}", track.name, track.artist.display_name());
    if transport.variant == Variant::Secondary {
        head.push_str(" [alt]");
    }

    let mut status = vec![state_label(snapshot).to_string()];
    if let Some(time) = now_playing_time_text(transport.position, transport.duration, ui) {
        status.push(time);
    }
    status.push(format!("vol {}", volume_label(transport.volume)));
    if track.has_secondary() {
        status.push("v: switch version".to_string());
    }

    let mut lines = vec![head, status.join(" • ")];
    if let Some(err) = &snapshot.last_error {
        lines.push(format!("! {err}"));
    }
    if expanded {
        if let ArtistRef::Profile(Artist {
            genre: Some(genre), ..
        }) = &track.artist
        {
            lines.push(format!("Genre: {genre}"));
        }
        lines.push(format!(
            "Queue: {} of {}",
            snapshot.cursor_index() + 1,
            snapshot.queue.len()
        ));
        if track.lyrics.is_some() {
            lines.push("y: show lyrics".to_string());
        }
    }
    lines
}

fn padded_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: String,
    rows: Vec<String>,
    selected: usize,
    focused: bool,
) {
    // Only build ListItems for the visible window.
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, sel_in_visible) = visible_window(rows.len(), height, selected);
    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .map(|r| ListItem::new(r.as_str()))
        .collect();

    let highlight = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(highlight)
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(sel_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    snapshot: &PlayerSnapshot,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let now_playing_height = if app.expanded { 10 } else { 6 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(now_playing_height),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Now playing: text above a progress gauge.
    let np_block = padded_block(" now playing ");
    let np_inner = np_block.inner(chunks[1]);
    frame.render_widget(np_block, chunks[1]);
    let np_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(np_inner);

    let text = now_playing_lines(snapshot, ui_settings, app.expanded).join("\n");
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), np_rows[0]);

    let ratio = snapshot.transport.progress().unwrap_or(0.0);
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(format!("{:.0}%", ratio * 100.0));
    frame.render_widget(gauge, np_rows[1]);

    // Library | queue
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[2]);

    let library_rows: Vec<String> = app.tracks.iter().map(|t| t.display()).collect();
    let library_title = match &app.current_dir {
        Some(dir) => format!(" library ({}) • {} ", app.tracks.len(), dir),
        None => format!(" library ({}) ", app.tracks.len()),
    };
    render_list(
        frame,
        panes[0],
        library_title,
        library_rows,
        app.selected,
        app.focus == Pane::Library,
    );

    let queue_rows: Vec<String> = snapshot
        .queue
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if snapshot.cursor == Some(i) { "♪ " } else { "  " };
            format!("{marker}{}", t.display())
        })
        .collect();
    render_list(
        frame,
        panes[1],
        format!(" queue ({}) ", snapshot.queue.len()),
        queue_rows,
        app.queue_selected,
        app.focus == Pane::Queue,
    );

    // Lyrics overlay (keeps the lists visible under it)
    if app.lyrics_window {
        let popup_area = centered_rect_sized(72, 20, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let lyrics = match snapshot.current() {
            Some(t) => t
                .lyrics
                .clone()
                .unwrap_or_else(|| format!("No lyrics for {}", t.name)),
            None => "Nothing playing".to_string(),
        };
        let popup = Paragraph::new(lyrics)
            .block(padded_block(" lyrics (y closes) "))
            .wrap(Wrap { trim: false });
        frame.render_widget(popup, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.seek_seconds))
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Track, TrackId};
    use std::sync::Arc;

    #[test]
    fn time_text_follows_configured_fields() {
        let mut ui = UiSettings::default();
        ui.now_playing_time_fields = vec![TimeField::Elapsed, TimeField::Remaining];
        let text = now_playing_time_text(
            Duration::from_secs(65),
            Some(Duration::from_secs(185)),
            &ui,
        );
        assert_eq!(text.as_deref(), Some("01:05 / -02:00"));

        ui.now_playing_time_fields = vec![TimeField::Total];
        assert_eq!(now_playing_time_text(Duration::ZERO, None, &ui), None);
    }

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
        assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
        assert_eq!(visible_window(100, 10, 98), (90, 100, 8));
        assert_eq!(visible_window(0, 10, 0), (0, 0, 0));
    }

    #[test]
    fn controls_text_includes_seek_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] seek -/+7s"));
        assert!(text.contains("[q] quit"));
    }

    #[test]
    fn now_playing_marks_secondary_and_errors() {
        let track = Arc::new(Track {
            id: TrackId(1),
            name: "Song".into(),
            artist: ArtistRef::Name("Band".into()),
            file_path: "a.mp3".into(),
            secondary_file_path: Some("a.alt.mp3".into()),
            lyrics: None,
            duration: None,
        });
        let mut snap = PlayerSnapshot::default();
        snap.queue = vec![track];
        snap.cursor = Some(0);
        snap.transport.variant = Variant::Secondary;
        snap.transport.volume = 0.0;
        snap.last_error = Some(crate::audio::PlayerError::PlaybackRejected("denied".into()));

        let lines = now_playing_lines(&snap, &UiSettings::default(), false);
        assert_eq!(lines[0], "Song • Band [alt]");
        assert!(lines[1].contains("vol muted"));
        assert!(lines.iter().any(|l| l.contains("denied")));
    }

    #[test]
    fn expanded_now_playing_shows_queue_position() {
        let track = |id: u64| {
            Arc::new(Track {
                id: TrackId(id),
                name: format!("Song {id}"),
                artist: ArtistRef::Name("Band".into()),
                file_path: format!("{id}.mp3"),
                secondary_file_path: None,
                lyrics: None,
                duration: None,
            })
        };
        let mut snap = PlayerSnapshot::default();
        snap.queue = vec![track(1), track(2), track(3)];
        snap.cursor = Some(1);

        let lines = now_playing_lines(&snap, &UiSettings::default(), true);
        assert!(lines.iter().any(|l| l == "Queue: 2 of 3"));
        let compact = now_playing_lines(&snap, &UiSettings::default(), false);
        assert!(!compact.iter().any(|l| l.starts_with("Queue:")));
    }
}
