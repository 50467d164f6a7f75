use std::sync::mpsc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::audio::{AudioPlayer, PlayerSnapshot};
use crate::config;
use crate::library::LocatorResolver;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::keys::{self, Action, KeyMap};
use crate::runtime::mpris_sync::MprisMirror;
use crate::ui;

/// Everything the loop needs besides the terminal and the app model.
pub struct Services<'a> {
    pub settings: &'a config::Settings,
    pub audio_player: &'a AudioPlayer,
    pub mpris: &'a MprisHandle,
    pub control_rx: &'a mpsc::Receiver<ControlCmd>,
    pub resolver: &'a dyn LocatorResolver,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    keys: KeyMap,
    mirror: MprisMirror,
}

/// Main terminal event loop: handles input, UI drawing and MPRIS sync.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    services: &Services<'_>,
    state: &mut EventLoopState,
) -> anyhow::Result<()> {
    loop {
        let snapshot = app.snapshot();
        app.clamp_queue_selection(snapshot.queue.len());

        // Keep MPRIS in sync even when playback changes come from media keys or auto-advance.
        state
            .mirror
            .sync(services.mpris, &snapshot, services.resolver);

        terminal
            .draw(|f| {
                ui::draw(
                    f,
                    app,
                    &snapshot,
                    &services.settings.ui,
                    &services.settings.controls,
                )
            })
            .context("drawing frame")?;

        while let Ok(cmd) = services.control_rx.try_recv() {
            debug!(?cmd, "MPRIS control");
            if cmd == ControlCmd::Quit {
                quit(services);
                return Ok(());
            }
            if let Some(player_cmd) = keys::control_command(&cmd, app, &snapshot) {
                services.audio_player.send(player_cmd);
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, &snapshot, services, state) {
                    return Ok(());
                }
            }
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    snapshot: &PlayerSnapshot,
    services: &Services<'_>,
    state: &mut EventLoopState,
) -> bool {
    let Some(action) = state.keys.action_for(key) else {
        return false;
    };
    let queue_len = snapshot.queue.len();

    match action {
        Action::Quit => {
            quit(services);
            return true;
        }
        Action::SelectNext => app.next(queue_len),
        Action::SelectPrev => app.prev(queue_len),
        Action::SelectTop => app.select_top(queue_len),
        Action::SelectBottom => app.select_bottom(queue_len),
        Action::SwitchPane => app.toggle_focus(),
        Action::ToggleExpanded => app.toggle_expanded(),
        Action::ToggleLyrics => app.toggle_lyrics_window(),
        _ => {}
    }

    if let Some(cmd) = keys::player_command(action, app, snapshot, services.settings) {
        services.audio_player.send(cmd);
    }
    false
}

fn quit(services: &Services<'_>) {
    services
        .audio_player
        .quit_softly(Duration::from_millis(services.settings.audio.quit_fade_out_ms));
}
