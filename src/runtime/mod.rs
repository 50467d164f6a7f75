use std::sync::mpsc;

use anyhow::Context;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::library::LibraryRoot;
use crate::logging;
use crate::mpris::ControlCmd;

mod event_loop;
mod keys;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> anyhow::Result<()> {
    let (settings, config_problem) = settings::load_settings();

    match logging::init_logging(&settings.logging) {
        Ok(_) => settings::report(config_problem),
        Err(e) => {
            // Nowhere to log to yet; the terminal is still ours.
            eprintln!("encore: logging disabled: {e:#}");
            if let Some(msg) = config_problem {
                eprintln!("encore: {msg}");
            }
        }
    }

    let root = startup::library_root(&settings);
    let tracks = startup::load_library(&root, &settings);

    let resolver = LibraryRoot::new(root.clone());
    let audio_player = AudioPlayer::new(Box::new(resolver.clone()), &settings.audio);

    let mut app = App::new(tracks);
    app.expanded = settings.ui.start_expanded;
    app.set_current_dir(resolver.path().display().to_string());
    app.set_playback_handle(audio_player.playback_handle());

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    info!("session started");

    let services = event_loop::Services {
        settings: &settings,
        audio_player: &audio_player,
        mpris: &mpris,
        control_rx: &control_rx,
        resolver: &resolver,
    };
    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, &mut app, &services, &mut state);
    if let Err(e) = &run_result {
        warn!(error = %e, "event loop failed");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("session ended");

    run_result
}
