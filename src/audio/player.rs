use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::config::AudioSettings;
use crate::library::LocatorResolver;

use super::engine::PlayerEngine;
use super::media::MediaResource;
use super::thread::RodioMedia;
use super::types::{MediaListener, MediaNotice, PlaybackHandle, PlayerCmd, PlayerSnapshot};

/// Everything the player thread reacts to arrives through one inbox, so
/// commands and media notices are applied strictly in arrival order.
enum Inbox {
    Cmd(PlayerCmd),
    Media(MediaNotice),
}

/// Owns the player thread. The engine lives on that thread; callers talk to
/// it with `PlayerCmd`s and observe it through the published snapshot.
pub struct AudioPlayer {
    tx: Sender<Inbox>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(resolver: Box<dyn LocatorResolver>, settings: &AudioSettings) -> Self {
        let tick = Duration::from_millis(settings.tick_ms.max(1));
        Self::with_media(resolver, settings.initial_volume, move |listener| {
            RodioMedia::spawn(listener, tick)
        })
    }

    /// Run the player against the backend returned by `build`, which receives
    /// the listener its notices must go to.
    pub fn with_media<M, F>(
        resolver: Box<dyn LocatorResolver>,
        initial_volume: f32,
        build: F,
    ) -> Self
    where
        M: MediaResource + 'static,
        F: FnOnce(MediaListener) -> M + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Inbox>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlayerSnapshot::default()));

        let notice_tx = tx.clone();
        let listener: MediaListener = Box::new(move |notice| {
            // The player thread may already be gone during shutdown.
            let _ = notice_tx.send(Inbox::Media(notice));
        });

        let published = playback.clone();
        let join = thread::spawn(move || {
            let media = build(listener);
            let mut engine = PlayerEngine::new(media, resolver, initial_volume);
            publish(&published, engine.snapshot());

            while let Ok(msg) = rx.recv() {
                match msg {
                    Inbox::Cmd(PlayerCmd::Quit { fade_out_ms }) => {
                        debug!(fade_out_ms, "player quitting");
                        engine.shutdown(Duration::from_millis(fade_out_ms));
                        publish(&published, engine.snapshot());
                        break;
                    }
                    Inbox::Cmd(cmd) => engine.apply(cmd),
                    Inbox::Media(notice) => engine.handle_media(notice),
                }
                publish(&published, engine.snapshot());
            }
            debug!("player thread exiting");
        });

        Self {
            tx,
            playback,
            join: Mutex::new(Some(join)),
        }
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: PlayerCmd) {
        if self.tx.send(Inbox::Cmd(cmd)).is_err() {
            warn!("player thread is gone; command dropped");
        }
    }

    /// Fade out, stop the backend and wait for the player thread to finish.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.tx.send(Inbox::Cmd(PlayerCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        }));

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                if h.join().is_err() {
                    error!("player thread panicked");
                }
            }
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.quit_softly(Duration::ZERO);
    }
}

fn publish(handle: &PlaybackHandle, snapshot: PlayerSnapshot) {
    match handle.lock() {
        Ok(mut guard) => *guard = snapshot,
        Err(poisoned) => *poisoned.into_inner() = snapshot,
    }
}
