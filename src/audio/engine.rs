//! The queue/player engine.
//!
//! `PlayerEngine` owns the queue, its cursor and the transport state, and
//! drives exactly one `MediaResource`. It never assumes a request to the
//! resource succeeded: the playing flag, position and duration only change
//! when the resource reports them.
//!
//! Each change of the current track starts a new load with a fresh
//! `LoadToken` and arms the auto-play flag. The first `Ready` for that token
//! starts playback and disarms the flag, so later `Ready`s (after a seek)
//! do not restart it. Notices carrying any other token are dropped.

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::library::{LocatorResolver, SharedTrack, Variant};

use super::error::PlayerError;
use super::media::MediaResource;
use super::queue::PlayQueue;
use super::types::{
    LoadStatus, LoadToken, MediaEvent, MediaNotice, PlayerCmd, PlayerSnapshot, TransportState,
};

pub struct PlayerEngine<M: MediaResource> {
    queue: PlayQueue,
    media: M,
    resolver: Box<dyn LocatorResolver>,
    transport: TransportState,
    generation: u64,
    active: Option<LoadToken>,
    autoplay: bool,
    unmuted_volume: f32,
    last_error: Option<PlayerError>,
}

impl<M: MediaResource> PlayerEngine<M> {
    pub fn new(mut media: M, resolver: Box<dyn LocatorResolver>, initial_volume: f32) -> Self {
        let volume = initial_volume.clamp(0.0, 1.0);
        media.set_volume(volume);
        Self {
            queue: PlayQueue::new(),
            media,
            resolver,
            transport: TransportState {
                volume,
                ..TransportState::default()
            },
            generation: 0,
            active: None,
            autoplay: false,
            unmuted_volume: if volume > 0.0 { volume } else { 1.0 },
            last_error: None,
        }
    }

    pub fn queue(&self) -> &PlayQueue {
        &self.queue
    }

    pub fn cursor(&self) -> Option<usize> {
        self.queue.cursor()
    }

    pub fn current_track(&self) -> Option<&SharedTrack> {
        self.queue.current()
    }

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn last_error(&self) -> Option<&PlayerError> {
        self.last_error.as_ref()
    }

    /// Token of the load the engine currently listens to.
    pub fn active_load(&self) -> Option<&LoadToken> {
        self.active.as_ref()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            queue: self.queue.items().to_vec(),
            cursor: self.queue.cursor(),
            transport: self.transport.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Dispatch a command. `Quit` is the owner's business and is ignored here.
    pub fn apply(&mut self, cmd: PlayerCmd) {
        match cmd {
            PlayerCmd::AddToQueue(track) => self.add_to_queue(track),
            PlayerCmd::RemoveFromQueue(index) => self.remove_from_queue(index),
            PlayerCmd::PlaySong(track) => self.play_song(track),
            PlayerCmd::PlayFrom { tracks, start } => self.play_from(&tracks, start),
            PlayerCmd::Next => self.next_song(),
            PlayerCmd::Prev => self.prev_song(),
            PlayerCmd::ClearQueue => self.clear_queue(),
            PlayerCmd::TogglePlay => self.toggle_play(),
            PlayerCmd::Seek(fraction) => self.seek(fraction),
            PlayerCmd::SeekBy(secs) => self.seek_by(secs),
            PlayerCmd::SetVolume(level) => self.set_volume(level),
            PlayerCmd::ToggleMute => self.toggle_mute(),
            PlayerCmd::ToggleVersion => self.toggle_version(),
            PlayerCmd::Quit { .. } => {}
        }
    }

    pub fn add_to_queue(&mut self, track: SharedTrack) {
        debug!(track = %track.id, "queued");
        self.queue.add(track);
    }

    pub fn remove_from_queue(&mut self, index: usize) {
        let was_current = self.queue.cursor() == Some(index);
        match self.queue.remove(index) {
            Some(track) => {
                debug!(track = %track.id, index, "removed from queue");
                if was_current {
                    self.unload();
                }
            }
            None => self.record(PlayerError::InvalidIndex {
                index,
                len: self.queue.len(),
            }),
        }
    }

    pub fn play_song(&mut self, track: SharedTrack) {
        let index = self.queue.select_or_append(track);
        debug!(index, "play song");
        self.load_current();
    }

    /// Replace the queue with `listing[start..]` and play its first entry.
    pub fn play_from(&mut self, listing: &[SharedTrack], start: usize) {
        let Some(first) = listing.get(start).cloned() else {
            self.record(PlayerError::InvalidIndex {
                index: start,
                len: listing.len(),
            });
            return;
        };
        self.queue.replace(listing[start..].to_vec());
        self.play_song(first);
    }

    pub fn next_song(&mut self) {
        if self.queue.advance() {
            self.load_current();
        }
    }

    pub fn prev_song(&mut self) {
        if self.queue.retreat() {
            self.load_current();
        }
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.unload();
    }

    pub fn toggle_play(&mut self) {
        if self.queue.current().is_none() {
            return;
        }
        match self.transport.status {
            // Not started yet: play as soon as the pending load is ready.
            LoadStatus::Loading => self.autoplay = true,
            LoadStatus::Failed | LoadStatus::Idle => self.start_load(true),
            LoadStatus::Ready if self.transport.playing => self.media.pause(),
            LoadStatus::Ready => self.media.play(),
        }
    }

    /// Jump to `fraction` of the track. Out-of-range fractions are clamped.
    pub fn seek(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            debug!(fraction, "ignoring non-finite seek");
            return;
        }
        if self.queue.current().is_none() {
            return;
        }
        let Some(total) = self.transport.duration else {
            debug!("seek before duration is known");
            return;
        };
        let to = total.mul_f64(fraction.clamp(0.0, 1.0));
        debug!(?to, "seek");
        self.media.seek(to);
    }

    pub fn seek_by(&mut self, secs: i64) {
        let Some(total) = self.transport.duration else {
            return;
        };
        if total.is_zero() {
            return;
        }
        let target = self.transport.position.as_secs_f64() + secs as f64;
        self.seek(target / total.as_secs_f64());
    }

    pub fn set_volume(&mut self, level: f32) {
        if !level.is_finite() {
            return;
        }
        let level = level.clamp(0.0, 1.0);
        self.transport.volume = level;
        if level > 0.0 {
            self.unmuted_volume = level;
        }
        self.media.set_volume(level);
    }

    /// Zero means muted; unmuting restores the last audible level.
    pub fn toggle_mute(&mut self) {
        if self.transport.volume > 0.0 {
            self.unmuted_volume = self.transport.volume;
            self.set_volume(0.0);
        } else {
            self.set_volume(self.unmuted_volume);
        }
    }

    pub fn toggle_version(&mut self) {
        let Some(track) = self.queue.current() else {
            return;
        };
        if !track.has_secondary() {
            return;
        }
        let resume = self.transport.playing
            || (self.transport.status == LoadStatus::Loading && self.autoplay);
        self.transport.variant = self.transport.variant.flipped();
        debug!(variant = ?self.transport.variant, resume, "toggle version");
        self.start_load(resume);
    }

    pub fn handle_media(&mut self, notice: MediaNotice) {
        if self.active.as_ref() != Some(&notice.token) {
            trace!(
                generation = notice.token.generation,
                locator = %notice.token.locator,
                event = ?notice.event,
                "stale media event ignored"
            );
            return;
        }

        match notice.event {
            MediaEvent::Ready => {
                self.transport.status = LoadStatus::Ready;
                if self.autoplay {
                    self.autoplay = false;
                    self.media.play();
                }
            }
            MediaEvent::PlayStarted => {
                self.transport.playing = true;
                self.last_error = None;
            }
            MediaEvent::Paused => self.transport.playing = false,
            MediaEvent::Position(position) => self.transport.position = position,
            MediaEvent::DurationKnown(total) => self.transport.duration = Some(total),
            MediaEvent::Ended => {
                self.transport.playing = false;
                debug!("track ended");
                self.next_song();
            }
            MediaEvent::PlayRejected(reason) => {
                warn!(%reason, "playback rejected");
                self.transport.playing = false;
                self.autoplay = false;
                self.record(PlayerError::PlaybackRejected(reason));
            }
            MediaEvent::Error(reason) => {
                warn!(locator = %notice.token.locator, %reason, "media failed to load");
                self.transport.status = LoadStatus::Failed;
                self.transport.playing = false;
                self.autoplay = false;
                self.record(PlayerError::ResourceLoadFailure {
                    locator: notice.token.locator,
                    reason,
                });
            }
        }
    }

    /// Stop the backend for good.
    pub fn shutdown(&mut self, fade_out: Duration) {
        self.active = None;
        self.autoplay = false;
        self.media.shutdown(fade_out);
        self.transport.playing = false;
    }

    /// The current track changed: load its primary version and auto-play.
    fn load_current(&mut self) {
        self.transport.variant = Variant::Primary;
        self.start_load(true);
    }

    fn start_load(&mut self, autoplay: bool) {
        let Some(track) = self.queue.current().cloned() else {
            self.unload();
            return;
        };
        let locator = track
            .locator(self.transport.variant)
            .unwrap_or(track.file_path.as_str())
            .to_string();

        self.generation += 1;
        let token = LoadToken {
            generation: self.generation,
            locator: locator.clone(),
        };
        self.active = Some(token.clone());
        self.autoplay = autoplay;
        self.transport.playing = false;
        self.transport.position = Duration::ZERO;
        self.transport.duration = track.duration;
        self.transport.status = LoadStatus::Loading;

        match self.resolver.resolve(&locator) {
            Ok(path) => {
                debug!(
                    track = %track.id,
                    generation = token.generation,
                    path = %path.display(),
                    "loading"
                );
                self.media.load(token, path);
            }
            Err(e) => {
                warn!(track = %track.id, %locator, error = %e, "could not resolve media");
                self.media.stop();
                self.transport.status = LoadStatus::Failed;
                self.autoplay = false;
                self.record(PlayerError::ResourceLoadFailure {
                    locator,
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Nothing is current: detach the backend and reset the transport.
    fn unload(&mut self) {
        self.generation += 1;
        self.active = None;
        self.autoplay = false;
        self.media.stop();
        self.transport = TransportState {
            volume: self.transport.volume,
            ..TransportState::default()
        };
        debug!("unloaded");
    }

    fn record(&mut self, err: PlayerError) {
        debug!(error = %err, "recorded");
        self.last_error = Some(err);
    }
}
