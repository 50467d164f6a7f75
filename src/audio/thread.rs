//! The rodio-backed media resource.
//!
//! A dedicated thread owns the output stream and the current sink. The
//! `RodioMedia` handle forwards requests over a channel; the thread answers
//! with `MediaNotice`s through the listener, tagged with the token of the
//! load they refer to.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use super::media::MediaResource;
use super::sink::{create_sink_at, probe};
use super::types::{LoadToken, MediaEvent, MediaListener, MediaNotice};

const NO_OUTPUT_DEVICE: &str = "no audio output device";

enum MediaCmd {
    Load { token: LoadToken, path: PathBuf },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Stop,
    Shutdown { fade_out_ms: u64 },
}

/// Handle to the audio thread. Dropping it shuts the thread down.
pub struct RodioMedia {
    tx: Sender<MediaCmd>,
    join: Option<JoinHandle<()>>,
}

impl RodioMedia {
    pub fn spawn(listener: MediaListener, tick: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<MediaCmd>();
        let join = spawn_media_thread(rx, listener, tick);
        Self {
            tx,
            join: Some(join),
        }
    }

    fn send(&self, cmd: MediaCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("audio thread is gone; dropping request");
        }
    }
}

impl MediaResource for RodioMedia {
    fn load(&mut self, token: LoadToken, source: PathBuf) {
        self.send(MediaCmd::Load {
            token,
            path: source,
        });
    }

    fn play(&mut self) {
        self.send(MediaCmd::Play);
    }

    fn pause(&mut self) {
        self.send(MediaCmd::Pause);
    }

    fn seek(&mut self, to: Duration) {
        self.send(MediaCmd::Seek(to));
    }

    fn set_volume(&mut self, level: f32) {
        self.send(MediaCmd::SetVolume(level));
    }

    fn stop(&mut self) {
        self.send(MediaCmd::Stop);
    }

    fn shutdown(&mut self, fade_out: Duration) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.tx.send(MediaCmd::Shutdown {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        if join.join().is_err() {
            error!("audio thread panicked");
        }
    }
}

impl Drop for RodioMedia {
    fn drop(&mut self) {
        self.shutdown(Duration::ZERO);
    }
}

/// What the thread currently has loaded.
struct Loaded {
    token: LoadToken,
    path: PathBuf,
    /// `None` when there is no output device.
    sink: Option<Sink>,
    playing: bool,
    finished: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Loaded {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

fn spawn_media_thread(
    rx: Receiver<MediaCmd>,
    listener: MediaListener,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream: Option<OutputStream> = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in
                // debugging, but noisy for a TUI app.
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                error!(error = %e, "failed to open audio output");
                None
            }
        };

        let emit = |token: &LoadToken, event: MediaEvent| {
            listener(MediaNotice {
                token: token.clone(),
                event,
            });
        };

        let mut current: Option<Loaded> = None;
        let mut volume: f32 = 1.0;

        loop {
            match rx.recv_timeout(tick) {
                Ok(MediaCmd::Load { token, path }) => {
                    if let Some(old) = current.take() {
                        if let Some(s) = old.sink {
                            s.stop();
                        }
                    }

                    let opened = match stream.as_ref() {
                        Some(stream) => create_sink_at(stream, &path, Duration::ZERO, volume)
                            .map(|(sink, total)| (Some(sink), total)),
                        None => probe(&path).map(|total| (None, total)),
                    };

                    match opened {
                        Ok((sink, total)) => {
                            debug!(generation = token.generation, "loaded");
                            if let Some(total) = total {
                                emit(&token, MediaEvent::DurationKnown(total));
                            }
                            emit(&token, MediaEvent::Ready);
                            current = Some(Loaded {
                                token,
                                path,
                                sink,
                                playing: false,
                                finished: false,
                                started_at: None,
                                accumulated: Duration::ZERO,
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "load failed");
                            emit(&token, MediaEvent::Error(e.to_string()));
                        }
                    }
                }

                Ok(MediaCmd::Play) => {
                    let Some(l) = current.as_mut() else {
                        continue;
                    };
                    if l.playing {
                        continue;
                    }
                    let Some(stream) = stream.as_ref() else {
                        emit(&l.token, MediaEvent::PlayRejected(NO_OUTPUT_DEVICE.into()));
                        continue;
                    };

                    // Playing a finished track starts it over.
                    if l.finished {
                        match create_sink_at(stream, &l.path, Duration::ZERO, volume) {
                            Ok((sink, _)) => {
                                l.sink = Some(sink);
                                l.finished = false;
                                l.accumulated = Duration::ZERO;
                            }
                            Err(e) => {
                                emit(&l.token, MediaEvent::Error(e.to_string()));
                                continue;
                            }
                        }
                    }

                    if let Some(s) = l.sink.as_ref() {
                        s.play();
                        l.playing = true;
                        l.started_at = Some(Instant::now());
                        emit(&l.token, MediaEvent::PlayStarted);
                    }
                }

                Ok(MediaCmd::Pause) => {
                    let Some(l) = current.as_mut() else {
                        continue;
                    };
                    if !l.playing {
                        continue;
                    }
                    if let Some(s) = l.sink.as_ref() {
                        s.pause();
                    }
                    l.accumulated = l.elapsed();
                    l.started_at = None;
                    l.playing = false;
                    emit(&l.token, MediaEvent::Paused);
                }

                Ok(MediaCmd::Seek(to)) => {
                    // Rebuild the current sink and skip into the file.
                    let Some(l) = current.as_mut() else {
                        continue;
                    };
                    let Some(stream) = stream.as_ref() else {
                        continue;
                    };
                    if let Some(s) = l.sink.as_ref() {
                        s.stop();
                    }
                    match create_sink_at(stream, &l.path, to, volume) {
                        Ok((sink, _)) => {
                            if l.playing {
                                sink.play();
                                l.started_at = Some(Instant::now());
                            } else {
                                l.started_at = None;
                            }
                            l.sink = Some(sink);
                            l.accumulated = to;
                            l.finished = false;
                            emit(&l.token, MediaEvent::Position(to));
                        }
                        Err(e) => {
                            l.sink = None;
                            l.playing = false;
                            emit(&l.token, MediaEvent::Error(e.to_string()));
                        }
                    }
                }

                Ok(MediaCmd::SetVolume(level)) => {
                    volume = level;
                    if let Some(s) = current.as_ref().and_then(|l| l.sink.as_ref()) {
                        s.set_volume(level);
                    }
                }

                Ok(MediaCmd::Stop) => {
                    if let Some(s) = current.take().and_then(|l| l.sink) {
                        s.stop();
                    }
                }

                Ok(MediaCmd::Shutdown { fade_out_ms }) => {
                    if let Some(l) = current.take() {
                        if let Some(s) = l.sink {
                            if l.playing {
                                fade_out_sink(&s, fade_out_ms);
                            }
                            s.stop();
                        }
                    }
                    break;
                }

                Err(RecvTimeoutError::Timeout) => {
                    // Periodic position report and end-of-track detection.
                    let Some(l) = current.as_mut() else {
                        continue;
                    };
                    if !l.playing {
                        continue;
                    }
                    let drained = l.sink.as_ref().is_none_or(|s| s.empty());
                    if drained {
                        l.accumulated = l.elapsed();
                        l.started_at = None;
                        l.playing = false;
                        l.finished = true;
                        emit(&l.token, MediaEvent::Ended);
                    } else {
                        emit(&l.token, MediaEvent::Position(l.elapsed()));
                    }
                }

                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!("audio thread exiting");
    })
}
