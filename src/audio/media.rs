use std::path::PathBuf;
use std::time::Duration;

use super::types::LoadToken;

/// The single streaming primitive the engine drives.
///
/// Every method is a request. Outcomes come back later as `MediaNotice`s
/// through the listener the backend was built with, tagged with the token
/// of the load they belong to.
pub trait MediaResource {
    /// Replace whatever is loaded with `source`; stays paused until `play`.
    fn load(&mut self, token: LoadToken, source: PathBuf);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration);
    fn set_volume(&mut self, level: f32);
    /// Stop and detach the current source.
    fn stop(&mut self);
    /// Release the backend, fading out first when `fade_out` is non-zero.
    fn shutdown(&mut self, _fade_out: Duration) {}
}
