use thiserror::Error;

/// Failures the engine absorbs and reports through its snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// A queue position outside the current bounds.
    #[error("index {index} is out of range for a queue of {len}")]
    InvalidIndex { index: usize, len: usize },

    /// The environment refused to start playback.
    #[error("playback was rejected: {0}")]
    PlaybackRejected(String),

    /// The media locator could not be resolved or decoded.
    #[error("could not load {locator}: {reason}")]
    ResourceLoadFailure { locator: String, reason: String },
}
