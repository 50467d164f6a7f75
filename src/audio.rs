//! Audio module: the queue/player engine and the rodio backend it drives.
//!
//! `PlayerEngine` holds the queue and transport state. `AudioPlayer` runs it
//! on its own thread and publishes a `PlayerSnapshot` after every change;
//! `RodioMedia` is the real `MediaResource` behind it.

mod engine;
mod error;
mod media;
mod player;
mod queue;
mod sink;
mod thread;
mod types;

pub use engine::PlayerEngine;
pub use error::PlayerError;
pub use media::MediaResource;
pub use player::AudioPlayer;
pub use queue::PlayQueue;
pub use thread::RodioMedia;
pub use types::*;
