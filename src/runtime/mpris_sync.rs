use std::time::Duration;

use crate::app::PlaybackState;
use crate::audio::PlayerSnapshot;
use crate::library::{LocatorResolver, TrackId, Variant};
use crate::mpris::MprisHandle;

/// What was last pushed to MPRIS, so unchanged snapshots cost nothing.
#[derive(Debug, Default, PartialEq)]
pub struct MprisMirror {
    track: Option<(TrackId, Variant)>,
    duration: Option<Duration>,
    playback: PlaybackState,
}

impl MprisMirror {
    pub fn sync(
        &mut self,
        mpris: &MprisHandle,
        snapshot: &PlayerSnapshot,
        resolver: &dyn LocatorResolver,
    ) {
        let current = snapshot.current();
        let next = MprisMirror {
            track: current.map(|t| (t.id, snapshot.transport.variant)),
            duration: snapshot.transport.duration,
            playback: PlaybackState::from_snapshot(snapshot),
        };
        if *self == next {
            return;
        }

        if self.track != next.track || self.duration != next.duration {
            let path = current
                .and_then(|t| t.locator(snapshot.transport.variant))
                .and_then(|locator| resolver.resolve(locator).ok());
            mpris.set_track_metadata(current, path.as_deref(), snapshot.transport.duration);
        }
        mpris.set_playback(next.playback);
        *self = next;
    }
}
