//! The ordered playback queue and its cursor.
//!
//! The cursor is `None` when nothing is selected; otherwise it always
//! points inside the queue. Lookups by track id resolve to the first match.

use crate::library::{SharedTrack, TrackId};

#[derive(Debug, Clone, Default)]
pub struct PlayQueue {
    items: Vec<SharedTrack>,
    cursor: Option<usize>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[SharedTrack] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&SharedTrack> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.items.iter().position(|t| t.id == id)
    }

    pub fn add(&mut self, track: SharedTrack) {
        self.items.push(track);
    }

    /// Remove the entry at `index`, keeping the current track current unless
    /// it is the one removed. Returns `None` when `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<SharedTrack> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.cursor = match self.cursor {
            Some(c) if index < c => Some(c - 1),
            Some(c) if index == c => None,
            other => other,
        };
        Some(removed)
    }

    /// Point the cursor at `track`, appending it when it is not queued yet.
    pub fn select_or_append(&mut self, track: SharedTrack) -> usize {
        let index = match self.position_of(track.id) {
            Some(i) => i,
            None => {
                self.items.push(track);
                self.items.len() - 1
            }
        };
        self.cursor = Some(index);
        index
    }

    /// Move to the next entry. Returns false at the end of the queue.
    ///
    /// With nothing selected this selects the first entry.
    pub fn advance(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.items.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Move to the previous entry. Returns false at the start of the queue.
    pub fn retreat(&mut self) -> bool {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = None;
    }

    /// Replace the whole queue; nothing is selected afterwards.
    pub fn replace(&mut self, tracks: Vec<SharedTrack>) {
        self.items = tracks;
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{ArtistRef, Track};
    use std::sync::Arc;

    fn t(id: u64) -> SharedTrack {
        Arc::new(Track {
            id: TrackId(id),
            name: format!("song {id}"),
            artist: ArtistRef::Name("artist".into()),
            file_path: format!("{id}.mp3"),
            secondary_file_path: None,
            lyrics: None,
            duration: None,
        })
    }

    fn ids(q: &PlayQueue) -> Vec<u64> {
        q.items().iter().map(|t| t.id.0).collect()
    }

    fn queue_of(n: u64, cursor: Option<usize>) -> PlayQueue {
        let mut q = PlayQueue::new();
        for id in 1..=n {
            q.add(t(id));
        }
        q.cursor = cursor;
        q
    }

    #[test]
    fn add_appends_without_moving_cursor() {
        let mut q = queue_of(2, Some(0));
        q.add(t(9));
        assert_eq!(ids(&q), vec![1, 2, 9]);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn remove_before_cursor_keeps_current_track() {
        let mut q = queue_of(3, Some(1));
        assert!(q.remove(0).is_some());
        assert_eq!(ids(&q), vec![2, 3]);
        assert_eq!(q.cursor(), Some(0));
        assert_eq!(q.current().map(|t| t.id), Some(TrackId(2)));
    }

    #[test]
    fn remove_at_cursor_clears_selection() {
        let mut q = queue_of(2, Some(1));
        q.remove(1);
        assert_eq!(ids(&q), vec![1]);
        assert_eq!(q.cursor(), None);
        assert!(q.current().is_none());
    }

    #[test]
    fn remove_after_cursor_leaves_cursor() {
        let mut q = queue_of(3, Some(0));
        q.remove(2);
        assert_eq!(ids(&q), vec![1, 2]);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn remove_out_of_range_changes_nothing() {
        let mut q = queue_of(2, Some(1));
        assert!(q.remove(2).is_none());
        assert_eq!(ids(&q), vec![1, 2]);
        assert_eq!(q.cursor(), Some(1));
    }

    #[test]
    fn remove_every_index_preserves_relative_order() {
        for len in 1..=5u64 {
            for cursor in std::iter::once(None).chain((0..len as usize).map(Some)) {
                for index in 0..len as usize {
                    let mut q = queue_of(len, cursor);
                    let before = ids(&q);
                    let current = q.current().map(|t| t.id);
                    q.remove(index);

                    let mut expected = before.clone();
                    expected.remove(index);
                    assert_eq!(ids(&q), expected);

                    if let Some(c) = q.cursor() {
                        assert!(c < q.len());
                        assert_eq!(q.current().map(|t| t.id), current);
                    }
                }
            }
        }
    }

    #[test]
    fn select_or_append_selects_existing_entry() {
        let mut q = queue_of(3, None);
        assert_eq!(q.select_or_append(t(2)), 1);
        assert_eq!(q.len(), 3);
        assert_eq!(q.cursor(), Some(1));
    }

    #[test]
    fn select_or_append_appends_unknown_track() {
        let mut q = PlayQueue::new();
        assert_eq!(q.select_or_append(t(7)), 0);
        assert_eq!(ids(&q), vec![7]);
        assert_eq!(q.current().map(|t| t.id), Some(TrackId(7)));
    }

    #[test]
    fn duplicate_ids_resolve_to_first_match() {
        let mut q = queue_of(2, None);
        q.add(t(1));
        assert_eq!(q.select_or_append(t(1)), 0);
    }

    #[test]
    fn advance_stops_at_last_entry() {
        let mut q = queue_of(3, Some(0));
        let mut seen = Vec::new();
        for _ in 0..3 {
            q.advance();
            seen.push(q.cursor().unwrap());
        }
        assert_eq!(seen, vec![1, 2, 2]);
    }

    #[test]
    fn advance_from_nothing_selected_starts_at_first() {
        let mut q = queue_of(2, None);
        assert!(q.advance());
        assert_eq!(q.cursor(), Some(0));

        let mut empty = PlayQueue::new();
        assert!(!empty.advance());
        assert_eq!(empty.cursor(), None);
    }

    #[test]
    fn retreat_stops_at_first_entry() {
        let mut q = queue_of(2, Some(0));
        assert!(!q.retreat());
        assert_eq!(q.cursor(), Some(0));

        let mut none = queue_of(2, None);
        assert!(!none.retreat());
        assert_eq!(none.cursor(), None);
    }

    #[test]
    fn clear_empties_and_deselects() {
        let mut q = queue_of(3, Some(2));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.cursor(), None);
    }
}
