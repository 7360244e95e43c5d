use crate::catalog::{Track, TrackId};

/// Ordered tracks available for next/previous navigation.
///
/// `index` always points inside `tracks` when the queue is non-empty. The
/// queue is only ever replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    index: usize,
}

impl Queue {
    /// Replace the contents; `index` is clamped into range.
    pub fn replace(&mut self, tracks: Vec<Track>, index: usize) {
        self.index = index.min(tracks.len().saturating_sub(1));
        self.tracks = tracks;
    }

    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// `None` when the queue is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.tracks.is_empty()).then_some(self.index)
    }

    pub(super) fn set_index(&mut self, index: usize) {
        debug_assert!(index < self.tracks.len());
        self.index = index;
    }
}
