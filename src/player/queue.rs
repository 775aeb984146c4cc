//! Play queue: an ordered list of playable items plus a current position

use super::item::PlayableItem;

/// Ordered play queue.
///
/// `current_index` is either `None` or a valid index into `items`. Navigation
/// wraps around unconditionally; there is no "stop at end" mode.
#[derive(Clone, Debug, Default)]
pub struct Queue {
    items: Vec<PlayableItem>,
    current_index: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole queue, dropping items that have no audio URI.
    ///
    /// The current index survives when it still points inside the new queue,
    /// otherwise it resets to the first item (or `None` for an empty queue).
    pub fn set_items(&mut self, items: Vec<PlayableItem>) {
        let total = items.len();
        self.items = items.into_iter().filter(PlayableItem::is_playable).collect();

        if total != self.items.len() {
            tracing::debug!(
                dropped = total - self.items.len(),
                kept = self.items.len(),
                "Dropped unplayable items from queue"
            );
        }

        self.current_index = if self.items.is_empty() {
            None
        } else {
            match self.current_index {
                Some(index) if index < self.items.len() => Some(index),
                _ => Some(0),
            }
        };
    }

    /// Index after the current one, wrapping to the start.
    ///
    /// `None` for an empty queue, or when nothing in the queue is current.
    pub fn advance(&self) -> Option<usize> {
        let current = self.current_index?;
        if self.items.is_empty() {
            return None;
        }
        Some((current + 1) % self.items.len())
    }

    /// Index before the current one, wrapping to the end.
    pub fn retreat(&self) -> Option<usize> {
        let current = self.current_index?;
        if self.items.is_empty() {
            return None;
        }
        Some((current + self.items.len() - 1) % self.items.len())
    }

    /// First index whose audio URI equals `uri`.
    pub fn find_by_audio_uri(&self, uri: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.audio_uri.as_deref() == Some(uri))
    }

    pub fn get(&self, index: usize) -> Option<&PlayableItem> {
        self.items.get(index)
    }

    /// Point the queue at `index`. Out-of-range indices clear the position.
    pub fn set_current(&mut self, index: Option<usize>) {
        self.current_index = index.filter(|i| *i < self.items.len());
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn items(&self) -> &[PlayableItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
