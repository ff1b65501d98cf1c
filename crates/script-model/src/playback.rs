//! Shared playback state between the replay script and the surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Count of messages currently revealed.
///
/// The replay script advances the counter on a timer while the chat
/// surface reads it on every capture. Clones share one counter.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    shown: Arc<AtomicUsize>,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages currently revealed.
    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::SeqCst)
    }

    /// Hide all messages.
    pub fn reset(&self) {
        self.shown.store(0, Ordering::SeqCst);
    }

    /// Reveal one more message.
    pub fn reveal_next(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    /// Reveal every message of a `count`-message conversation at once.
    pub fn reveal_all(&self, count: usize) {
        self.shown.store(count, Ordering::SeqCst);
    }
}
