//! Search over the current bookmark list, with a debounced query.

use std::time::{Duration, Instant};

use crate::types::bookmark::Bookmark;

/// Bookmarks whose title or url contains `query`, ignoring case.
///
/// Only an empty query returns the whole list. Whitespace in the query is
/// matched literally. Order is kept.
pub fn filter_bookmarks<'a>(bookmarks: &'a [Bookmark], query: &str) -> Vec<&'a Bookmark> {
    if query.is_empty() {
        return bookmarks.iter().collect();
    }
    let needle = query.to_lowercase();
    bookmarks.iter().filter(|b| b.matches(&needle)).collect()
}

/// Holds back a rapidly changing value until it has been stable for `delay`.
///
/// Time is passed in by the caller, so the debouncer never sleeps.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    /// Records a new raw value; restarts the delay.
    pub fn push(&mut self, value: T, now: Instant) {
        if value == self.settled {
            self.pending = None;
        } else {
            self.pending = Some((value, now));
        }
    }

    /// Promotes the pending value once the delay has elapsed.
    /// Returns true when the settled value changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let ready = matches!(
            &self.pending,
            Some((_, since)) if now.saturating_duration_since(*since) >= self.delay
        );
        ready && self.flush()
    }

    /// Settles the pending value immediately.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some((value, _)) => {
                let changed = value != self.settled;
                self.settled = value;
                changed
            }
            None => false,
        }
    }

    /// Replaces both the raw and the settled value without waiting.
    pub fn reset(&mut self, value: T) {
        self.pending = None;
        self.settled = value;
    }

    pub fn value(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
