//! Bounded history of dispatched events.

use std::collections::VecDeque;

use super::event::EventEnvelope;

/// FIFO ring buffer of envelopes; the oldest entry is evicted first
#[derive(Debug)]
pub(crate) struct HistoryBuffer {
    entries: VecDeque<EventEnvelope>,
    max_size: usize,
}

impl HistoryBuffer {
    pub(crate) fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Append an envelope, evicting from the front past the bound
    pub(crate) fn push(&mut self, envelope: EventEnvelope) {
        self.entries.push_back(envelope);
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
    }

    /// Owned copy of the current contents, oldest first
    pub(crate) fn snapshot(&self) -> Vec<EventEnvelope> {
        self.entries.iter().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
