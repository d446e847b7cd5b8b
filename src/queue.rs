use std::collections::VecDeque;

/// Names registered for the next batch walk.
///
/// Pure scheduling state: nothing here is persisted, and duplicates are kept.
#[derive(Debug, Default)]
pub struct LookupQueue {
    names: VecDeque<String>,
}

impl LookupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, name: impl Into<String>) {
        self.names.push_back(name.into());
    }

    /// Takes every queued name in FIFO order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<String> {
        self.names.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
