use std::mem;

/// An ordered collection of items waiting to be submitted.
///
/// Holds fewer than `max_size` items between calls: the push that fills it hands the whole lot
/// back for submission and leaves an empty queue behind.
#[derive(Debug)]
pub(crate) struct Queue<T> {
    max_size: usize,
    items: Vec<T>,
}

impl<T> Queue<T> {
    pub(crate) fn new(max_size: usize) -> Self {
        Self {
            max_size,
            items: Vec::new(),
        }
    }

    /// Appends `item`, returning the drained batch when the queue reached its threshold.
    pub(crate) fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.items.push(item);
        if self.is_full() {
            Some(self.drain())
        } else {
            None
        }
    }

    /// Removes every queued item, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<T> {
        mem::take(&mut self.items)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn is_full(&self) -> bool {
        self.items.len() == self.max_size
    }
}
