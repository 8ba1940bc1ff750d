//! Testing utilities for Kindred.
//!
//! Listeners are `'static` closures, so anything they record has to be shared
//! with the test body. These helpers wrap that sharing.
//!
//! - [`Recorder`]: an ordered log of values pushed by listeners
//! - [`Counter`]: a hit counter

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

// ============================================================================
// Recorder
// ============================================================================

/// Shared, ordered log.
///
/// # Example
///
/// ```rust,ignore
/// let log = Recorder::new();
/// let seen = log.clone();
/// let _reg = bus.react::<Chat>(move |chat| seen.record(chat.text.clone()));
///
/// bus.call(&mut chat)?;
/// assert_eq!(log.take(), ["hi"]);
/// ```
pub struct Recorder<T> {
    entries: Rc<RefCell<Vec<T>>>,
}

impl<T> Recorder<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Append a value.
    pub fn record(&self, value: T) {
        self.entries.borrow_mut().push(value);
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    /// Get the number of recorded values.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Clear all recorded values.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<T: Clone> Recorder<T> {
    /// A copy of everything recorded so far.
    pub fn entries(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Recorder").field(&self.entries.borrow()).finish()
    }
}

// ============================================================================
// Counter
// ============================================================================

/// Shared hit counter.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    hits: Rc<Cell<usize>>,
}

impl Counter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one.
    pub fn bump(&self) {
        self.hits.set(self.hits.get() + 1);
    }

    /// Current count.
    pub fn get(&self) -> usize {
        self.hits.get()
    }

    /// Reset to zero.
    pub fn reset(&self) {
        self.hits.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_shares_log() {
        let log = Recorder::new();
        let other = log.clone();
        other.record(1);
        other.record(2);
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries(), [1, 2]);
        assert_eq!(log.take(), [1, 2]);
        assert!(other.is_empty());
    }

    #[test]
    fn test_counter() {
        let counter = Counter::new();
        let other = counter.clone();
        other.bump();
        other.bump();
        assert_eq!(counter.get(), 2);
        counter.reset();
        assert_eq!(other.get(), 0);
    }
}
