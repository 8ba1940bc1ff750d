//! Listener priority.

use std::fmt;

/// Execution order of a listener within its kind and phase.
///
/// Lower values run first. Listeners with equal priority run in registration
/// order, so `(priority, registration order)` is a total order.
///
/// # Example
///
/// ```rust,ignore
/// bus.on::<Chat>().priority(Priority::FIRST).process(|chat| chat.trim());
/// bus.on::<Chat>().priority(-10).process(|chat| chat.censor());
/// bus.on::<Chat>().process(|chat| chat.format()); // Priority::DEFAULT
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(i64);

impl Priority {
    /// Runs before every other priority.
    pub const FIRST: Priority = Priority(i64::MIN);
    /// Runs after every other priority.
    pub const LAST: Priority = Priority(i64::MAX);
    /// The neutral priority used when none is given.
    pub const DEFAULT: Priority = Priority(0);

    /// Create a priority from a raw value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self(i64::from(value))
    }
}

impl From<Priority> for i64 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Priority::FIRST => f.write_str("FIRST"),
            Priority::LAST => f.write_str("LAST"),
            Priority(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_bound_everything() {
        for value in [i64::MIN + 1, -1, 0, 1, i64::MAX - 1] {
            let priority = Priority::new(value);
            assert!(Priority::FIRST < priority);
            assert!(priority < Priority::LAST);
        }
        assert_eq!(Priority::default(), Priority::DEFAULT);
        assert_eq!(Priority::DEFAULT.get(), 0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Priority::from(-5i32), Priority::new(-5));
        assert_eq!(i64::from(Priority::from(7i64)), 7);
        assert_eq!(Priority::FIRST.to_string(), "FIRST");
        assert_eq!(Priority::new(3).to_string(), "3");
    }
}
