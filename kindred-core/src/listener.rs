//! Listener identity, options and registration handles.

use crate::{bus::BusInner, priority::Priority};
use std::{
    cell::Cell,
    fmt,
    rc::{Rc, Weak},
};

/// Identity of a registered listener.
///
/// Ids are unique per bus and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Reserved for the bus-owned context teardown reactor.
    pub(crate) const TEARDOWN: ListenerId = ListenerId(u64::MAX);

    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two dispatch phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Processors: mutable access, run first.
    Process,
    /// Reactors: shared access, run after every processor.
    React,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Process => "process",
            Phase::React => "react",
        })
    }
}

// ============================================================================
// Enabled Handle
// ============================================================================

/// Shared switch for enabling or disabling a registered listener at runtime.
///
/// A disabled listener stays registered and keeps its position; dispatch just
/// skips it.
#[derive(Debug, Clone)]
pub struct EnabledHandle(Rc<Cell<bool>>);

impl EnabledHandle {
    /// Create a new handle with the given initial state.
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    /// Check if the listener is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.0.get()
    }

    /// Enable the listener.
    pub fn enable(&self) {
        self.0.set(true);
    }

    /// Disable the listener.
    pub fn disable(&self) {
        self.0.set(false);
    }

    /// Toggle the enabled state, returning the new state.
    pub fn toggle(&self) -> bool {
        let next = !self.0.get();
        self.0.set(next);
        next
    }

    /// Set the enabled state.
    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }
}

impl Default for EnabledHandle {
    fn default() -> Self {
        Self::new(true)
    }
}

// ============================================================================
// Listener Options
// ============================================================================

/// Registration options for a listener.
#[derive(Debug, Clone, Default)]
pub struct ListenerOptions {
    /// Execution order; lower runs first.
    pub priority: Priority,
    /// Optional label shown in logs and errors.
    pub label: Option<&'static str>,
    enabled: EnabledHandle,
}

impl ListenerOptions {
    /// Default options: neutral priority, no label, enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Set label.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Set initial enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = EnabledHandle::new(enabled);
        self
    }

    /// Share an existing handle, so one switch controls several listeners.
    pub fn with_handle(mut self, handle: EnabledHandle) -> Self {
        self.enabled = handle;
        self
    }

    /// The enabled handle the listener will use.
    pub fn enabled_handle(&self) -> &EnabledHandle {
        &self.enabled
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Handle to a registered listener.
///
/// Dropping the handle unregisters the listener. Use [`Registration::forget`]
/// to keep the listener for the lifetime of the bus.
#[must_use = "dropping a Registration unregisters the listener"]
pub struct Registration {
    bus: Weak<BusInner>,
    id: ListenerId,
    kind: &'static str,
    phase: Phase,
    enabled: EnabledHandle,
    armed: bool,
}

impl Registration {
    pub(crate) fn new(
        bus: &Rc<BusInner>,
        id: ListenerId,
        kind: &'static str,
        phase: Phase,
        enabled: EnabledHandle,
    ) -> Self {
        Self {
            bus: Rc::downgrade(bus),
            id,
            kind,
            phase,
            enabled,
            armed: true,
        }
    }

    /// The listener's id.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Name of the kind the listener is bound to.
    pub fn kind_name(&self) -> &'static str {
        self.kind
    }

    /// Phase the listener runs in.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runtime switch for this listener.
    pub fn enabled_handle(&self) -> &EnabledHandle {
        &self.enabled
    }

    /// Unregister now. Returns whether the listener was still registered.
    pub fn unregister(mut self) -> bool {
        self.armed = false;
        match self.bus.upgrade() {
            Some(bus) => bus.unregister(self.id),
            None => false,
        }
    }

    /// Keep the listener registered until its bus (or context) goes away.
    pub fn forget(mut self) -> ListenerId {
        self.armed = false;
        self.id
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("phase", &self.phase)
            .field("enabled", &self.enabled.is_enabled())
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.armed
            && let Some(bus) = self.bus.upgrade()
        {
            bus.unregister(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_handle_is_shared() {
        let handle = EnabledHandle::default();
        let other = handle.clone();
        assert!(handle.is_enabled());
        other.disable();
        assert!(!handle.is_enabled());
        assert!(handle.toggle());
        assert!(other.is_enabled());
    }

    #[test]
    fn test_options_builder() {
        let options = ListenerOptions::new()
            .with_priority(-3)
            .with_label("audit")
            .with_enabled(false);
        assert_eq!(options.priority, Priority::new(-3));
        assert_eq!(options.label, Some("audit"));
        assert!(!options.enabled_handle().is_enabled());
    }

    #[test]
    fn test_with_enabled_detaches_from_clones() {
        let base = ListenerOptions::new();
        let off = base.clone().with_enabled(false);
        assert!(base.enabled_handle().is_enabled());
        assert!(!off.enabled_handle().is_enabled());

        let shared = EnabledHandle::default();
        let a = ListenerOptions::new().with_handle(shared.clone());
        let b = a.clone();
        shared.disable();
        assert!(!a.enabled_handle().is_enabled());
        assert!(!b.enabled_handle().is_enabled());
    }

    #[test]
    fn test_display() {
        assert_eq!(ListenerId::new(4).to_string(), "#4");
        assert_eq!(Phase::Process.to_string(), "process");
        assert_eq!(Phase::React.to_string(), "react");
    }
}
