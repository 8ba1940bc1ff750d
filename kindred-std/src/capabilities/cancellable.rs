use kindred_core::{Extends, Kind, ListenerId};

/// Cancellation state for an event.
///
/// Processors still see a cancelled event (and may un-cancel it); reactors do
/// not run once the flag is set at the end of the process pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cancellable {
    cancelled: bool,
}

impl Cancellable {
    /// A fresh, not cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the event.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Set or clear the cancelled flag.
    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }

    /// Whether the event is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Kind for Cancellable {
    type View = Self;
    type Parents = ();

    fn name() -> &'static str {
        "Cancellable"
    }

    fn should_react(view: &Self, _listener: ListenerId) -> bool {
        !view.cancelled
    }
}

/// Cancellation methods on any event that extends [`Cancellable`].
pub trait CancelExt: Extends<Cancellable> {
    /// Cancel the event.
    fn cancel(&mut self) {
        <Self as Extends<Cancellable>>::view_mut(self).cancel();
    }

    /// Set or clear the cancelled flag.
    fn set_cancelled(&mut self, cancelled: bool) {
        <Self as Extends<Cancellable>>::view_mut(self).set_cancelled(cancelled);
    }

    /// Whether the event is cancelled.
    fn is_cancelled(&self) -> bool {
        <Self as Extends<Cancellable>>::view(self).is_cancelled()
    }
}

impl<E: Extends<Cancellable>> CancelExt for E {}
