//! Logging listener for event observation.

use kindred_core::{EventBus, Kind, Priority, Registration};
use std::fmt::Debug;

/// Log every event of kind `K` once all other reactors have seen it.
///
/// Emits a `tracing` debug event with the kind name and the view. Without the
/// `tracing` feature the listener is registered but does nothing.
pub fn log_reactions<K>(bus: &EventBus) -> Registration
where
    K: Kind,
    K::View: Debug,
{
    bus.on::<K>()
        .priority(Priority::LAST)
        .label("log reactions")
        .react(|view| {
            #[cfg(feature = "tracing")]
            {
                tracing::debug!(kind = K::name(), event = ?view, "Reacted to event");
            }
            #[cfg(not(feature = "tracing"))]
            {
                let _ = view; // Suppress unused warning
            }
        })
}
