//! Object-safe events.
//!
//! [`Event`] is not object safe (its methods are associated functions and
//! carry type-level lineage), so heterogeneous event values are handled
//! through [`DynEvent`] instead. Every event implements it automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut queue: Vec<Box<dyn DynEvent>> = vec![Box::new(Join::new()), Box::new(Chat::new("hi"))];
//! for event in &mut queue {
//!     event.call_on(&bus)?;
//! }
//! ```

use crate::{
    bus::EventBus,
    error::DispatchError,
    kind::{Event, Kind, KindId},
};
use std::{any::Any, fmt};

/// Type-erased event that still dispatches through its full kind DAG.
pub trait DynEvent: Any {
    /// Identity of the concrete kind.
    fn kind_id(&self) -> KindId;

    /// Name of the concrete kind.
    fn kind_name(&self) -> &'static str;

    /// Dispatch this event on `bus` exactly as `bus.call` would.
    fn call_on(&mut self, bus: &EventBus) -> Result<(), DispatchError>;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Event> DynEvent for E {
    fn kind_id(&self) -> KindId {
        KindId::of::<E>()
    }

    fn kind_name(&self) -> &'static str {
        <E as Kind>::name()
    }

    fn call_on(&mut self, bus: &EventBus) -> Result<(), DispatchError> {
        bus.call(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn DynEvent {
    /// Whether the concrete kind is `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.kind_id() == KindId::of::<E>()
    }

    /// The concrete event, if it is an `E`.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref()
    }

    /// The concrete event, mutably, if it is an `E`.
    pub fn downcast_mut<E: Event>(&mut self) -> Option<&mut E> {
        self.as_any_mut().downcast_mut()
    }
}

impl fmt::Debug for dyn DynEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynEvent")
            .field("kind", &self.kind_name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};

    #[derive(Debug, Default)]
    struct Ping(u32);

    impl Kind for Ping {
        type View = Self;
        type Parents = ();
        fn name() -> &'static str {
            "Ping"
        }
    }

    #[derive(Debug, Default)]
    struct Pong;

    impl Kind for Pong {
        type View = Self;
        type Parents = ();
    }

    #[test]
    fn test_call_on_dispatches_concrete_kind() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let _reg = bus.process::<Ping>(|ping| ping.0 += 1);
        let _react = bus.react::<Pong>(move |_| counter.set(counter.get() + 1));

        let mut events: Vec<Box<dyn DynEvent>> = vec![Box::new(Ping(1)), Box::new(Pong)];
        for event in &mut events {
            event.call_on(&bus).unwrap();
        }
        assert_eq!(events[0].downcast_ref::<Ping>().map(|ping| ping.0), Some(2));
        assert_eq!(events[0].kind_name(), "Ping");
        assert!(events[1].is::<Pong>());
        assert_eq!(hits.get(), 1);
    }
}
