use kindred_core::{DynEvent, Event, Extends, Kind};

/// An event that can produce an independently owned copy of itself.
///
/// Implemented for every `Clone` event. The copy keeps its concrete kind, so
/// [`DynEvent::call_on`] dispatches it through the same kind DAG as the
/// original.
pub trait CloneEvent: DynEvent {
    /// A boxed copy of this event.
    fn clone_event(&self) -> Box<dyn CloneEvent>;
}

impl<E: Event + Clone> CloneEvent for E {
    fn clone_event(&self) -> Box<dyn CloneEvent> {
        Box::new(self.clone())
    }
}

impl dyn CloneEvent {
    /// A copy held by whichever owner the caller picks: `Box`, `Rc` or `Arc`.
    ///
    /// ```rust,ignore
    /// let shared: Rc<dyn CloneEvent> = view.duplicate();
    /// ```
    pub fn duplicate<W>(&self) -> W
    where
        W: From<Box<dyn CloneEvent>>,
    {
        W::from(self.clone_event())
    }
}

impl std::fmt::Debug for dyn CloneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloneEvent")
            .field("kind", &self.kind_name())
            .finish_non_exhaustive()
    }
}

/// Typed copies of a concrete event.
pub trait CloneAs: Event + Clone {
    /// A copy of this event wrapped in `W`, e.g. `Box<Self>` or `Rc<Self>`.
    fn clone_as<W: From<Self>>(&self) -> W {
        W::from(self.clone())
    }
}

impl<E: Event + Clone> CloneAs for E {}

/// Kind for events that listeners may copy.
///
/// Listeners of this kind receive `&dyn CloneEvent` and can duplicate the
/// event without knowing its concrete type. An event opts in by listing
/// `Cloneable` as a parent and projecting itself to the trait object
/// (`#[event(coerce(Cloneable))]` with the derive).
#[derive(Debug, Clone, Copy)]
pub struct Cloneable;

impl Cloneable {
    /// View `event` as a cloneable trait object.
    pub fn of<E: Extends<Cloneable>>(event: &E) -> &dyn CloneEvent {
        <E as Extends<Cloneable>>::view(event)
    }
}

impl Kind for Cloneable {
    type View = dyn CloneEvent;
    type Parents = ();

    fn name() -> &'static str {
        "Cloneable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Counter;
    use kindred_core::EventBus;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    struct Note(String);

    impl Kind for Note {
        type View = Self;
        type Parents = (Cloneable,);
    }

    impl Extends<Cloneable> for Note {
        fn view(&self) -> &dyn CloneEvent {
            self
        }

        fn view_mut(&mut self) -> &mut dyn CloneEvent {
            self
        }
    }

    #[test]
    fn test_clone_keeps_concrete_kind() {
        let note = Note("hello".into());
        let copy: Box<dyn DynEvent> = Cloneable::of(&note).clone_event();
        assert!(copy.is::<Note>());
        assert_eq!(copy.downcast_ref::<Note>(), Some(&note));

        let shared: Rc<dyn CloneEvent> = Cloneable::of(&note).duplicate();
        assert_eq!(shared.kind_name(), note.kind_name());

        let typed: Box<Note> = note.clone_as();
        assert_eq!(*typed, note);
    }

    #[test]
    fn test_clone_dispatch_matches_fresh_dispatch() {
        let bus = EventBus::new();
        let processed = Counter::new();
        let reacted = Counter::new();
        let cloneable = Counter::new();

        let p = processed.clone();
        let _p = bus.process::<Note>(move |_| p.bump());
        let r = reacted.clone();
        let _r = bus.react::<Note>(move |_| r.bump());
        let c = cloneable.clone();
        let _c = bus.react::<Cloneable>(move |_| c.bump());

        let mut original = Note("x".into());
        bus.call(&mut original).unwrap();
        let fresh = (processed.get(), reacted.get(), cloneable.get());

        let mut copy = Cloneable::of(&original).clone_event();
        copy.call_on(&bus).unwrap();
        assert_eq!(processed.get(), fresh.0 * 2);
        assert_eq!(reacted.get(), fresh.1 * 2);
        assert_eq!(cloneable.get(), fresh.2 * 2);
        assert_eq!(fresh, (1, 1, 1));
    }
}
