use kindred_core::{ContextId, Kind};

/// Binds an event to one context partition.
///
/// A scoped event reaches the listeners of its context as well as every
/// shared listener; listeners of other contexts never see it. An unscoped
/// `Scoped` behaves like no scope at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoped {
    context: Option<ContextId>,
}

impl Scoped {
    /// Scope to `context`.
    pub fn new(context: ContextId) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// Not bound to any context.
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// The context this event is bound to.
    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    /// Rebind to another context, or to none.
    pub fn set_context(&mut self, context: Option<ContextId>) {
        self.context = context;
    }
}

impl Kind for Scoped {
    type View = Self;
    type Parents = ();

    fn name() -> &'static str {
        "Scoped"
    }

    fn context(view: &Self) -> Option<ContextId> {
        view.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use kindred_core::{EventBus, Extends};

    #[derive(Debug)]
    struct Tell {
        scope: Scoped,
        text: &'static str,
    }

    impl Kind for Tell {
        type View = Self;
        type Parents = (Scoped,);
    }

    impl Extends<Scoped> for Tell {
        fn view(&self) -> &Scoped {
            &self.scope
        }

        fn view_mut(&mut self) -> &mut Scoped {
            &mut self.scope
        }
    }

    #[test]
    fn test_scoped_event_reaches_its_context_only() {
        let bus = EventBus::new();
        let log = Recorder::new();
        let left = bus.context();
        let right = bus.context();

        let seen = log.clone();
        let _l = left.react::<Tell>(move |tell| seen.record(("left", tell.text)));
        let seen = log.clone();
        let _r = right.react::<Tell>(move |tell| seen.record(("right", tell.text)));
        let seen = log.clone();
        let _s = bus.react::<Tell>(move |tell| seen.record(("shared", tell.text)));

        let mut tell = Tell {
            scope: Scoped::new(left.id()),
            text: "a",
        };
        bus.call(&mut tell).unwrap();
        tell.scope = Scoped::unscoped();
        tell.text = "b";
        bus.call(&mut tell).unwrap();

        assert_eq!(log.take(), [("left", "a"), ("shared", "a"), ("shared", "b")]);
    }
}
