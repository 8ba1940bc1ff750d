use kindred_core::{Extends, Kind, ListenerId};

/// Single-reactor ownership of an event.
///
/// A processor claims the event for one reactor; only that reactor runs.
/// The last claim wins, and with no claim no reactor runs at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exclusive {
    claim: Option<ListenerId>,
}

impl Exclusive {
    /// An unclaimed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the event to `reactor`, replacing any earlier claim.
    pub fn claim(&mut self, reactor: ListenerId) {
        self.claim = Some(reactor);
    }

    /// The reactor currently holding the claim.
    pub fn claimant(&self) -> Option<ListenerId> {
        self.claim
    }

    /// Drop the claim.
    pub fn release(&mut self) {
        self.claim = None;
    }
}

impl Kind for Exclusive {
    type View = Self;
    type Parents = ();

    fn name() -> &'static str {
        "Exclusive"
    }

    fn should_react(view: &Self, listener: ListenerId) -> bool {
        view.claim == Some(listener)
    }
}

/// Claim methods on any event that extends [`Exclusive`].
pub trait ExclusiveExt: Extends<Exclusive> {
    /// Hand the event to `reactor`.
    fn claim(&mut self, reactor: ListenerId) {
        <Self as Extends<Exclusive>>::view_mut(self).claim(reactor);
    }

    /// The reactor currently holding the claim.
    fn claimant(&self) -> Option<ListenerId> {
        <Self as Extends<Exclusive>>::view(self).claimant()
    }

    /// Drop the claim.
    fn release(&mut self) {
        <Self as Extends<Exclusive>>::view_mut(self).release();
    }
}

impl<E: Extends<Exclusive>> ExclusiveExt for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;
    use kindred_core::EventBus;

    #[derive(Debug, Default)]
    struct Job {
        owner: Exclusive,
    }

    impl Kind for Job {
        type View = Self;
        type Parents = (Exclusive,);
    }

    impl Extends<Exclusive> for Job {
        fn view(&self) -> &Exclusive {
            &self.owner
        }

        fn view_mut(&mut self) -> &mut Exclusive {
            &mut self.owner
        }
    }

    #[test]
    fn test_last_claim_wins() {
        let bus = EventBus::new();
        let log = Recorder::new();

        let seen = log.clone();
        let r1 = bus.react::<Job>(move |_| seen.record(1));
        let seen = log.clone();
        let r2 = bus.react::<Job>(move |_| seen.record(2));

        let (first, second) = (r1.id(), r2.id());
        let _a = bus.process::<Job>(move |job| job.claim(first));
        let _b = bus.on::<Job>().priority(1).process(move |job| job.claim(second));

        let mut job = Job::default();
        bus.call(&mut job).unwrap();
        assert_eq!(log.take(), [2]);
        assert_eq!(job.claimant(), Some(second));
    }

    #[test]
    fn test_unclaimed_runs_no_reactor() {
        let bus = EventBus::new();
        let log = Recorder::new();
        let seen = log.clone();
        let _r = bus.react::<Job>(move |_| seen.record("job"));
        let seen = log.clone();
        let _p = bus.process::<Job>(move |_| seen.record("processed"));

        bus.call(&mut Job::default()).unwrap();
        assert_eq!(log.take(), ["processed"]);
    }

    #[test]
    fn test_release_clears_claim() {
        let bus = EventBus::new();
        let reactor = bus.react::<Job>(|_| {});
        let mut owner = Exclusive::new();
        owner.claim(reactor.id());
        assert!(Exclusive::should_react(&owner, reactor.id()));
        owner.release();
        assert_eq!(owner.claimant(), None);
    }
}
