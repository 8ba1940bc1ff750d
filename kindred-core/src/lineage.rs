//! Dispatch plans.
//!
//! The first `call()` for a concrete event type walks its parent tuples once
//! ([`Event::trace`](crate::kind::Event::trace)), collecting one [`Stage`] per
//! kind and declaring every kind in a [`KindGraph`]. The graph yields the
//! layered order; the stages are arranged to match and the resulting [`Plan`]
//! is cached on the bus.
//!
//! Each stage carries monomorphized function pointers for its kind, so running
//! a plan needs no further type information: it looks up the kind's registry,
//! projects the event to the kind's view and runs the listeners.

use crate::{
    bus::BusInner,
    context::ContextId,
    error::{DispatchError, KindError},
    graph::KindGraph,
    kind::{Extends, Kind, KindId, KindList},
    listener::{ListenerId, Phase},
};
use std::collections::{HashMap, HashSet};

type Gate<E> = fn(&E, ListenerId) -> bool;
type Scope<E> = fn(&E) -> Option<ContextId>;
type ProcessStage<E> =
    fn(&BusInner, &mut E, Option<ContextId>, &dyn Fn(&E, ListenerId) -> bool) -> Result<(), DispatchError>;
type ReactStage<E> =
    fn(&BusInner, &E, Option<ContextId>, &dyn Fn(&E, ListenerId) -> bool) -> Result<(), DispatchError>;

/// One kind in an event's dispatch order.
pub(crate) struct Stage<E> {
    id: KindId,
    name: &'static str,
    process: ProcessStage<E>,
    react: ReactStage<E>,
    process_gate: Gate<E>,
    react_gate: Gate<E>,
    context: Scope<E>,
}

impl<E: 'static> Stage<E> {
    fn of<K: Kind>() -> Self
    where
        E: Extends<K>,
    {
        Self {
            id: KindId::of::<K>(),
            name: K::name(),
            process: process_stage::<E, K>,
            react: react_stage::<E, K>,
            process_gate: process_gate::<E, K>,
            react_gate: react_gate::<E, K>,
            context: context_of::<E, K>,
        }
    }
}

fn process_stage<E: Extends<K>, K: Kind>(
    bus: &BusInner,
    event: &mut E,
    context: Option<ContextId>,
    gate: &dyn Fn(&E, ListenerId) -> bool,
) -> Result<(), DispatchError> {
    let Some(registry) = bus.snapshot::<K>(context) else {
        return Ok(());
    };
    registry
        .dispatch_processors(event, gate)
        .map_err(|failure| DispatchError::Listener {
            kind: K::name(),
            phase: Phase::Process,
            failure,
        })
}

fn react_stage<E: Extends<K>, K: Kind>(
    bus: &BusInner,
    event: &E,
    context: Option<ContextId>,
    gate: &dyn Fn(&E, ListenerId) -> bool,
) -> Result<(), DispatchError> {
    let Some(registry) = bus.snapshot::<K>(context) else {
        return Ok(());
    };
    registry
        .dispatch_reactors(event, gate)
        .map_err(|failure| DispatchError::Listener {
            kind: K::name(),
            phase: Phase::React,
            failure,
        })
}

fn process_gate<E: Extends<K>, K: Kind>(event: &E, listener: ListenerId) -> bool {
    K::should_process(<E as Extends<K>>::view(event), listener)
}

fn react_gate<E: Extends<K>, K: Kind>(event: &E, listener: ListenerId) -> bool {
    K::should_react(<E as Extends<K>>::view(event), listener)
}

fn context_of<E: Extends<K>, K: Kind>(event: &E) -> Option<ContextId> {
    K::context(<E as Extends<K>>::view(event))
}

// ============================================================================
// Ancestry
// ============================================================================

/// Collector for the kinds an event type extends.
///
/// Filled by [`Lineage::trace`](crate::kind::Lineage::trace); there is no
/// reason to use it directly.
pub struct Ancestry<E> {
    graph: KindGraph,
    stages: HashMap<KindId, Stage<E>>,
    error: Option<KindError>,
}

impl<E: 'static> Ancestry<E> {
    pub(crate) fn new() -> Self {
        Self {
            graph: KindGraph::new(),
            stages: HashMap::new(),
            error: None,
        }
    }

    /// Record kind `K`. Returns `false` if it was already recorded, in which
    /// case its parents need no further walk.
    pub fn insert<K: Kind>(&mut self) -> bool
    where
        E: Extends<K>,
    {
        let id = KindId::of::<K>();
        if self.stages.contains_key(&id) {
            return false;
        }
        if let Err(err) = self.graph.declare(id, K::name(), K::Parents::ids()) {
            self.error.get_or_insert(err);
        }
        self.stages.insert(id, Stage::of::<K>());
        true
    }

    pub(crate) fn into_plan(mut self, root: KindId) -> Result<Plan<E>, KindError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let order = self.graph.order(root)?;
        let stages = order
            .into_iter()
            .map(|id| self.stages.remove(&id).ok_or(KindError::Unknown(id)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Plan { stages })
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Visited set for one pass of one `call()`.
#[derive(Debug, Default)]
pub(crate) struct DispatchGuard {
    visited: HashSet<KindId>,
}

impl DispatchGuard {
    /// Mark `id` visited. Returns `false` if it already was.
    pub(crate) fn enter(&mut self, id: KindId) -> bool {
        self.visited.insert(id)
    }
}

/// Cached dispatch order of one concrete event type.
pub(crate) struct Plan<E> {
    stages: Vec<Stage<E>>,
}

impl<E: 'static> Plan<E> {
    pub(crate) fn order(&self) -> Vec<KindId> {
        self.stages.iter().map(|stage| stage.id).collect()
    }

    pub(crate) fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name).collect()
    }

    /// The first context any of the event's kinds scopes it to.
    pub(crate) fn context(&self, event: &E) -> Option<ContextId> {
        self.stages.iter().find_map(|stage| (stage.context)(event))
    }

    fn may_process(&self, event: &E, listener: ListenerId) -> bool {
        self.stages
            .iter()
            .all(|stage| (stage.process_gate)(event, listener))
    }

    fn may_react(&self, event: &E, listener: ListenerId) -> bool {
        self.stages
            .iter()
            .all(|stage| (stage.react_gate)(event, listener))
    }

    /// Run every kind's processors, roots first.
    pub(crate) fn process(&self, bus: &BusInner, event: &mut E) -> Result<(), DispatchError> {
        let context = self.context(event);
        let mut guard = DispatchGuard::default();
        let gate = |event: &E, listener| self.may_process(event, listener);
        for stage in &self.stages {
            if guard.enter(stage.id) {
                (stage.process)(bus, event, context, &gate)?;
            }
        }
        Ok(())
    }

    /// Run every kind's reactors, roots first.
    pub(crate) fn react(&self, bus: &BusInner, event: &E) -> Result<(), DispatchError> {
        let context = self.context(event);
        let mut guard = DispatchGuard::default();
        let gate = |event: &E, listener| self.may_react(event, listener);
        for stage in &self.stages {
            if guard.enter(stage.id) {
                (stage.react)(bus, event, context, &gate)?;
            }
        }
        Ok(())
    }
}
