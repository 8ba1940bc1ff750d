//! The event bus.
//!
//! [`EventBus`] owns every registry, keyed by kind and partition, and the
//! cached dispatch plan of every event type it has seen. It is a cheap `Rc`
//! handle: clones share the same registries.
//!
//! # Dispatch
//!
//! [`EventBus::call`] runs the process pass over the event's whole kind DAG
//! (roots first, the concrete kind last), then the react pass over the same
//! order. No registry is borrowed while a listener runs, so listeners may
//! register, unregister and dispatch nested events freely.
//!
//! ```rust,ignore
//! let bus = EventBus::builder().name("chat").build();
//!
//! let _trim = bus.on::<Chat>().priority(Priority::FIRST).process(|chat| {
//!     chat.text = chat.text.trim().to_owned();
//! });
//! let _log = bus.react::<Chat>(|chat| println!("{}", chat.text));
//!
//! bus.call(&mut Chat::new("  hi  "))?;
//! ```
//!
//! Listeners that need the bus should capture a [`WeakBus`]; a strong
//! `EventBus` inside a listener keeps the bus alive forever.

use crate::{
    context::{Context, ContextClosed, ContextId},
    error::{BoxError, DispatchError, KindError},
    kind::{Event, Kind, KindId},
    lineage::{Ancestry, Plan},
    listener::{EnabledHandle, ListenerId, ListenerOptions, Phase, Registration},
    priority::Priority,
    registry::{AnyRegistry, ProcessorFn, ReactorFn, Registry},
};
use std::{
    any::Any,
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    rc::{Rc, Weak},
};

// ============================================================================
// Partitions
// ============================================================================

#[derive(Default)]
struct Partition {
    registries: HashMap<KindId, Box<dyn AnyRegistry>>,
}

impl Partition {
    fn registry<K: Kind>(&self) -> Option<&Registry<K>> {
        self.registries
            .get(&KindId::of::<K>())
            .and_then(|registry| registry.as_any().downcast_ref())
    }

    fn registry_mut<K: Kind>(&mut self) -> &mut Registry<K> {
        self.registries
            .entry(KindId::of::<K>())
            .or_insert_with(|| Box::new(Registry::<K>::new()))
            .as_any_mut()
            .downcast_mut()
            .expect("Type mismatch in partition registry")
    }

    fn take(&mut self, kind: KindId, id: ListenerId) -> Option<Box<dyn Any>> {
        let registry = self.registries.get_mut(&kind)?;
        let removed = registry.take(id);
        if registry.is_empty() {
            self.registries.remove(&kind);
        }
        removed
    }

    fn deactivate(&self) {
        for registry in self.registries.values() {
            registry.deactivate_all();
        }
    }
}

struct Slot {
    context: Option<ContextId>,
    kind: KindId,
}

#[derive(Default)]
struct Partitions {
    shared: Partition,
    scoped: HashMap<ContextId, Partition>,
    slots: HashMap<ListenerId, Slot>,
}

impl Partitions {
    fn partition_mut(&mut self, context: Option<ContextId>) -> &mut Partition {
        match context {
            None => &mut self.shared,
            Some(context) => self.scoped.entry(context).or_default(),
        }
    }
}

enum Callback<K: Kind> {
    Processor(Box<ProcessorFn<K>>),
    Reactor(Box<ReactorFn<K>>),
}

impl<K: Kind> Callback<K> {
    fn phase(&self) -> Phase {
        match self {
            Callback::Processor(_) => Phase::Process,
            Callback::Reactor(_) => Phase::React,
        }
    }
}

// ============================================================================
// Bus Internals
// ============================================================================

pub(crate) struct BusInner {
    name: String,
    next_listener: Cell<u64>,
    next_context: Cell<u64>,
    partitions: RefCell<Partitions>,
    plans: RefCell<HashMap<KindId, Rc<dyn Any>>>,
}

impl BusInner {
    fn new(name: String) -> Rc<Self> {
        let inner = Rc::new(Self {
            name,
            next_listener: Cell::new(1),
            next_context: Cell::new(1),
            partitions: RefCell::default(),
            plans: RefCell::default(),
        });
        inner.install_teardown();
        inner
    }

    fn install_teardown(self: &Rc<Self>) {
        let bus = Rc::downgrade(self);
        let options = ListenerOptions::new()
            .with_priority(Priority::LAST)
            .with_label("context teardown");
        self.partitions
            .borrow_mut()
            .shared
            .registry_mut::<ContextClosed>()
            .register_reactor(
                ListenerId::TEARDOWN,
                &options,
                Box::new(move |closed: &ContextClosed| -> Result<(), BoxError> {
                    if let Some(bus) = bus.upgrade() {
                        bus.drop_partition(closed.context());
                    }
                    Ok(())
                }),
            );
    }

    fn next_listener(&self) -> ListenerId {
        let raw = self.next_listener.get();
        self.next_listener.set(raw + 1);
        ListenerId::new(raw)
    }

    fn open_context(&self) -> ContextId {
        let raw = self.next_context.get();
        self.next_context.set(raw + 1);
        let id = ContextId::new(raw);
        self.partitions
            .borrow_mut()
            .scoped
            .insert(id, Partition::default());
        #[cfg(feature = "tracing")]
        tracing::debug!(bus = %self.name, context = %id, "opened context");
        id
    }

    fn register<K: Kind>(
        self: &Rc<Self>,
        context: Option<ContextId>,
        options: &ListenerOptions,
        callback: Callback<K>,
    ) -> Registration {
        let id = self.next_listener();
        let phase = callback.phase();
        {
            let mut partitions = self.partitions.borrow_mut();
            let registry = partitions.partition_mut(context).registry_mut::<K>();
            match callback {
                Callback::Processor(f) => registry.register_processor(id, options, f),
                Callback::Reactor(f) => registry.register_reactor(id, options, f),
            }
            partitions.slots.insert(
                id,
                Slot {
                    context,
                    kind: KindId::of::<K>(),
                },
            );
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            bus = %self.name,
            kind = K::name(),
            listener = %id,
            %phase,
            priority = %options.priority,
            label = ?options.label,
            "registered listener"
        );
        Registration::new(
            self,
            id,
            K::name(),
            phase,
            options.enabled_handle().clone(),
        )
    }

    /// Remove a listener from whichever partition holds it.
    pub(crate) fn unregister(&self, id: ListenerId) -> bool {
        let removed = {
            let mut guard = self.partitions.borrow_mut();
            let partitions = &mut *guard;
            let Some(slot) = partitions.slots.remove(&id) else {
                return false;
            };
            let partition = match slot.context {
                None => Some(&mut partitions.shared),
                Some(context) => partitions.scoped.get_mut(&context),
            };
            partition.and_then(|partition| partition.take(slot.kind, id))
        };
        // The callback drops here, after the borrow is released.
        removed.is_some()
    }

    /// Drop a context's partition. Idempotent.
    pub(crate) fn drop_partition(&self, context: ContextId) {
        let removed = {
            let mut partitions = self.partitions.borrow_mut();
            partitions
                .slots
                .retain(|_, slot| slot.context != Some(context));
            partitions.scoped.remove(&context)
        };
        if let Some(partition) = removed {
            partition.deactivate();
            #[cfg(feature = "tracing")]
            tracing::debug!(bus = %self.name, %context, "dropped context partition");
        }
    }

    /// Registry view for `K` as seen by an event scoped to `context`.
    pub(crate) fn snapshot<K: Kind>(&self, context: Option<ContextId>) -> Option<Registry<K>> {
        let partitions = self.partitions.borrow();
        let shared = partitions.shared.registry::<K>();
        let scoped = context
            .and_then(|context| partitions.scoped.get(&context))
            .and_then(|partition| partition.registry::<K>());
        match (shared, scoped) {
            (None, None) => None,
            (Some(registry), None) | (None, Some(registry)) => Some(registry.clone()),
            (Some(shared), Some(scoped)) => Some(shared.merged(scoped)),
        }
    }

    pub(crate) fn scoped_count<K: Kind>(&self, context: ContextId) -> usize {
        self.partitions
            .borrow()
            .scoped
            .get(&context)
            .and_then(|partition| partition.registry::<K>())
            .map_or(0, Registry::len)
    }

    fn shared_count<K: Kind>(&self) -> usize {
        self.partitions
            .borrow()
            .shared
            .registry::<K>()
            .map_or(0, Registry::len)
    }

    fn plan<E: Event>(&self) -> Result<Rc<Plan<E>>, KindError> {
        let id = KindId::of::<E>();
        let cached = self.plans.borrow().get(&id).cloned();
        if let Some(plan) = cached.and_then(|plan| plan.downcast::<Plan<E>>().ok()) {
            return Ok(plan);
        }
        let mut ancestry = Ancestry::new();
        <E as Event>::trace(&mut ancestry);
        let plan = Rc::new(ancestry.into_plan(id)?);
        self.plans.borrow_mut().insert(id, plan.clone());
        #[cfg(feature = "tracing")]
        tracing::trace!(bus = %self.name, event = E::name(), kinds = ?plan.names(), "planned dispatch");
        Ok(plan)
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Synchronous, single-threaded event dispatcher.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<BusInner>,
}

impl EventBus {
    /// Create a bus with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Configure a new bus.
    pub fn builder() -> BusBuilder {
        BusBuilder::default()
    }

    pub(crate) fn inner(&self) -> &Rc<BusInner> {
        &self.inner
    }

    /// The name given at construction, used in log output.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// A handle that does not keep the bus alive.
    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub(crate) fn listener_builder<K: Kind>(&self, context: Option<ContextId>) -> ListenerBuilder<K> {
        ListenerBuilder {
            bus: self.inner.clone(),
            context,
            options: ListenerOptions::new(),
            _kind: PhantomData,
        }
    }

    /// Start registering a listener for kind `K`.
    pub fn on<K: Kind>(&self) -> ListenerBuilder<K> {
        self.listener_builder(None)
    }

    /// Register a processor for kind `K` with default options.
    pub fn process<K: Kind>(&self, f: impl Fn(&mut K::View) + 'static) -> Registration {
        self.on::<K>().process(f)
    }

    /// Register a reactor for kind `K` with default options.
    pub fn react<K: Kind>(&self, f: impl Fn(&K::View) + 'static) -> Registration {
        self.on::<K>().react(f)
    }

    /// Remove a listener by id. Returns whether it was registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        self.inner.unregister(id)
    }

    /// Dispatch `event`: every processor of every kind it extends, then every
    /// reactor.
    ///
    /// The first listener error aborts the call. Panics propagate.
    pub fn call<E: Event>(&self, event: &mut E) -> Result<(), DispatchError> {
        let plan = self.inner.plan::<E>()?;
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("call", bus = %self.inner.name, event = E::name()).entered();
        plan.process(&self.inner, event)?;
        plan.react(&self.inner, event)
    }

    /// Run only the process pass.
    pub fn process_phase<E: Event>(&self, event: &mut E) -> Result<(), DispatchError> {
        let plan = self.inner.plan::<E>()?;
        plan.process(&self.inner, event)
    }

    /// Run only the react pass.
    pub fn react_phase<E: Event>(&self, event: &E) -> Result<(), DispatchError> {
        let plan = self.inner.plan::<E>()?;
        plan.react(&self.inner, event)
    }

    /// The kinds `E` dispatches through, in order.
    pub fn lineage<E: Event>(&self) -> Result<Vec<KindId>, KindError> {
        Ok(self.inner.plan::<E>()?.order())
    }

    /// Names of the kinds `E` dispatches through, in order.
    pub fn lineage_names<E: Event>(&self) -> Result<Vec<&'static str>, KindError> {
        Ok(self.inner.plan::<E>()?.names())
    }

    /// Number of shared listeners bound to `K`.
    pub fn listener_count<K: Kind>(&self) -> usize {
        self.inner.shared_count::<K>()
    }

    /// Open a new context partition.
    pub fn context(&self) -> Context {
        let id = self.inner.open_context();
        Context::new(self.clone(), id)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

/// Non-owning bus handle.
#[derive(Debug, Clone)]
pub struct WeakBus {
    inner: Weak<BusInner>,
}

impl WeakBus {
    /// The bus, if it is still alive.
    pub fn upgrade(&self) -> Option<EventBus> {
        self.inner.upgrade().map(|inner| EventBus { inner })
    }
}

/// Builder for [`EventBus`].
#[derive(Debug, Clone)]
pub struct BusBuilder {
    name: String,
}

impl Default for BusBuilder {
    fn default() -> Self {
        Self {
            name: "kindred".to_owned(),
        }
    }
}

impl BusBuilder {
    /// Set the bus name shown in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Build the bus.
    pub fn build(self) -> EventBus {
        EventBus {
            inner: BusInner::new(self.name),
        }
    }
}

// ============================================================================
// Listener Builder
// ============================================================================

/// Fluent registration of one listener for kind `K`.
///
/// Finished by one of [`process`](Self::process),
/// [`try_process`](Self::try_process), [`react`](Self::react) or
/// [`try_react`](Self::try_react).
#[must_use = "a listener is only registered once `process` or `react` is called"]
pub struct ListenerBuilder<K: Kind> {
    bus: Rc<BusInner>,
    context: Option<ContextId>,
    options: ListenerOptions,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> ListenerBuilder<K> {
    /// Execution order; lower runs first.
    pub fn priority(mut self, priority: impl Into<Priority>) -> Self {
        self.options.priority = priority.into();
        self
    }

    /// Label shown in logs and errors.
    pub fn label(mut self, label: &'static str) -> Self {
        self.options.label = Some(label);
        self
    }

    /// Initial enabled state.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.options = self.options.with_enabled(enabled);
        self
    }

    /// Share an existing enabled switch.
    pub fn handle(mut self, handle: EnabledHandle) -> Self {
        self.options = self.options.with_handle(handle);
        self
    }

    /// Replace all options at once.
    pub fn options(mut self, options: ListenerOptions) -> Self {
        self.options = options;
        self
    }

    /// Register an infallible processor.
    pub fn process(self, f: impl Fn(&mut K::View) + 'static) -> Registration {
        self.try_process(move |view: &mut K::View| -> Result<(), BoxError> {
            f(view);
            Ok(())
        })
    }

    /// Register a processor whose error aborts the dispatch.
    pub fn try_process<F, Error>(self, f: F) -> Registration
    where
        F: Fn(&mut K::View) -> Result<(), Error> + 'static,
        Error: Into<BoxError>,
    {
        let callback = Box::new(move |view: &mut K::View| -> Result<(), BoxError> {
            f(view).map_err(Into::into)
        });
        self.bus
            .register::<K>(self.context, &self.options, Callback::Processor(callback))
    }

    /// Register an infallible reactor.
    pub fn react(self, f: impl Fn(&K::View) + 'static) -> Registration {
        self.try_react(move |view: &K::View| -> Result<(), BoxError> {
            f(view);
            Ok(())
        })
    }

    /// Register a reactor whose error aborts the dispatch.
    pub fn try_react<F, Error>(self, f: F) -> Registration
    where
        F: Fn(&K::View) -> Result<(), Error> + 'static,
        Error: Into<BoxError>,
    {
        let callback = Box::new(move |view: &K::View| -> Result<(), BoxError> {
            f(view).map_err(Into::into)
        });
        self.bus
            .register::<K>(self.context, &self.options, Callback::Reactor(callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Default)]
    struct Tick(Vec<u32>);

    impl Kind for Tick {
        type View = Self;
        type Parents = ();
    }

    #[test]
    fn test_process_then_react() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let _react = bus.react::<Tick>(move |tick| log.borrow_mut().push(tick.0.clone()));
        let _process = bus.process::<Tick>(|tick| tick.0.push(1));

        let mut tick = Tick::default();
        bus.call(&mut tick).unwrap();
        assert_eq!(tick.0, [1]);
        assert_eq!(*seen.borrow(), [vec![1]]);
    }

    #[test]
    fn test_registration_drop_unregisters() {
        let bus = EventBus::new();
        let reg = bus.process::<Tick>(|tick| tick.0.push(1));
        assert_eq!(bus.listener_count::<Tick>(), 1);
        drop(reg);
        assert_eq!(bus.listener_count::<Tick>(), 0);

        let mut tick = Tick::default();
        bus.call(&mut tick).unwrap();
        assert!(tick.0.is_empty());
    }

    #[test]
    fn test_unregister_by_id_is_idempotent() {
        let bus = EventBus::new();
        let id = bus.process::<Tick>(|_| {}).forget();
        assert!(bus.unregister(id));
        assert!(!bus.unregister(id));
    }

    #[test]
    fn test_forget_outlives_handle() {
        let bus = EventBus::new();
        let reg = bus.process::<Tick>(|tick| tick.0.push(7));
        let id = reg.id();
        assert_eq!(reg.forget(), id);

        let mut tick = Tick::default();
        bus.call(&mut tick).unwrap();
        assert_eq!(tick.0, [7]);
    }

    #[test]
    fn test_teardown_listener_is_not_counted() {
        let bus = EventBus::new();
        assert_eq!(bus.listener_count::<ContextClosed>(), 0);
    }

    #[test]
    fn test_weak_bus_does_not_keep_alive() {
        let bus = EventBus::builder().name("weak").build();
        let weak = bus.downgrade();
        assert_eq!(weak.upgrade().map(|bus| bus.name().to_owned()), Some("weak".into()));
        drop(bus);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_registration_reports_metadata() {
        let bus = EventBus::new();
        let reg = bus.on::<Tick>().priority(3).label("meta").react(|_| {});
        assert_eq!(reg.phase(), Phase::React);
        assert_eq!(reg.kind_name(), Tick::name());
        assert!(reg.enabled_handle().is_enabled());
        assert!(reg.unregister());
    }

    #[test]
    fn test_reused_options_keep_separate_switches() {
        let bus = EventBus::new();
        let base = ListenerOptions::new().with_priority(1);
        let _on = bus.on::<Tick>().options(base.clone()).process(|tick| tick.0.push(1));
        let _off = bus
            .on::<Tick>()
            .options(base.clone().with_enabled(false))
            .process(|tick| tick.0.push(100));
        let _builder_off = bus
            .on::<Tick>()
            .options(base)
            .enabled(false)
            .process(|tick| tick.0.push(1000));

        let mut tick = Tick::default();
        bus.call(&mut tick).unwrap();
        assert_eq!(tick.0, [1]);
    }
}
