//! Context partitions.
//!
//! A [`Context`] is an isolated set of registries on a bus. Listeners
//! registered through it only see events scoped to it (see
//! [`Kind::context`]); listeners registered on the bus itself see every event.
//!
//! Closing a context dispatches [`ContextClosed`] through the normal engine.
//! The bus owns a reactor for it that runs after every other reactor and drops
//! the whole partition, so context listeners observe their own shutdown.
//!
//! ```rust,ignore
//! let ctx = bus.context();
//! let _reg = ctx.react::<Chat>(|chat| println!("{}", chat.text));
//!
//! bus.call(&mut Chat::scoped(ctx.id(), "hi"))?; // seen
//! bus.call(&mut Chat::new("hello"))?;           // not scoped, not seen
//! ctx.close()?;
//! ```

use crate::{
    bus::{EventBus, ListenerBuilder},
    error::DispatchError,
    kind::Kind,
    listener::Registration,
};
use std::fmt;

/// Identity of a context partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// Announced when a context closes.
///
/// Scoped to the closing context, so both its own listeners and shared ones
/// receive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextClosed {
    context: ContextId,
}

impl ContextClosed {
    pub(crate) fn new(context: ContextId) -> Self {
        Self { context }
    }

    /// The context being closed.
    pub fn context(&self) -> ContextId {
        self.context
    }
}

impl Kind for ContextClosed {
    type View = Self;
    type Parents = ();

    fn name() -> &'static str {
        "ContextClosed"
    }

    fn context(view: &Self) -> Option<ContextId> {
        Some(view.context)
    }
}

/// An isolated partition of listeners on a bus.
///
/// Dropping a context closes it. Use [`Context::close`] to observe errors from
/// `ContextClosed` listeners; a failure during drop panics.
pub struct Context {
    bus: EventBus,
    id: ContextId,
    closed: bool,
}

impl Context {
    pub(crate) fn new(bus: EventBus, id: ContextId) -> Self {
        Self {
            bus,
            id,
            closed: false,
        }
    }

    /// This context's id.
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// The bus the context belongs to.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Start registering a listener for kind `K` in this context.
    pub fn on<K: Kind>(&self) -> ListenerBuilder<K> {
        self.bus.listener_builder(Some(self.id))
    }

    /// Register a processor for kind `K` in this context.
    pub fn process<K: Kind>(&self, f: impl Fn(&mut K::View) + 'static) -> Registration {
        self.on::<K>().process(f)
    }

    /// Register a reactor for kind `K` in this context.
    pub fn react<K: Kind>(&self, f: impl Fn(&K::View) + 'static) -> Registration {
        self.on::<K>().react(f)
    }

    /// Number of listeners bound to `K` in this context.
    pub fn listener_count<K: Kind>(&self) -> usize {
        self.bus.inner().scoped_count::<K>(self.id)
    }

    /// Close the context, dispatching [`ContextClosed`] and dropping every
    /// listener registered through it.
    ///
    /// The partition is gone afterwards even if a listener failed.
    pub fn close(mut self) -> Result<(), DispatchError> {
        self.closed = true;
        self.shutdown()
    }

    fn shutdown(&self) -> Result<(), DispatchError> {
        let result = self.bus.call(&mut ContextClosed::new(self.id));
        self.bus.inner().drop_partition(self.id);
        result
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("bus", &self.bus.name())
            .finish()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.shutdown()
            && !std::thread::panicking()
        {
            panic!("closing {} failed: {err}", self.id);
        }
    }
}
