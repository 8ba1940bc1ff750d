//! # kindred - Hierarchy-Aware Event Dispatch
//!
//! `kindred` delivers events whose kinds form a DAG. One `call()` runs every
//! processor of every kind the event extends, roots first and the concrete
//! kind last, then every reactor in the same order. A kind reached through two
//! paths of a diamond still runs once.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kindred::prelude::*;
//!
//! #[derive(Debug, Clone, Event)]
//! #[event(parents(Cancellable))]
//! struct Chat {
//!     #[extends]
//!     cancel: Cancellable,
//!     text: String,
//! }
//!
//! let bus = EventBus::new();
//! let _filter = bus.process::<Chat>(|chat| {
//!     if chat.text.contains("spam") {
//!         chat.cancel();
//!     }
//! });
//! let _print = bus.react::<Chat>(|chat| println!("{}", chat.text));
//!
//! bus.call(&mut Chat { cancel: Cancellable::new(), text: "hi".into() })?;
//! ```
//!
//! ## Features
//!
//! - `macros` (default): `#[derive(Event)]`
//! - `tracing` (default): dispatch spans and registration logs via `tracing`

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use kindred_core::{
    // Kinds
    Ancestry,
    // Errors
    BoxError,
    // Bus
    BusBuilder,
    // Contexts
    Context,
    ContextClosed,
    ContextId,
    DispatchError,
    DynEvent,
    // Listeners
    EnabledHandle,
    Event,
    EventBus,
    Extends,
    Kind,
    KindError,
    KindGraph,
    KindId,
    KindList,
    KindredError,
    Lineage,
    ListenerBuilder,
    ListenerFailure,
    ListenerId,
    ListenerOptions,
    Phase,
    Priority,
    Registration,
    WeakBus,
};

// Capabilities
pub use kindred_std::capabilities::{
    CancelExt, Cancellable, CloneAs, CloneEvent, Cloneable, Exclusive, ExclusiveExt, Scoped,
};

// Lifecycle
pub use kindred_std::lifecycle::{
    Construct, Destruct, Lifecycle, LifecycleError, Tracked, construct, destruct,
};

/// Standard listener implementations.
pub mod hooks {
    pub use kindred_std::hooks::logging;
}

/// Testing utilities.
pub mod testing {
    pub use kindred_std::testing::{Counter, Recorder};
}

/// Prelude module - common imports for Kindred.
///
/// # Usage
///
/// ```rust,ignore
/// use kindred::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Capabilities
        CancelExt,
        Cancellable,
        CloneAs,
        CloneEvent,
        Cloneable,
        // Errors
        DispatchError,
        Event,
        EventBus,
        Exclusive,
        ExclusiveExt,
        Extends,
        // Core traits
        Kind,
        Priority,
        Registration,
        Scoped,
    };
}

#[cfg(feature = "macros")]
pub use kindred_macros::Event;
