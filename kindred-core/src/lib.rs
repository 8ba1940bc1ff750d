//! # kindred-core
//!
//! The engine behind Kindred: a synchronous, strongly typed event bus whose
//! event kinds form a DAG.
//!
//! # Model
//!
//! - A [`Kind`] is a `'static` type naming a category of occurrence. It lists
//!   its parent kinds and the [`Kind::View`] its listeners receive.
//! - An [`Event`] is a concrete kind that views itself and provides an
//!   [`Extends`] projection for every ancestor.
//! - Listeners are either processors (mutable, run first) or reactors
//!   (shared, run after every processor).
//!
//! # Dispatch
//!
//! [`EventBus::call`] walks the event's kind DAG in layered topological order
//! (roots first, the concrete kind last), running each kind's registry once,
//! then does the same for reactors. Each kind's [`Kind::should_process`] and
//! [`Kind::should_react`] hooks gate every listener, which is how capabilities
//! such as cancellation compose without the engine knowing about them.
//!
//! # Error Types
//!
//! - [`KindredError`] - Top-level error type
//! - [`DispatchError`] - Errors that abort a `call()`
//! - [`KindError`] - Malformed kind graphs

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod bus;
mod context;
mod dynamic;
mod error;
mod graph;
mod kind;
mod lineage;
mod listener;
mod priority;
mod registry;

// Re-exports
pub use bus::{BusBuilder, EventBus, ListenerBuilder, WeakBus};
pub use context::{Context, ContextClosed, ContextId};
pub use dynamic::DynEvent;
pub use error::{BoxError, DispatchError, KindError, KindredError, ListenerFailure};
pub use graph::KindGraph;
pub use kind::{Event, Extends, Kind, KindId, KindList, Lineage};
pub use lineage::Ancestry;
pub use listener::{EnabledHandle, ListenerId, ListenerOptions, Phase, Registration};
pub use priority::Priority;
