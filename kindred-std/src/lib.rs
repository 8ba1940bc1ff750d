//! # kindred-std
//!
//! Standard building blocks for the Kindred event framework.
//!
//! This crate provides:
//! - **Capabilities**: [`Cancellable`], [`Exclusive`], [`Cloneable`], [`Scoped`]
//! - **Lifecycle events**: [`Construct`], [`Destruct`], [`Tracked`]
//! - **Standard hooks**: logging reactor
//! - **Testing utilities**: [`Recorder`](testing::Recorder), [`Counter`](testing::Counter)
//!
//! [`Cancellable`]: capabilities::Cancellable
//! [`Exclusive`]: capabilities::Exclusive
//! [`Cloneable`]: capabilities::Cloneable
//! [`Scoped`]: capabilities::Scoped
//! [`Construct`]: lifecycle::Construct
//! [`Destruct`]: lifecycle::Destruct
//! [`Tracked`]: lifecycle::Tracked

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use kindred_core;

// Modules
pub mod capabilities;
pub mod hooks;
pub mod lifecycle;
pub mod testing;
