//! Error types for Kindred.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`KindredError`] - Top-level error type for all Kindred operations
//! - [`DispatchError`] - Errors that abort a `call()`
//! - [`KindError`] - Malformed kind declarations
//! - [`ListenerFailure`] - A single listener returning an error

use crate::{
    kind::KindId,
    listener::{ListenerId, Phase},
};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Kindred operations.
#[derive(Error, Debug)]
pub enum KindredError {
    /// An error occurred during event dispatch.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A kind hierarchy is malformed.
    #[error("kind error: {0}")]
    Kind(#[from] KindError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Errors that abort a dispatch.
///
/// Listener errors are never swallowed: the first failing listener stops the
/// whole `call()`, including the remaining ancestor kinds and the react pass.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener returned an error.
    #[error("{phase} listener for `{kind}` failed")]
    Listener {
        /// Name of the kind whose registry held the listener.
        kind: &'static str,
        /// Phase that was running.
        phase: Phase,
        /// The failing listener and its error.
        #[source]
        failure: ListenerFailure,
    },

    /// The event's kind hierarchy could not be ordered.
    #[error(transparent)]
    Kind(#[from] KindError),
}

impl DispatchError {
    /// The listener that failed, if this error came from a listener.
    pub fn listener(&self) -> Option<ListenerId> {
        match self {
            DispatchError::Listener { failure, .. } => Some(failure.listener),
            DispatchError::Kind(_) => None,
        }
    }
}

/// A listener returned an error from its callback.
#[derive(Error, Debug)]
#[error("listener {listener} ({}) returned an error", .label.unwrap_or("unlabelled"))]
pub struct ListenerFailure {
    /// Identity of the failing listener.
    pub listener: ListenerId,
    /// Label given at registration.
    pub label: Option<&'static str>,
    /// The error the callback returned.
    #[source]
    pub source: BoxError,
}

/// Errors in a kind graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KindError {
    /// A kind listed itself among its parents.
    #[error("kind `{0}` lists itself as a parent")]
    SelfParent(&'static str),

    /// The same kind was declared twice with different parents.
    #[error("kind `{0}` was declared twice with different parents")]
    Duplicate(&'static str),

    /// A kind is reachable from itself through its parents.
    #[error("kind `{0}` is its own ancestor")]
    Cycle(&'static str),

    /// A kind was referenced but never declared.
    #[error("kind {0:?} was never declared")]
    Unknown(KindId),
}

// Convenience conversions
impl From<BoxError> for KindredError {
    fn from(err: BoxError) -> Self {
        KindredError::Custom(err)
    }
}
