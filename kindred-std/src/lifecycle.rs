//! Construction and destruction announcements.
//!
//! A type opts in by implementing [`Lifecycle`] with a token type that only it
//! can create. Since [`Construct::new`] and [`Destruct::new`] demand that
//! token, nobody else can announce the type's lifecycle.
//!
//! ```rust,ignore
//! pub struct Session { user: String }
//!
//! pub struct SessionToken(());
//!
//! impl Lifecycle for Session {
//!     type Token = SessionToken;
//! }
//!
//! impl Session {
//!     pub fn open(bus: &EventBus, user: String) -> Result<Session, LifecycleError> {
//!         construct(bus, Session { user }, SessionToken(()))
//!     }
//! }
//! ```
//!
//! Processors of `Construct<T>` may adjust the instance before it is handed
//! back; reactors observe the final value.

use kindred_core::{DispatchError, EventBus, Kind};
use std::{
    any::type_name,
    fmt,
    ops::{Deref, DerefMut},
};
use thiserror::Error;

/// A type whose construction and destruction can be announced.
pub trait Lifecycle: 'static {
    /// Proof of authority to announce this type. Give it a private
    /// constructor.
    type Token;
}

/// Announcing a lifecycle event failed.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// A `Construct<T>` listener failed.
    #[error("announcing construction of `{type_name}` failed")]
    Construct {
        /// The announced type.
        type_name: &'static str,
        /// The dispatch failure.
        #[source]
        source: DispatchError,
    },

    /// A `Destruct<T>` listener failed.
    #[error("announcing destruction of `{type_name}` failed")]
    Destruct {
        /// The announced type.
        type_name: &'static str,
        /// The dispatch failure.
        #[source]
        source: DispatchError,
    },
}

// ============================================================================
// Construct / Destruct
// ============================================================================

/// Announces that a `T` was just built.
pub struct Construct<T: Lifecycle> {
    instance: T,
}

impl<T: Lifecycle> Construct<T> {
    /// Wrap a freshly built instance.
    pub fn new(instance: T, _token: T::Token) -> Self {
        Self { instance }
    }

    /// The instance being constructed.
    pub fn instance(&self) -> &T {
        &self.instance
    }

    /// Mutable access for processors.
    pub fn instance_mut(&mut self) -> &mut T {
        &mut self.instance
    }

    /// Take the instance back.
    pub fn into_inner(self) -> T {
        self.instance
    }
}

impl<T: Lifecycle> Kind for Construct<T> {
    type View = Self;
    type Parents = ();
}

impl<T: Lifecycle + fmt::Debug> fmt::Debug for Construct<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Construct").field(&self.instance).finish()
    }
}

/// Announces that a `T` is about to go away.
pub struct Destruct<T: Lifecycle> {
    instance: T,
}

impl<T: Lifecycle> Destruct<T> {
    /// Wrap an instance that is being torn down.
    pub fn new(instance: T, _token: T::Token) -> Self {
        Self { instance }
    }

    /// The instance being destroyed.
    pub fn instance(&self) -> &T {
        &self.instance
    }

    /// Mutable access for processors, e.g. to flush state.
    pub fn instance_mut(&mut self) -> &mut T {
        &mut self.instance
    }

    /// Take the instance back.
    pub fn into_inner(self) -> T {
        self.instance
    }
}

impl<T: Lifecycle> Kind for Destruct<T> {
    type View = Self;
    type Parents = ();
}

impl<T: Lifecycle + fmt::Debug> fmt::Debug for Destruct<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Destruct").field(&self.instance).finish()
    }
}

/// Announce construction of `instance` and return it, as adjusted by
/// processors.
pub fn construct<T: Lifecycle>(
    bus: &EventBus,
    instance: T,
    token: T::Token,
) -> Result<T, LifecycleError> {
    let mut event = Construct::new(instance, token);
    bus.call(&mut event)
        .map_err(|source| LifecycleError::Construct {
            type_name: type_name::<T>(),
            source,
        })?;
    Ok(event.into_inner())
}

/// Announce destruction of `instance`, then drop it.
pub fn destruct<T: Lifecycle>(
    bus: &EventBus,
    instance: T,
    token: T::Token,
) -> Result<(), LifecycleError> {
    let mut event = Destruct::new(instance, token);
    bus.call(&mut event)
        .map_err(|source| LifecycleError::Destruct {
            type_name: type_name::<T>(),
            source,
        })
}

// ============================================================================
// Tracked
// ============================================================================

/// Owns a `T` and announces its whole lifecycle: construction when created,
/// destruction when dropped.
///
/// A destruction failure during drop panics, unless the thread is already
/// panicking. Call [`Tracked::finish`] to handle it instead.
pub struct Tracked<T: Lifecycle>
where
    T::Token: Clone,
{
    bus: EventBus,
    instance: Option<T>,
    token: T::Token,
}

impl<T: Lifecycle> Tracked<T>
where
    T::Token: Clone,
{
    /// Announce construction and start tracking.
    pub fn new(bus: &EventBus, instance: T, token: T::Token) -> Result<Self, LifecycleError> {
        let instance = construct(bus, instance, token.clone())?;
        Ok(Self {
            bus: bus.clone(),
            instance: Some(instance),
            token,
        })
    }

    /// Announce destruction now and report any listener error.
    pub fn finish(mut self) -> Result<(), LifecycleError> {
        match self.instance.take() {
            Some(instance) => destruct(&self.bus, instance, self.token.clone()),
            None => Ok(()),
        }
    }
}

impl<T: Lifecycle> Deref for Tracked<T>
where
    T::Token: Clone,
{
    type Target = T;

    fn deref(&self) -> &T {
        // Only `finish` and `drop` empty the slot, and both consume the value.
        self.instance.as_ref().expect("tracked instance already destroyed")
    }
}

impl<T: Lifecycle> DerefMut for Tracked<T>
where
    T::Token: Clone,
{
    fn deref_mut(&mut self) -> &mut T {
        self.instance.as_mut().expect("tracked instance already destroyed")
    }
}

impl<T: Lifecycle> Drop for Tracked<T>
where
    T::Token: Clone,
{
    fn drop(&mut self) {
        let Some(instance) = self.instance.take() else {
            return;
        };
        if let Err(err) = destruct(&self.bus, instance, self.token.clone())
            && !std::thread::panicking()
        {
            panic!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Recorder;

    #[derive(Debug, PartialEq)]
    struct Widget {
        size: u32,
    }

    #[derive(Clone)]
    struct WidgetToken(());

    impl Lifecycle for Widget {
        type Token = WidgetToken;
    }

    #[test]
    fn test_construct_returns_adjusted_instance() {
        let bus = EventBus::new();
        let _grow = bus.process::<Construct<Widget>>(|event| event.instance_mut().size *= 2);

        let widget = construct(&bus, Widget { size: 2 }, WidgetToken(())).unwrap();
        assert_eq!(widget, Widget { size: 4 });
    }

    #[test]
    fn test_tracked_announces_both_ends() {
        let bus = EventBus::new();
        let log = Recorder::new();
        let seen = log.clone();
        let _built = bus.react::<Construct<Widget>>(move |e| seen.record(("built", e.instance().size)));
        let seen = log.clone();
        let _gone = bus.react::<Destruct<Widget>>(move |e| seen.record(("gone", e.instance().size)));

        {
            let mut widget = Tracked::new(&bus, Widget { size: 1 }, WidgetToken(())).unwrap();
            widget.size = 5;
        }
        assert_eq!(log.take(), [("built", 1), ("gone", 5)]);
    }

    #[test]
    fn test_destruct_error_is_reported() {
        let bus = EventBus::new();
        let _fail = bus
            .on::<Destruct<Widget>>()
            .try_react(|_| Err::<(), _>("still referenced"));

        let widget = Tracked::new(&bus, Widget { size: 1 }, WidgetToken(())).unwrap();
        let err = widget.finish().unwrap_err();
        assert!(matches!(err, LifecycleError::Destruct { .. }));
    }
}
