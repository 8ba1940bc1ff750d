//! # Event Kinds
//!
//! A kind is a `'static` type that identifies a category of occurrence and
//! declares its parent kinds. Kinds form a DAG; diamonds are expected.
//!
//! # Views
//!
//! Listeners registered for a kind receive that kind's [`Kind::View`]:
//!
//! - A concrete event views itself (`View = Self`).
//! - A capability kind views a state part embedded in the event, such as a
//!   cancellation flag.
//! - A kind may also view a trait object the event implements.
//!
//! A concrete event provides one [`Extends`] projection per transitive
//! ancestor. The [`Lineage`] bounds require every projection, so a missing one
//! (or a kind that is its own ancestor) fails to compile instead of failing at
//! dispatch time.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Chat {
//!     cancel: Cancellable,
//!     text: String,
//! }
//!
//! impl Kind for Chat {
//!     type View = Self;
//!     type Parents = (Cancellable,);
//! }
//!
//! impl Extends<Cancellable> for Chat {
//!     fn view(&self) -> &Cancellable {
//!         &self.cancel
//!     }
//!     fn view_mut(&mut self) -> &mut Cancellable {
//!         &mut self.cancel
//!     }
//! }
//! ```

use crate::{context::ContextId, lineage::Ancestry, listener::ListenerId};
use std::{any::TypeId, fmt};

/// Runtime identity of a kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(TypeId);

impl KindId {
    /// The identity of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self(TypeId::of::<T>())
    }
}

impl fmt::Debug for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KindId({:?})", self.0)
    }
}

/// A node in the kind DAG.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an event kind",
    label = "missing `Kind` implementation",
    note = "Implement `Kind` or use `#[derive(Event)]` to declare the kind and its parents."
)]
pub trait Kind: 'static {
    /// What listeners of this kind receive.
    type View: ?Sized + 'static;

    /// Direct parent kinds, as a tuple. `()` for a root.
    type Parents: KindList;

    /// Human readable name used in logs and errors.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Gate evaluated before each processor runs on an event of this kind
    /// (or of any descendant kind).
    fn should_process(_view: &Self::View, _listener: ListenerId) -> bool {
        true
    }

    /// Gate evaluated before each reactor runs.
    fn should_react(_view: &Self::View, _listener: ListenerId) -> bool {
        true
    }

    /// The context partition this event is scoped to, if any.
    fn context(_view: &Self::View) -> Option<ContextId> {
        None
    }
}

/// Projection from a concrete event to the view of one of its ancestor kinds.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not extend `{K}`",
    label = "missing projection to `{K}`",
    note = "Every transitive ancestor needs an `Extends` impl; with `#[derive(Event)]` mark the field holding `{K}` with `#[extends]`."
)]
pub trait Extends<K: Kind>: Kind {
    /// Shared view as `K`.
    fn view(&self) -> &K::View;

    /// Mutable view as `K`.
    fn view_mut(&mut self) -> &mut K::View;
}

// A concrete kind views itself.
impl<E: Kind<View = E>> Extends<E> for E {
    fn view(&self) -> &E {
        self
    }

    fn view_mut(&mut self) -> &mut E {
        self
    }
}

/// A tuple of kinds, used for [`Kind::Parents`].
pub trait KindList: 'static {
    /// Identities in declaration order.
    fn ids() -> Vec<KindId>;
}

impl KindList for () {
    fn ids() -> Vec<KindId> {
        Vec::new()
    }
}

/// A parent list whose kinds (and their ancestors) the event `E` extends.
///
/// Implemented for tuples of up to eight kinds. The recursive bounds are what
/// reject cyclic declarations and missing projections at compile time.
pub trait Lineage<E>: KindList {
    /// Record every kind in this list, then their ancestors.
    fn trace(ancestry: &mut Ancestry<E>);
}

impl<E> Lineage<E> for () {
    fn trace(_ancestry: &mut Ancestry<E>) {}
}

macro_rules! impl_parent_tuples {
    ($($name:ident),+) => {
        impl<$($name: Kind),+> KindList for ($($name,)+) {
            fn ids() -> Vec<KindId> {
                vec![$(KindId::of::<$name>()),+]
            }
        }

        impl<E, $($name: Kind),+> Lineage<E> for ($($name,)+)
        where
            E: 'static,
            $(
                E: Extends<$name>,
                <$name as Kind>::Parents: Lineage<E>,
            )+
        {
            fn trace(ancestry: &mut Ancestry<E>) {
                $(
                    if ancestry.insert::<$name>() {
                        <<$name as Kind>::Parents as Lineage<E>>::trace(ancestry);
                    }
                )+
            }
        }
    };
}

impl_parent_tuples!(A);
impl_parent_tuples!(A, B);
impl_parent_tuples!(A, B, C);
impl_parent_tuples!(A, B, C, D);
impl_parent_tuples!(A, B, C, D, F);
impl_parent_tuples!(A, B, C, D, F, G);
impl_parent_tuples!(A, B, C, D, F, G, H);
impl_parent_tuples!(A, B, C, D, F, G, H, I);

/// A concrete, dispatchable kind.
///
/// Implemented automatically for every kind that views itself and whose
/// parents resolve to projections it provides.
pub trait Event: Kind<View = Self> + Sized {
    /// Record this kind and every ancestor.
    fn trace(ancestry: &mut Ancestry<Self>);
}

impl<E> Event for E
where
    E: Kind<View = E>,
    E::Parents: Lineage<E>,
{
    fn trace(ancestry: &mut Ancestry<Self>) {
        if ancestry.insert::<E>() {
            <E::Parents as Lineage<E>>::trace(ancestry);
        }
    }
}
