//! Capability kinds.
//!
//! A capability is a parent kind whose view is a small state part embedded in
//! the event (or, for [`Cloneable`], a trait object). Its gating hooks read
//! that state, so listing the capability among an event's parents is all it
//! takes to opt in. Several capabilities compose: the bus requires every
//! kind's gate to open before a listener runs.
//!
//! | Capability      | View              | Effect                                          |
//! |-----------------|-------------------|-------------------------------------------------|
//! | [`Cancellable`] | `Cancellable`     | once cancelled, no reactor runs                 |
//! | [`Exclusive`]   | `Exclusive`       | only the claiming reactor runs                  |
//! | [`Cloneable`]   | `dyn CloneEvent`  | listeners can copy the event and re-dispatch it |
//! | [`Scoped`]      | `Scoped`          | the event reaches one context's listeners       |

mod cancellable;
mod cloneable;
mod exclusive;
mod scoped;

pub use cancellable::{CancelExt, Cancellable};
pub use cloneable::{CloneAs, CloneEvent, Cloneable};
pub use exclusive::{Exclusive, ExclusiveExt};
pub use scoped::Scoped;
