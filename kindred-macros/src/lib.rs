//! Procedural macros for Kindred.
//!
//! - `#[derive(Event)]` - declare a concrete event kind, its parents and its
//!   projections to ancestor kinds

use proc_macro::TokenStream;

mod event;

/// Derive macro declaring a concrete event kind.
///
/// Implements `Kind` with `View = Self` and one `Extends` projection per
/// marked field or coerced kind.
///
/// # Attributes
///
/// - `#[event(parents(A, B))]` - direct parent kinds, in dispatch order
/// - `#[event(coerce(Cloneable))]` - kinds whose view is a trait object the
///   event itself implements
/// - `#[event(name = "Chat")]` - name used in logs and errors (defaults to
///   the type name)
/// - `#[extends]` on a field - the field's type is an ancestor kind viewing
///   itself, and the field holds that state
/// - `#[extends(A, B)]` on a field - the field is itself an event extending
///   `A` and `B`; projections delegate to it
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Event)]
/// #[event(parents(Cancellable, Cloneable), coerce(Cloneable))]
/// struct Chat {
///     #[extends]
///     cancel: Cancellable,
///     text: String,
/// }
/// ```
#[proc_macro_derive(Event, attributes(event, extends))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    event::derive_event_impl(input)
}
