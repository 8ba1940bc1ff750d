//! Per-kind listener registry.
//!
//! A [`Registry`] holds the processors and reactors bound to one kind in one
//! partition. Both lists stay sorted by `(priority, id)`; since ids grow with
//! every registration, ties keep registration order.
//!
//! Dispatch runs over a snapshot: the bus clones the entry lists (cheap `Rc`
//! clones) and releases its borrow before any callback runs. Unregistering
//! flips the shared `active` flag, so an entry removed mid-pass is skipped by
//! the snapshot too.

use crate::{
    error::{BoxError, ListenerFailure},
    kind::{Extends, Kind},
    listener::{EnabledHandle, ListenerId, ListenerOptions},
    priority::Priority,
};
use std::{any::Any, cell::Cell, rc::Rc};

/// Mutable callback bound to kind `K`.
pub(crate) type ProcessorFn<K> = dyn Fn(&mut <K as Kind>::View) -> Result<(), BoxError>;
/// Observing callback bound to kind `K`.
pub(crate) type ReactorFn<K> = dyn Fn(&<K as Kind>::View) -> Result<(), BoxError>;

pub(crate) struct Entry<F: ?Sized> {
    id: ListenerId,
    priority: Priority,
    label: Option<&'static str>,
    active: Cell<bool>,
    enabled: EnabledHandle,
    callback: Box<F>,
}

impl<F: ?Sized> Entry<F> {
    fn new(id: ListenerId, options: &ListenerOptions, callback: Box<F>) -> Rc<Self> {
        Rc::new(Self {
            id,
            priority: options.priority,
            label: options.label,
            active: Cell::new(true),
            enabled: options.enabled_handle().clone(),
            callback,
        })
    }

    fn key(&self) -> (Priority, ListenerId) {
        (self.priority, self.id)
    }

    fn runnable(&self) -> bool {
        self.active.get() && self.enabled.is_enabled()
    }

    fn failure(&self, source: BoxError) -> ListenerFailure {
        ListenerFailure {
            listener: self.id,
            label: self.label,
            source,
        }
    }
}

fn insert_sorted<F: ?Sized>(entries: &mut Vec<Rc<Entry<F>>>, entry: Rc<Entry<F>>) {
    let key = entry.key();
    let at = entries.partition_point(|existing| existing.key() <= key);
    entries.insert(at, entry);
}

fn remove_by_id<F: ?Sized + 'static>(
    entries: &mut Vec<Rc<Entry<F>>>,
    id: ListenerId,
) -> Option<Box<dyn Any>> {
    let at = entries.iter().position(|entry| entry.id == id)?;
    let entry = entries.remove(at);
    entry.active.set(false);
    Some(Box::new(entry))
}

fn merge_sorted<F: ?Sized>(a: &[Rc<Entry<F>>], b: &[Rc<Entry<F>>]) -> Vec<Rc<Entry<F>>> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].key() <= b[j].key() {
            merged.push(a[i].clone());
            i += 1;
        } else {
            merged.push(b[j].clone());
            j += 1;
        }
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);
    merged
}

/// Ordered processors and reactors for kind `K`.
pub(crate) struct Registry<K: Kind> {
    processors: Vec<Rc<Entry<ProcessorFn<K>>>>,
    reactors: Vec<Rc<Entry<ReactorFn<K>>>>,
}

impl<K: Kind> Default for Registry<K> {
    fn default() -> Self {
        Self {
            processors: Vec::new(),
            reactors: Vec::new(),
        }
    }
}

// Snapshot: entries are shared, not deep-copied.
impl<K: Kind> Clone for Registry<K> {
    fn clone(&self) -> Self {
        Self {
            processors: self.processors.clone(),
            reactors: self.reactors.clone(),
        }
    }
}

impl<K: Kind> Registry<K> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a processor after every entry with priority `<=` its own.
    pub(crate) fn register_processor(
        &mut self,
        id: ListenerId,
        options: &ListenerOptions,
        callback: Box<ProcessorFn<K>>,
    ) {
        insert_sorted(&mut self.processors, Entry::new(id, options, callback));
    }

    /// Insert a reactor after every entry with priority `<=` its own.
    pub(crate) fn register_reactor(
        &mut self,
        id: ListenerId,
        options: &ListenerOptions,
        callback: Box<ReactorFn<K>>,
    ) {
        insert_sorted(&mut self.reactors, Entry::new(id, options, callback));
    }

    /// Remove a listener. Returns whether anything was removed.
    #[cfg(test)]
    pub(crate) fn unregister(&mut self, id: ListenerId) -> bool {
        self.take(id).is_some()
    }

    /// Remove a listener and hand it back so the caller decides where it drops.
    pub(crate) fn take(&mut self, id: ListenerId) -> Option<Box<dyn Any>> {
        remove_by_id(&mut self.processors, id).or_else(|| remove_by_id(&mut self.reactors, id))
    }

    /// Both registries' entries in one `(priority, id)` order.
    pub(crate) fn merged(&self, other: &Self) -> Self {
        Self {
            processors: merge_sorted(&self.processors, &other.processors),
            reactors: merge_sorted(&self.reactors, &other.reactors),
        }
    }

    /// Number of listeners, excluding bus-internal ones.
    pub(crate) fn len(&self) -> usize {
        self.processors
            .iter()
            .map(|entry| entry.id)
            .chain(self.reactors.iter().map(|entry| entry.id))
            .filter(|&id| id != ListenerId::TEARDOWN)
            .count()
    }

    /// Run every processor whose gate opens, in order.
    pub(crate) fn dispatch_processors<E, G>(
        &self,
        event: &mut E,
        gate: G,
    ) -> Result<(), ListenerFailure>
    where
        E: Extends<K>,
        G: Fn(&E, ListenerId) -> bool,
    {
        for entry in &self.processors {
            if !entry.runnable() || !gate(&*event, entry.id) {
                continue;
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(kind = K::name(), listener = %entry.id, label = ?entry.label, "processor");
            (entry.callback)(<E as Extends<K>>::view_mut(event)).map_err(|e| entry.failure(e))?;
        }
        Ok(())
    }

    /// Run every reactor whose gate opens, in order.
    pub(crate) fn dispatch_reactors<E, G>(
        &self,
        event: &E,
        gate: G,
    ) -> Result<(), ListenerFailure>
    where
        E: Extends<K>,
        G: Fn(&E, ListenerId) -> bool,
    {
        for entry in &self.reactors {
            if !entry.runnable() || !gate(&*event, entry.id) {
                continue;
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(kind = K::name(), listener = %entry.id, label = ?entry.label, "reactor");
            (entry.callback)(<E as Extends<K>>::view(event)).map_err(|e| entry.failure(e))?;
        }
        Ok(())
    }
}

/// Type-erased registry, stored per kind in a partition.
pub(crate) trait AnyRegistry {
    fn take(&mut self, id: ListenerId) -> Option<Box<dyn Any>>;
    fn deactivate_all(&self);
    fn is_empty(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: Kind> AnyRegistry for Registry<K> {
    fn take(&mut self, id: ListenerId) -> Option<Box<dyn Any>> {
        Registry::take(self, id)
    }

    fn deactivate_all(&self) {
        for entry in &self.processors {
            entry.active.set(false);
        }
        for entry in &self.reactors {
            entry.active.set(false);
        }
    }

    fn is_empty(&self) -> bool {
        self.processors.is_empty() && self.reactors.is_empty()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
