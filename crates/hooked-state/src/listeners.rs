//! Listener registry - event subscriptions of a single node

use std::any::{self, Any};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use hooked_core::{HookedError, HookedResult, Reason};

/// What a listener may return: nothing, or a `Result` whose error becomes
/// the rejection of the delivering node.
pub trait ListenerResult {
    fn into_result(self) -> Result<(), Reason>;
}

impl ListenerResult for () {
    fn into_result(self) -> Result<(), Reason> {
        Ok(())
    }
}

impl<E> ListenerResult for Result<(), E>
where
    E: Into<Reason>,
{
    fn into_result(self) -> Result<(), Reason> {
        self.map_err(Into::into)
    }
}

/// A registered event callback
pub struct Listener<T> {
    callback: Rc<dyn Fn(Option<&T>) -> Result<(), Reason>>,
}

impl<T> Listener<T> {
    pub fn call(&self, value: Option<&T>) -> Result<(), Reason> {
        (self.callback)(value)
    }
}

impl<T: 'static> Listener<T> {
    pub fn new<F, R>(callback: F) -> Self
    where
        F: Fn(Option<&T>) -> R + 'static,
        R: ListenerResult,
    {
        Listener {
            callback: Rc::new(move |value: Option<&T>| callback(value).into_result()),
        }
    }

    /// Accept a dynamically typed candidate, failing unless it is a listener.
    ///
    /// Boxed candidates (`Box<dyn Any>`) are looked through once.
    pub fn coerce<C: Any>(event: &str, candidate: C) -> HookedResult<Self> {
        let any: &dyn Any = &candidate;
        let listener = any.downcast_ref::<Listener<T>>().or_else(|| {
            any.downcast_ref::<Box<dyn Any>>()
                .and_then(|boxed| boxed.downcast_ref::<Listener<T>>())
        });

        listener.cloned().ok_or_else(|| HookedError::InvalidListener {
            event: event.to_string(),
            found: any::type_name::<C>(),
        })
    }
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Listener {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").finish_non_exhaustive()
    }
}

/// Invoke listeners in order, stopping at the first failure
pub fn dispatch<T>(listeners: &[Listener<T>], value: Option<&T>) -> Result<(), Reason> {
    listeners.iter().try_for_each(|listener| listener.call(value))
}

/// Listeners of one node, keyed by event name
pub struct Listeners<T> {
    by_event: HashMap<String, Vec<Listener<T>>>,
}

impl<T> Listeners<T> {
    pub fn new() -> Self {
        Listeners {
            by_event: HashMap::new(),
        }
    }

    /// Append a listener; registration order is delivery order
    pub fn add(&mut self, event: &str, listener: Listener<T>) {
        self.by_event
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }

    /// Listeners for an event, detached from the registry.
    ///
    /// Delivery runs on the snapshot so listeners may register more
    /// listeners while being called.
    pub fn snapshot(&self, event: &str) -> Vec<Listener<T>> {
        self.by_event.get(event).cloned().unwrap_or_default()
    }

    /// Number of listeners for an event
    pub fn count(&self, event: &str) -> usize {
        self.by_event.get(event).map(Vec::len).unwrap_or(0)
    }

    /// Number of listeners over all events
    pub fn len(&self) -> usize {
        self.by_event.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.by_event.keys().map(String::as_str)
    }
}

impl<T> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .by_event
            .iter()
            .map(|(event, list)| (event.as_str(), list.len()))
            .collect();
        f.debug_struct("Listeners").field("by_event", &counts).finish()
    }
}
