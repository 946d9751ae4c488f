//! Error types for hooked futures

use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

use futures::task::SpawnError;
use thiserror::Error;

use crate::NodeId;

/// Why a node's future was rejected.
///
/// A `Reason` is what a rejected future settles with and what a failing
/// listener hands back. It is cheap to clone, so every continuation observing
/// the same rejection sees the very same error value.
#[derive(Clone)]
pub struct Reason {
    inner: Rc<dyn StdError + 'static>,
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

impl Reason {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + 'static,
    {
        Reason {
            inner: Rc::new(error),
        }
    }

    /// Reason carrying a plain message
    pub fn msg(message: impl fmt::Display) -> Self {
        Reason::new(Message(message.to_string()))
    }

    /// Borrow the original error if it is of type `E`
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.downcast_ref::<E>().is_some()
    }

    pub fn as_error(&self) -> &(dyn StdError + 'static) {
        &*self.inner
    }

    /// Are both reasons the same error value (not merely equal text)?
    pub fn ptr_eq(&self, other: &Reason) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> From<E> for Reason
where
    E: StdError + 'static,
{
    fn from(error: E) -> Self {
        Reason::new(error)
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reason").field(&self.inner).finish()
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

/// Core hooked errors
#[derive(Error, Debug)]
pub enum HookedError {
    #[error("event handler for `{event}` must be a listener, was: {found}")]
    InvalidListener { event: String, found: &'static str },

    #[error("executor dropped every resolver without settling")]
    Abandoned,

    #[error("stored value at `{key}` has an unexpected shape: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to spawn node driver: {0}")]
    Spawn(#[from] SpawnError),
}

/// Result type for hooked operations
pub type HookedResult<T> = Result<T, HookedError>;

/// A listener failure that arrived after its node had already settled.
///
/// Such a failure can no longer reject anything, so it is reported out of
/// band instead.
#[derive(Error, Debug, Clone)]
#[error("listener for `{event}` failed on settled node {node}: {reason}")]
pub struct UnhandledFailure {
    pub node: NodeId,
    pub event: String,
    pub reason: Reason,
}
