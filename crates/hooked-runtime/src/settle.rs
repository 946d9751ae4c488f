//! Settlement - resolver handles and the wrapper every node future runs in

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{self, Either, LocalBoxFuture, Shared};
use futures::FutureExt;

use hooked_core::{HookedError, NodeId, Reason};

use crate::TreeHandle;

/// The settled future of one node
pub type Settled<A> = Shared<LocalBoxFuture<'static, Result<A, Reason>>>;

struct Slot<A> {
    sender: RefCell<Option<oneshot::Sender<Result<A, Reason>>>>,
    on_settle: Box<dyn Fn() -> bool>,
}

impl<A> Slot<A> {
    /// First call wins; later calls are ignored and return `false`
    fn settle(&self, outcome: Result<A, Reason>) -> bool {
        let Some(sender) = self.sender.borrow_mut().take() else {
            return false;
        };
        let won = (self.on_settle)();
        // The receiver only goes away together with the node's future
        let _ = sender.send(outcome);
        won
    }

    fn is_settled(&self) -> bool {
        self.sender.borrow().is_none()
    }
}

/// Fulfils the node handed to an executor
pub struct Resolve<A> {
    slot: Rc<Slot<A>>,
}

impl<A> Resolve<A> {
    /// Fulfil with `value`. Returns `false` if the node was already settled.
    pub fn resolve(&self, value: A) -> bool {
        self.slot.settle(Ok(value))
    }

    pub fn is_settled(&self) -> bool {
        self.slot.is_settled()
    }
}

impl<A> Clone for Resolve<A> {
    fn clone(&self) -> Self {
        Resolve {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<A> fmt::Debug for Resolve<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Rejects the node handed to an executor
#[derive(Clone)]
pub struct Reject {
    settle: Rc<dyn Fn(Reason) -> bool>,
}

impl Reject {
    /// Reject with `reason`. Returns `false` if the node was already settled.
    pub fn reject(&self, reason: impl Into<Reason>) -> bool {
        (self.settle)(reason.into())
    }
}

impl fmt::Debug for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject").finish_non_exhaustive()
    }
}

/// Create a resolver pair and the future they settle.
///
/// `on_settle` runs when the first of them is called and reports whether
/// the node was still pending. Dropping every handle without settling makes
/// the future fail with [`HookedError::Abandoned`].
pub fn settlement<A, F>(
    on_settle: F,
) -> (
    Resolve<A>,
    Reject,
    impl Future<Output = Result<A, Reason>> + 'static,
)
where
    A: 'static,
    F: Fn() -> bool + 'static,
{
    let (tx, rx) = oneshot::channel();
    let slot = Rc::new(Slot {
        sender: RefCell::new(Some(tx)),
        on_settle: Box::new(on_settle),
    });

    let rejecting = Rc::clone(&slot);
    let reject = Reject {
        settle: Rc::new(move |reason| rejecting.settle(Err(reason))),
    };

    let settled = rx.map(|received| match received {
        Ok(outcome) => outcome,
        Err(oneshot::Canceled) => Err(HookedError::Abandoned.into()),
    });

    (Resolve { slot }, reject, settled)
}

/// Run a node's body, racing it against listener failures on that node.
///
/// A failure delivered before the body finishes rejects the node and drops
/// the rest of the body. The node is marked settled once the outcome is
/// known.
pub fn supervise<A, T, B>(
    tree: TreeHandle<T>,
    node: NodeId,
    mut failures: oneshot::Receiver<Reason>,
    body: B,
) -> Settled<A>
where
    A: Clone + 'static,
    T: 'static,
    B: Future<Output = Result<A, Reason>> + 'static,
{
    async move {
        let raced = match future::select(Box::pin(body), &mut failures).await {
            Either::Left((outcome, _)) => Either::Left(outcome),
            Either::Right((failure, body)) => Either::Right((failure, body)),
        };

        let outcome = match raced {
            // A failure raised during the final poll of the body came first
            Either::Left(outcome) => match failures.try_recv() {
                Ok(Some(reason)) => Err(reason),
                _ => outcome,
            },
            Either::Right((Ok(reason), _)) => Err(reason),
            Either::Right((Err(oneshot::Canceled), body)) => body.await,
        };

        tree.mark_settled(node);
        match &outcome {
            Ok(_) => tracing::debug!(node = %node, "node fulfilled"),
            Err(reason) => tracing::debug!(node = %node, %reason, "node rejected"),
        }
        outcome
    }
    .boxed_local()
    .shared()
}
