//! Hooked - a future that carries its own event channel and store

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future;
use futures::task::{LocalSpawn, LocalSpawnExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use hooked_core::{HookedResult, NodeId, Overrides, Reason, UnhandledFailure};
use hooked_propagation::FloodReport;
use hooked_state::ListenerResult;

use crate::{settlement, supervise, HookedConfig, Hooks, Reject, Resolve, Settled, TreeHandle};

/// A future bound to one node of a continuation tree.
///
/// Awaiting it yields the node's outcome. Cloning yields another handle to
/// the same node and the same outcome.
pub struct Hooked<A, T = Value> {
    hooks: Hooks<T>,
    settled: Settled<A>,
}

/// Builds root nodes under a given [`HookedConfig`]
pub struct HookedBuilder<T = Value> {
    config: HookedConfig,
    _payload: PhantomData<fn() -> T>,
}

impl<T: 'static> HookedBuilder<T> {
    pub fn new(config: HookedConfig) -> Self {
        HookedBuilder {
            config,
            _payload: PhantomData,
        }
    }

    fn root(&self) -> (Hooks<T>, oneshot::Receiver<Reason>) {
        let tree = TreeHandle::new(self.config.clone());
        let (node, failures) = tree.insert_root();
        (Hooks::new(tree, node), failures)
    }

    /// Root node settled through resolver handles.
    ///
    /// The executor runs right away, before this returns.
    pub fn executor<A, F>(&self, executor: F) -> Hooked<A, T>
    where
        A: Clone + 'static,
        F: FnOnce(Resolve<A>, Reject, Hooks<T>),
    {
        let (hooks, failures) = self.root();

        let tree = hooks.tree().downgrade();
        let node = hooks.node();
        let (resolve, reject, body) = settlement(move || {
            tree.upgrade()
                .map(|tree| tree.mark_settled(node))
                .unwrap_or(false)
        });

        executor(resolve, reject, hooks.clone());
        Hooked::assemble(hooks, failures, body)
    }

    /// Root node settled by an async task.
    ///
    /// The task starts on the first poll of the node or of a descendant.
    pub fn task<A, F, Fut>(&self, task: F) -> Hooked<A, T>
    where
        A: Clone + 'static,
        F: FnOnce(Hooks<T>) -> Fut,
        Fut: Future<Output = Result<A, Reason>> + 'static,
    {
        let (hooks, failures) = self.root();
        let body = task(hooks.clone());
        Hooked::assemble(hooks, failures, body)
    }

    /// Root node wrapping an existing future
    pub fn future<A, Fut>(&self, fut: Fut) -> Hooked<A, T>
    where
        A: Clone + 'static,
        Fut: Future<Output = Result<A, Reason>> + 'static,
    {
        let (hooks, failures) = self.root();
        Hooked::assemble(hooks, failures, fut)
    }

    /// Root node already settled with `outcome`.
    ///
    /// Later listener failures on it are unhandled, even before the first
    /// poll.
    fn ready<A: Clone + 'static>(&self, outcome: Result<A, Reason>) -> Hooked<A, T> {
        let job = self.future(future::ready(outcome));
        job.hooks.tree().mark_settled(job.id());
        job
    }

    pub fn resolved<A: Clone + 'static>(&self, value: A) -> Hooked<A, T> {
        self.ready(Ok(value))
    }

    pub fn rejected<A: Clone + 'static>(&self, reason: impl Into<Reason>) -> Hooked<A, T> {
        self.ready(Err(reason.into()))
    }

    /// Root node that resolves with `()`
    pub fn empty(&self) -> Hooked<(), T> {
        self.resolved(())
    }
}

impl<T: 'static> Default for HookedBuilder<T> {
    fn default() -> Self {
        HookedBuilder::new(HookedConfig::default())
    }
}

impl<T: 'static> Hooked<(), T> {
    /// Builder for root nodes with a non-default configuration
    pub fn builder(config: HookedConfig) -> HookedBuilder<T> {
        HookedBuilder::new(config)
    }

    pub fn empty() -> Self {
        HookedBuilder::default().empty()
    }
}

impl<T: 'static> Default for Hooked<(), T> {
    fn default() -> Self {
        Hooked::empty()
    }
}

impl<A, T> Hooked<A, T>
where
    A: Clone + 'static,
    T: 'static,
{
    /// Root node settled by `executor(resolve, reject, hooks)`
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolve<A>, Reject, Hooks<T>),
    {
        HookedBuilder::default().executor(executor)
    }

    /// Root node settled by the task `task(hooks)`
    pub fn from_task<F, Fut>(task: F) -> Self
    where
        F: FnOnce(Hooks<T>) -> Fut,
        Fut: Future<Output = Result<A, Reason>> + 'static,
    {
        HookedBuilder::default().task(task)
    }

    pub fn from_future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<A, Reason>> + 'static,
    {
        HookedBuilder::default().future(fut)
    }

    pub fn resolved(value: A) -> Self {
        HookedBuilder::default().resolved(value)
    }

    pub fn rejected(reason: impl Into<Reason>) -> Self {
        HookedBuilder::default().rejected(reason)
    }

    fn assemble<B>(hooks: Hooks<T>, failures: oneshot::Receiver<Reason>, body: B) -> Self
    where
        B: Future<Output = Result<A, Reason>> + 'static,
    {
        let settled = supervise(hooks.tree().clone(), hooks.node(), failures, body);
        Hooked { hooks, settled }
    }

    // ---- Continuations ----

    /// Child node whose body sees this node's outcome
    fn derive<B, F, Fut>(&self, body: F) -> Hooked<B, T>
    where
        B: Clone + 'static,
        F: FnOnce(Result<A, Reason>, Hooks<T>) -> Fut + 'static,
        Fut: Future<Output = Result<B, Reason>> + 'static,
    {
        let tree = self.hooks.tree().clone();
        let (node, failures) = tree.insert_child(self.hooks.node());
        let hooks = Hooks::new(tree, node);

        let parent = self.settled.clone();
        let scoped = hooks.clone();
        let child = async move {
            let outcome = parent.await;
            body(outcome, scoped).await
        };

        Hooked::assemble(hooks, failures, child)
    }

    /// Continue with the fulfilled value. Rejections pass through.
    ///
    /// With `futures::FutureExt` in scope, method syntax resolves to the
    /// by-value `FutureExt::then` instead. Call `Hooked::then(&job, ..)` there.
    pub fn then<B, F, Fut>(&self, on_fulfilled: F) -> Hooked<B, T>
    where
        B: Clone + 'static,
        F: FnOnce(A, Hooks<T>) -> Fut + 'static,
        Fut: Future<Output = Result<B, Reason>> + 'static,
    {
        self.derive(move |outcome, hooks| async move {
            match outcome {
                Ok(value) => on_fulfilled(value, hooks).await,
                Err(reason) => Err(reason),
            }
        })
    }

    pub fn then_or_else<B, F, G, FutF, FutG>(&self, on_fulfilled: F, on_rejected: G) -> Hooked<B, T>
    where
        B: Clone + 'static,
        F: FnOnce(A, Hooks<T>) -> FutF + 'static,
        G: FnOnce(Reason, Hooks<T>) -> FutG + 'static,
        FutF: Future<Output = Result<B, Reason>> + 'static,
        FutG: Future<Output = Result<B, Reason>> + 'static,
    {
        self.derive(move |outcome, hooks| async move {
            match outcome {
                Ok(value) => on_fulfilled(value, hooks).await,
                Err(reason) => on_rejected(reason, hooks).await,
            }
        })
    }

    /// Recover from a rejection. Fulfilled values pass through.
    pub fn catch<F, Fut>(&self, on_rejected: F) -> Hooked<A, T>
    where
        F: FnOnce(Reason, Hooks<T>) -> Fut + 'static,
        Fut: Future<Output = Result<A, Reason>> + 'static,
    {
        self.derive(move |outcome, hooks| async move {
            match outcome {
                Ok(value) => Ok(value),
                Err(reason) => on_rejected(reason, hooks).await,
            }
        })
    }

    /// Run `on_settled` whatever the outcome, then keep that outcome.
    ///
    /// A failing handler replaces the outcome with its own reason.
    pub fn finally<F, Fut>(&self, on_settled: F) -> Hooked<A, T>
    where
        F: FnOnce(Hooks<T>) -> Fut + 'static,
        Fut: Future<Output = Result<(), Reason>> + 'static,
    {
        self.derive(move |outcome, hooks| async move {
            on_settled(hooks).await?;
            outcome
        })
    }

    /// Child node mirroring this node's outcome
    pub fn chain(&self) -> Hooked<A, T> {
        self.derive(|outcome, _| future::ready(outcome))
    }

    // ---- Event channel ----

    pub fn on<F, R>(&self, event: &str, listener: F) -> &Self
    where
        F: Fn(Option<&T>) -> R + 'static,
        R: ListenerResult,
    {
        self.hooks.on(event, listener);
        self
    }

    pub fn try_on<C: Any>(&self, event: &str, candidate: C) -> HookedResult<&Self> {
        self.hooks.try_on(event, candidate)?;
        Ok(self)
    }

    pub fn event(&self, event: &str, value: impl Into<Option<T>>) -> FloodReport {
        self.hooks.event(event, value)
    }

    pub fn event_with(
        &self,
        event: &str,
        value: impl Into<Option<T>>,
        overrides: Overrides,
    ) -> FloodReport {
        self.hooks.event_with(event, value, overrides)
    }

    pub fn emit(&self, event: &str, value: impl Into<Option<T>>) -> FloodReport {
        self.hooks.emit(event, value)
    }

    pub fn emit_with(
        &self,
        event: &str,
        value: impl Into<Option<T>>,
        overrides: Overrides,
    ) -> FloodReport {
        self.hooks.emit_with(event, value, overrides)
    }

    pub fn broadcast(&self, event: &str, value: impl Into<Option<T>>) -> FloodReport {
        self.hooks.broadcast(event, value)
    }

    pub fn broadcast_with(
        &self,
        event: &str,
        value: impl Into<Option<T>>,
        overrides: Overrides,
    ) -> FloodReport {
        self.hooks.broadcast_with(event, value, overrides)
    }

    // ---- Store ----

    pub fn set(&self, key: &str, value: impl Into<Value>) -> FloodReport {
        self.hooks.set(key, value)
    }

    pub fn set_with(&self, key: &str, value: impl Into<Value>, overrides: Overrides) -> FloodReport {
        self.hooks.set_with(key, value, overrides)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.hooks.get(key)
    }

    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Value {
        self.hooks.get_or(key, default)
    }

    pub fn get_as<D: DeserializeOwned>(&self, key: &str) -> HookedResult<Option<D>> {
        self.hooks.get_as(key)
    }

    // ---- Tree ----

    pub fn id(&self) -> NodeId {
        self.hooks.node()
    }

    pub fn hooks(&self) -> &Hooks<T> {
        &self.hooks
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.hooks.tree().parent_of(self.id())
    }

    pub fn children(&self) -> Vec<NodeId> {
        self.hooks.tree().children_of(self.id())
    }

    pub fn is_settled(&self) -> bool {
        self.hooks.tree().is_settled(self.id())
    }

    pub fn config(&self) -> HookedConfig {
        self.hooks.tree().config()
    }

    /// Spawn this node so it progresses without being awaited
    pub fn drive<S>(&self, spawner: &S) -> HookedResult<()>
    where
        S: LocalSpawn + ?Sized,
    {
        spawner.spawn_local(futures::FutureExt::map(self.settled.clone(), drop))?;
        tracing::trace!(node = %self.id(), "node driven");
        Ok(())
    }

    /// Take the listener failures that arrived after their node settled
    pub fn drain_unhandled(&self) -> Vec<UnhandledFailure> {
        self.hooks.tree().drain_unhandled()
    }
}

impl<A: Clone, T> Future for Hooked<A, T> {
    type Output = Result<A, Reason>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.settled).poll(cx)
    }
}

impl<A, T> Clone for Hooked<A, T> {
    fn clone(&self) -> Self {
        Hooked {
            hooks: self.hooks.clone(),
            settled: self.settled.clone(),
        }
    }
}

impl<A, T> fmt::Debug for Hooked<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooked")
            .field("node", &self.hooks.node())
            .finish_non_exhaustive()
    }
}
