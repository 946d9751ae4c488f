//! Harness - recording listeners, stepping gates and log setup

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::sync::Once;

use futures::channel::oneshot;
use tracing_subscriber::EnvFilter;

// ============================================================================
// RECORDER
// ============================================================================

/// Records every payload a listener is called with
pub struct Recorder<T> {
    calls: Rc<RefCell<Vec<Option<T>>>>,
}

impl<T: Clone + 'static> Recorder<T> {
    pub fn new() -> Self {
        Recorder {
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A listener appending to this recorder
    pub fn listener(&self) -> impl Fn(Option<&T>) + 'static {
        let calls = Rc::clone(&self.calls);
        move |value: Option<&T>| calls.borrow_mut().push(value.cloned())
    }

    /// Every call so far, `None` for payload-less events
    pub fn calls(&self) -> Vec<Option<T>> {
        self.calls.borrow().clone()
    }

    /// Payloads of the calls that carried one
    pub fn values(&self) -> Vec<T> {
        self.calls.borrow().iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl<T: Clone + 'static> Default for Recorder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Recorder {
            calls: Rc::clone(&self.calls),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Recorder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Recorder").field(&self.calls.borrow()).finish()
    }
}

// ============================================================================
// GATE
// ============================================================================

#[derive(Default)]
struct GateState {
    waiting: VecDeque<oneshot::Sender<()>>,
    credits: usize,
}

/// Hand-operated checkpoint for async executors.
///
/// Each `open` lets exactly one `wait` through, in call order. Opening
/// before anyone waits stores the permit.
#[derive(Clone, Default)]
pub struct Gate {
    state: Rc<RefCell<GateState>>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait(&self) -> impl Future<Output = ()> + 'static {
        let pending = {
            let mut state = self.state.borrow_mut();
            if state.credits > 0 {
                state.credits -= 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                state.waiting.push_back(tx);
                Some(rx)
            }
        };

        async move {
            if let Some(rx) = pending {
                // A dropped gate releases its waiters
                let _ = rx.await;
            }
        }
    }

    pub fn open(&self) {
        let mut state = self.state.borrow_mut();
        match state.waiting.pop_front() {
            Some(waiter) => {
                let _ = waiter.send(());
            }
            None => state.credits += 1,
        }
    }

    /// Number of parked waiters
    pub fn waiting(&self) -> usize {
        self.state.borrow().waiting.len()
    }
}

// ============================================================================
// LOGGING
// ============================================================================

/// Install a test-friendly subscriber once per process.
///
/// Honours `RUST_LOG`, defaulting to `warn`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
