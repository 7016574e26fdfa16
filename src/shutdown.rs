//! One-shot shutdown signal shared by the producer and the audio path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Something that must be woken when shutdown is triggered.
///
/// Implemented by the packet queue so a thread parked in a blocking `pop`
/// re-checks the signal under the queue's own lock.
pub(crate) trait ShutdownListener: Send + Sync {
    fn on_shutdown(&self);
}

struct Inner {
    triggered: AtomicBool,
    listeners: Mutex<Vec<Weak<dyn ShutdownListener>>>,
}

/// Process-wide, terminal stop flag.
///
/// Set once (normally by the producer loop on a user quit), never reset.
/// Cloning is cheap and every clone observes the same flag.
///
/// # Example
///
/// ```
/// use stream_player::ShutdownSignal;
///
/// let signal = ShutdownSignal::new();
/// let observer = signal.clone();
///
/// assert!(signal.trigger());
/// assert!(!signal.trigger()); // already set
/// assert!(observer.is_triggered());
/// ```
#[derive(Clone)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

impl ShutdownSignal {
    /// Creates a signal that has not been triggered.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Returns `true` once shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Requests shutdown and wakes every registered waiter.
    ///
    /// Returns `true` only for the call that actually set the flag.
    pub fn trigger(&self) -> bool {
        if self.inner.triggered.swap(true, Ordering::AcqRel) {
            return false;
        }

        tracing::debug!("shutdown signal triggered");

        let listeners = std::mem::take(&mut *self.inner.listeners.lock());
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.on_shutdown();
        }
        true
    }

    pub(crate) fn register(&self, listener: Weak<dyn ShutdownListener>) {
        let mut listeners = self.inner.listeners.lock();
        if self.is_triggered() {
            drop(listeners);
            if let Some(listener) = listener.upgrade() {
                listener.on_shutdown();
            }
            return;
        }
        listeners.retain(|l| l.strong_count() > 0);
        listeners.push(listener);
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingListener(AtomicUsize);

    impl ShutdownListener for CountingListener {
        fn on_shutdown(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_trigger_is_one_shot() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
        assert!(signal.trigger());
        assert!(!signal.trigger());
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_listeners_notified_once() {
        let signal = ShutdownSignal::new();
        let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
        let weak: Weak<dyn ShutdownListener> = Arc::downgrade(&listener) as _;
        signal.register(weak);

        signal.trigger();
        signal.trigger();

        assert_eq!(listener.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_register_after_trigger_notifies_immediately() {
        let signal = ShutdownSignal::new();
        signal.trigger();

        let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
        let weak: Weak<dyn ShutdownListener> = Arc::downgrade(&listener) as _;
        signal.register(weak);

        assert_eq!(listener.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_listener_is_skipped() {
        let signal = ShutdownSignal::new();
        {
            let listener = Arc::new(CountingListener(AtomicUsize::new(0)));
            let weak: Weak<dyn ShutdownListener> = Arc::downgrade(&listener) as _;
            signal.register(weak);
        }
        assert!(signal.trigger());
    }
}
