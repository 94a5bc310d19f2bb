//! Cancellation signal and its binding to the transport's cancel primitive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Clonable abort capability bound to at most one request.
///
/// Two states: active and aborted. Aborting is one-way and idempotent; every
/// clone observes the same state.
#[derive(Clone, Debug, Default)]
pub struct AbortSignal {
    inner: Arc<AbortInner>,
}

#[derive(Debug, Default)]
struct AbortInner {
    aborted: AtomicBool,
    notify: Notify,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Returns `true` only for the call that performed the
    /// active -> aborted transition.
    pub fn abort(&self) -> bool {
        let fired = !self.inner.aborted.swap(true, Ordering::SeqCst);
        if fired {
            self.inner.notify.notify_waiters();
        }
        fired
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::SeqCst)
    }

    /// Resolves once the signal has been aborted; immediately if it already
    /// was. Safe against an abort racing the wait registration.
    pub async fn aborted(&self) {
        if self.is_aborted() {
            return;
        }
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before re-checking the flag so an abort landing
        // between the check and the await still wakes us.
        notified.as_mut().enable();
        if self.is_aborted() {
            return;
        }
        notified.await;
    }
}

/// Per-request state machine bridging an external [`AbortSignal`] to the
/// transport-side cancel primitive.
///
/// States: armed -> fired (terminal) or armed -> resolved (terminal). Only the
/// armed -> fired transition invokes the transport cancel, so the transport
/// sees at most one cancellation per request no matter how often the external
/// signal fires.
#[derive(Debug)]
pub(crate) struct CancelBinding {
    transport_cancel: AbortSignal,
    state: BindingState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BindingState {
    Armed,
    Fired,
    Resolved,
}

impl CancelBinding {
    pub(crate) fn new(transport_cancel: AbortSignal) -> Self {
        Self {
            transport_cancel,
            state: BindingState::Armed,
        }
    }

    /// Propagates cancellation to the transport. Returns `true` only when this
    /// call actually invoked the transport cancel.
    pub(crate) fn fire(&mut self) -> bool {
        if self.state != BindingState::Armed {
            return false;
        }
        self.transport_cancel.abort();
        self.state = BindingState::Fired;
        true
    }

    /// Marks the request as completed; later fires become no-ops.
    pub(crate) fn resolve(&mut self) {
        if self.state == BindingState::Armed {
            self.state = BindingState::Resolved;
        }
    }

    #[cfg(test)]
    pub(crate) fn has_fired(&self) -> bool {
        self.state == BindingState::Fired
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{AbortSignal, CancelBinding};

    #[test]
    fn abort_reports_transition_once() {
        let signal = AbortSignal::new();
        assert!(!signal.is_aborted());
        assert!(signal.abort());
        assert!(!signal.abort());
        assert!(signal.is_aborted());
    }

    #[test]
    fn clones_share_state() {
        let signal = AbortSignal::new();
        let clone = signal.clone();
        signal.abort();
        assert!(clone.is_aborted());
    }

    #[tokio::test]
    async fn aborted_resolves_immediately_when_already_fired() {
        let signal = AbortSignal::new();
        signal.abort();
        signal.aborted().await;
    }

    #[tokio::test]
    async fn aborted_wakes_pending_waiter() {
        let signal = AbortSignal::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.aborted().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.abort();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("waiter must wake")
            .expect("waiter task must not panic");
    }

    #[test]
    fn binding_fires_transport_cancel_at_most_once() {
        let transport = AbortSignal::new();
        let mut binding = CancelBinding::new(transport.clone());

        assert!(binding.fire());
        assert!(transport.is_aborted());
        assert!(binding.has_fired());

        // Repeated external aborts must not reach the transport again.
        assert!(!binding.fire());
    }

    #[test]
    fn binding_resolved_before_fire_suppresses_cancel() {
        let transport = AbortSignal::new();
        let mut binding = CancelBinding::new(transport.clone());

        binding.resolve();
        assert!(!binding.fire());
        assert!(!transport.is_aborted());
        assert!(!binding.has_fired());
    }

    #[test]
    fn binding_resolve_after_fire_keeps_fired_state() {
        let transport = AbortSignal::new();
        let mut binding = CancelBinding::new(transport);

        binding.fire();
        binding.resolve();
        assert!(binding.has_fired());
    }
}
