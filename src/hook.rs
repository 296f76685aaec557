//! Hook registry for circuit breaker events.

use crate::state::State;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

type HookFn = Arc<dyn Fn() + Send + Sync + 'static>;

/// A registry for circuit breaker event hooks.
///
/// Hooks run after the breaker has released its state lock, so a hook may
/// read the breaker it is attached to.
pub struct HookRegistry {
    on_open: RwLock<Option<HookFn>>,
    on_close: RwLock<Option<HookFn>>,
    on_half_open: RwLock<Option<HookFn>>,
    on_success: RwLock<Option<HookFn>>,
    on_failure: RwLock<Option<HookFn>>,
    on_rejected: RwLock<Option<HookFn>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("on_open", &self.on_open.read().is_some())
            .field("on_close", &self.on_close.read().is_some())
            .field("on_half_open", &self.on_half_open.read().is_some())
            .field("on_success", &self.on_success.read().is_some())
            .field("on_failure", &self.on_failure.read().is_some())
            .field("on_rejected", &self.on_rejected.read().is_some())
            .finish()
    }
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            on_open: RwLock::new(None),
            on_close: RwLock::new(None),
            on_half_open: RwLock::new(None),
            on_success: RwLock::new(None),
            on_failure: RwLock::new(None),
            on_rejected: RwLock::new(None),
        }
    }

    /// Sets the hook to call when the circuit opens.
    pub fn set_on_open<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_open.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when the circuit closes.
    pub fn set_on_close<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_close.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when a trial probe is admitted.
    pub fn set_on_half_open<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_half_open.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when a guarded operation succeeds.
    pub fn set_on_success<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_success.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when a guarded operation fails.
    pub fn set_on_failure<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_failure.write() = Some(Arc::new(f));
    }

    /// Sets the hook to call when the breaker rejects a call.
    pub fn set_on_rejected<F>(&self, f: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_rejected.write() = Some(Arc::new(f));
    }

    // Clone the hook out so the registry lock is not held while it runs.
    fn fire(slot: &RwLock<Option<HookFn>>) {
        let hook = slot.read().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    /// Executes the appropriate hook for a state transition.
    pub(crate) fn execute_state_transition_hook(&self, to: State) {
        match to {
            State::Open => Self::fire(&self.on_open),
            State::Closed => Self::fire(&self.on_close),
            State::HalfOpen => Self::fire(&self.on_half_open),
        }
    }

    pub(crate) fn execute_success_hook(&self) {
        Self::fire(&self.on_success);
    }

    pub(crate) fn execute_failure_hook(&self) {
        Self::fire(&self.on_failure);
    }

    pub(crate) fn execute_rejected_hook(&self) {
        Self::fire(&self.on_rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn transition_hooks_route_by_state() {
        let registry = HookRegistry::new();
        let opened = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&opened);
        registry.set_on_open(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = Arc::clone(&closed);
        registry.set_on_close(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.execute_state_transition_hook(State::Open);
        registry.execute_state_transition_hook(State::Open);
        registry.execute_state_transition_hook(State::Closed);
        registry.execute_state_transition_hook(State::HalfOpen);

        assert_eq!(opened.load(Ordering::SeqCst), 2);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_may_replace_itself() {
        let registry = Arc::new(HookRegistry::new());
        let inner = Arc::clone(&registry);
        registry.set_on_failure(move || inner.set_on_failure(|| {}));

        registry.execute_failure_hook();
        registry.execute_failure_hook();
    }
}
