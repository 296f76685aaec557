//! Core circuit breaker implementation.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::config::{BreakerBuilder, BreakerConfig};
use crate::error::{BreakerError, BreakerResult};
use crate::hook::HookRegistry;
use crate::state::{Admission, Machine, State, Transition};

/// A consistent view of the breaker taken under a single lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    /// Current state.
    pub state: State,
    /// Consecutive failures since the last reset.
    pub failure_count: u32,
    /// When the most recent failure was recorded.
    pub last_failure_time: Option<Instant>,
}

/// Inner state of the circuit breaker, shared between clones.
struct BreakerInner {
    machine: Mutex<Machine>,
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    hooks: Arc<HookRegistry>,
}

impl BreakerInner {
    fn notify(&self, transition: Option<Transition>) {
        if let Some(transition) = transition {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                from = %transition.from,
                to = %transition.to,
                "circuit breaker state changed"
            );

            self.hooks.execute_state_transition_hook(transition.to);
        }
    }
}

/// Admission granted to a single call. Reports the call's outcome back to the
/// breaker; a probe dropped without reporting reopens the circuit.
struct Permit<'a> {
    inner: &'a BreakerInner,
    epoch: u64,
    probe: bool,
    settled: bool,
}

impl Permit<'_> {
    fn settle(mut self, success: bool) {
        self.settled = true;

        let transition = if success {
            self.inner.machine.lock().on_success(self.epoch)
        } else {
            let now = self.inner.clock.now();
            self.inner.machine.lock().on_failure(
                self.epoch,
                now,
                self.inner.config.failure_threshold(),
            )
        };

        if success {
            self.inner.hooks.execute_success_hook();
        } else {
            self.inner.hooks.execute_failure_hook();
        }
        self.inner.notify(transition);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if self.settled || !self.probe {
            return;
        }

        let transition = self.inner.machine.lock().abandon_probe(self.epoch);
        self.inner.notify(transition);
    }
}

/// A circuit breaker that guards calls to a fallible operation.
///
/// Cloning is cheap; clones share the same state and should be handed to every
/// call site that talks to the same downstream dependency.
pub struct CircuitBreaker<E> {
    inner: Arc<BreakerInner>,
    _error_type: PhantomData<fn() -> E>,
}

impl<E> CircuitBreaker<E> {
    pub(crate) fn new(
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
        hooks: Arc<HookRegistry>,
    ) -> Self {
        let inner = BreakerInner {
            machine: Mutex::new(Machine::new()),
            config,
            clock,
            hooks,
        };

        Self {
            inner: Arc::new(inner),
            _error_type: PhantomData,
        }
    }

    /// Creates a breaker from an already validated configuration, using the
    /// system clock and no hooks.
    pub fn with_config(config: BreakerConfig) -> Self {
        Self::new(
            config,
            Arc::new(crate::clock::SystemClock),
            Arc::new(HookRegistry::new()),
        )
    }

    /// Creates a new builder for customizing a circuit breaker.
    pub fn builder() -> BreakerBuilder<E> {
        BreakerBuilder::new()
    }

    /// Returns the configuration the breaker was built with.
    pub fn config(&self) -> &BreakerConfig {
        &self.inner.config
    }

    /// Gets the current state of the circuit breaker.
    pub fn state(&self) -> State {
        self.inner.machine.lock().state()
    }

    /// Gets the number of consecutive failures since the last reset.
    pub fn failure_count(&self) -> u32 {
        self.inner.machine.lock().failure_count()
    }

    /// Gets the time of the most recent recorded failure.
    pub fn last_failure_time(&self) -> Option<Instant> {
        self.inner.machine.lock().last_failure_time()
    }

    /// Reads state, failure count and last failure time together.
    pub fn snapshot(&self) -> BreakerSnapshot {
        let machine = self.inner.machine.lock();
        BreakerSnapshot {
            state: machine.state(),
            failure_count: machine.failure_count(),
            last_failure_time: machine.last_failure_time(),
        }
    }

    /// Executes a function guarded by the circuit breaker.
    ///
    /// Returns [`BreakerError::Open`] without calling `f` when the circuit is
    /// open, and [`BreakerError::Operation`] carrying `f`'s own error when it
    /// fails. The breaker lock is not held while `f` runs.
    pub fn execute<F, T>(&self, f: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let permit = self.acquire()?;
        let result = f();
        permit.settle(result.is_ok());

        result.map_err(BreakerError::Operation)
    }

    /// Checks if a call is allowed based on the current state.
    fn acquire(&self) -> Result<Permit<'_>, BreakerError<E>> {
        let inner = &*self.inner;
        let now = inner.clock.now();
        let (admission, transition) = inner
            .machine
            .lock()
            .admit(now, inner.config.reset_timeout());

        inner.notify(transition);

        match admission {
            Admission::Pass { epoch } => Ok(Permit {
                inner,
                epoch,
                probe: false,
                settled: false,
            }),
            Admission::Probe { epoch } => Ok(Permit {
                inner,
                epoch,
                probe: true,
                settled: false,
            }),
            Admission::Reject => {
                #[cfg(feature = "tracing")]
                tracing::trace!("circuit breaker rejected call");

                inner.hooks.execute_rejected_hook();
                Err(BreakerError::Open)
            }
        }
    }
}

impl<E> fmt::Debug for CircuitBreaker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.inner.config)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

// Cheap because inner state is Arc'd
impl<E> Clone for CircuitBreaker<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _error_type: PhantomData,
        }
    }
}

#[cfg(feature = "async")]
impl<E> CircuitBreaker<E> {
    /// Executes an async function guarded by the circuit breaker.
    ///
    /// If the returned future is dropped while a trial probe is in flight the
    /// circuit goes back to open and the next caller may probe again.
    pub async fn execute_async<F, Fut, T>(&self, f: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let permit = self.acquire()?;
        let result = f().await;
        permit.settle(result.is_ok());

        result.map_err(BreakerError::Operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::panic::{self, AssertUnwindSafe};
    use std::time::Duration;

    fn breaker(clock: &ManualClock) -> CircuitBreaker<&'static str> {
        CircuitBreaker::builder()
            .failure_threshold(2)
            .reset_timeout(Duration::from_secs(10))
            .clock(clock.clone())
            .build()
            .unwrap()
    }

    fn trip(breaker: &CircuitBreaker<&'static str>) {
        for _ in 0..2 {
            let _ = breaker.execute(|| Err::<(), _>("down"));
        }
        assert_eq!(breaker.state(), State::Open);
    }

    #[test]
    fn clones_share_state() {
        let clock = ManualClock::new();
        let breaker = breaker(&clock);
        let other = breaker.clone();

        trip(&breaker);

        assert_eq!(other.state(), State::Open);
        assert_eq!(other.failure_count(), 2);
    }

    #[test]
    fn hooks_can_read_the_breaker() {
        let clock = ManualClock::new();
        let hooks = HookRegistry::new();
        let target: Arc<Mutex<Option<CircuitBreaker<&'static str>>>> =
            Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(None));

        let watched = Arc::clone(&target);
        let slot = Arc::clone(&seen);
        hooks.set_on_open(move || {
            if let Some(breaker) = watched.lock().as_ref() {
                *slot.lock() = Some(breaker.snapshot());
            }
        });

        let breaker: CircuitBreaker<&'static str> = CircuitBreaker::builder()
            .failure_threshold(1)
            .reset_timeout(Duration::from_secs(1))
            .clock(clock.clone())
            .hooks(hooks)
            .build()
            .unwrap();
        *target.lock() = Some(breaker.clone());

        let _ = breaker.execute(|| Err::<(), _>("down"));

        let snapshot = (*seen.lock()).expect("open hook did not fire");
        assert_eq!(snapshot.state, State::Open);
        assert_eq!(snapshot.failure_count, 1);
    }

    #[test]
    fn panicking_probe_reopens() {
        let clock = ManualClock::new();
        let breaker = breaker(&clock);
        trip(&breaker);
        let last_failure = breaker.last_failure_time();

        clock.advance(Duration::from_secs(11));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = breaker.execute(|| -> Result<(), &'static str> { panic!("probe blew up") });
        }));
        assert!(outcome.is_err());

        assert_eq!(breaker.state(), State::Open);
        assert_eq!(breaker.last_failure_time(), last_failure);

        let result = breaker.execute(|| Ok::<_, &'static str>(7));
        assert_eq!(result.unwrap(), 7);
        assert_eq!(breaker.state(), State::Closed);
    }

    #[test]
    fn probe_in_flight_rejects_others() {
        let clock = ManualClock::new();
        let breaker = breaker(&clock);
        trip(&breaker);
        clock.advance(Duration::from_secs(11));

        let result = breaker.execute(|| {
            assert_eq!(breaker.state(), State::HalfOpen);
            let nested = breaker.execute(|| Ok::<_, &'static str>(()));
            assert!(matches!(nested, Err(BreakerError::Open)));
            Ok::<_, &'static str>(())
        });

        assert!(result.is_ok());
        assert_eq!(breaker.state(), State::Closed);
    }
}
