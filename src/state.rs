//! Circuit breaker state machine implementation.

use std::fmt::{self, Display, Formatter};
use std::time::{Duration, Instant};

/// Represents the possible states of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Circuit is closed and operations are allowed.
    Closed,

    /// Circuit is open and operations are rejected until the reset timeout elapses.
    Open,

    /// A single trial probe is in flight; its outcome decides the next state.
    HalfOpen,
}

impl State {
    /// Returns the lowercase name of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::Open => "open",
            State::HalfOpen => "half-open",
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change of state produced by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) from: State,
    pub(crate) to: State,
}

/// Outcome of asking the machine to let a call through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    /// Pass the call through as a regular closed-state call.
    Pass { epoch: u64 },

    /// Pass the call through as the single trial probe.
    Probe { epoch: u64 },

    /// Reject the call without invoking the operation.
    Reject,
}

/// The mutable part of a breaker. Always accessed under the breaker's lock.
#[derive(Debug)]
pub(crate) struct Machine {
    state: State,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    // Bumped on every transition; successes admitted under an older epoch are dropped.
    epoch: u64,
}

impl Machine {
    pub(crate) fn new() -> Self {
        Self {
            state: State::Closed,
            failure_count: 0,
            last_failure_time: None,
            epoch: 0,
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    pub(crate) fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub(crate) fn last_failure_time(&self) -> Option<Instant> {
        self.last_failure_time
    }

    fn transition(&mut self, to: State) -> Option<Transition> {
        let from = self.state;
        if from == to {
            return None;
        }

        self.state = to;
        self.epoch = self.epoch.wrapping_add(1);
        if to == State::Closed {
            self.failure_count = 0;
        }

        Some(Transition { from, to })
    }

    /// Decides whether a call arriving at `now` may run.
    pub(crate) fn admit(
        &mut self,
        now: Instant,
        reset_timeout: Duration,
    ) -> (Admission, Option<Transition>) {
        match self.state {
            State::Closed => (Admission::Pass { epoch: self.epoch }, None),
            State::Open => {
                // Open always carries the failure that opened it.
                debug_assert!(self.last_failure_time.is_some());
                let cooled_down = match self.last_failure_time {
                    Some(at) => now.saturating_duration_since(at) > reset_timeout,
                    None => false,
                };

                if !cooled_down {
                    return (Admission::Reject, None);
                }

                let transition = self.transition(State::HalfOpen);
                (Admission::Probe { epoch: self.epoch }, transition)
            }
            State::HalfOpen => (Admission::Reject, None),
        }
    }

    /// Records a successful call admitted under `epoch`.
    pub(crate) fn on_success(&mut self, epoch: u64) -> Option<Transition> {
        if epoch != self.epoch {
            return None;
        }

        self.failure_count = 0;
        self.transition(State::Closed)
    }

    /// Records a failed call admitted under `epoch` that completed at `now`.
    ///
    /// Every failure counts and refreshes the cooldown, even one admitted
    /// before the last transition. Only the in-flight probe moves the circuit
    /// out of half-open.
    pub(crate) fn on_failure(
        &mut self,
        epoch: u64,
        now: Instant,
        threshold: u32,
    ) -> Option<Transition> {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure_time = Some(now);

        match self.state {
            State::HalfOpen if epoch == self.epoch => self.transition(State::Open),
            State::Closed if self.failure_count >= threshold => self.transition(State::Open),
            _ => None,
        }
    }

    /// Releases a probe that never reported an outcome.
    pub(crate) fn abandon_probe(&mut self, epoch: u64) -> Option<Transition> {
        if epoch != self.epoch || self.state != State::HalfOpen {
            return None;
        }

        self.transition(State::Open)
    }
}
