//! Configuration for circuit breakers.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::breaker::CircuitBreaker;
use crate::clock::{Clock, SystemClock};
use crate::error::ConfigError;
use crate::hook::HookRegistry;

const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated breaker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    failure_threshold: u32,
    reset_timeout: Duration,
}

impl BreakerConfig {
    /// Creates a configuration, rejecting a zero threshold or a zero timeout.
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Result<Self, ConfigError> {
        if failure_threshold == 0 {
            return Err(ConfigError::ZeroFailureThreshold);
        }
        if reset_timeout.is_zero() {
            return Err(ConfigError::ZeroResetTimeout);
        }

        Ok(Self {
            failure_threshold,
            reset_timeout,
        })
    }

    /// Number of consecutive failures that opens the circuit.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Time that must pass after the last failure before a probe is let through.
    pub fn reset_timeout(&self) -> Duration {
        self.reset_timeout
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
        }
    }
}

/// Builder for creating circuit breakers with custom configurations.
pub struct BreakerBuilder<E> {
    failure_threshold: u32,
    reset_timeout: Duration,
    clock: Arc<dyn Clock>,
    hook_registry: Arc<HookRegistry>,
    _error_type: PhantomData<fn() -> E>,
}

impl<E> Default for BreakerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> BreakerBuilder<E> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
            clock: Arc::new(SystemClock),
            hook_registry: Arc::new(HookRegistry::new()),
            _error_type: PhantomData,
        }
    }

    /// Sets the number of consecutive failures that trips the circuit.
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Sets how long the circuit stays open after the last failure.
    pub fn reset_timeout(mut self, duration: Duration) -> Self {
        self.reset_timeout = duration;
        self
    }

    /// Sets the time source.
    pub fn clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets a hook registry for the circuit breaker.
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hook_registry = Arc::new(hooks);
        self
    }

    /// Changes the error type for the builder.
    pub fn with_error_type<NewE>(self) -> BreakerBuilder<NewE> {
        BreakerBuilder {
            failure_threshold: self.failure_threshold,
            reset_timeout: self.reset_timeout,
            clock: self.clock,
            hook_registry: self.hook_registry,
            _error_type: PhantomData,
        }
    }

    /// Builds a circuit breaker, validating the configured values.
    pub fn build(self) -> Result<CircuitBreaker<E>, ConfigError> {
        let config = BreakerConfig::new(self.failure_threshold, self.reset_timeout)?;
        Ok(CircuitBreaker::new(config, self.clock, self.hook_registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_threshold() {
        assert_eq!(
            BreakerConfig::new(0, Duration::from_secs(1)),
            Err(ConfigError::ZeroFailureThreshold)
        );
    }

    #[test]
    fn rejects_zero_timeout() {
        assert_eq!(
            BreakerConfig::new(3, Duration::ZERO),
            Err(ConfigError::ZeroResetTimeout)
        );
    }

    #[test]
    fn builder_defaults_are_valid() {
        let breaker = BreakerBuilder::<std::io::Error>::new().build().unwrap();
        assert_eq!(*breaker.config(), BreakerConfig::default());
        assert_eq!(breaker.config().failure_threshold(), 5);
        assert_eq!(breaker.config().reset_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn builder_validates() {
        let result = BreakerBuilder::<std::io::Error>::new()
            .failure_threshold(0)
            .build();
        assert!(matches!(result, Err(ConfigError::ZeroFailureThreshold)));
    }
}
