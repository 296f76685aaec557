//! Re-exports common types for convenient usage.
//!
//! # Example
//! ```rust,no_run
//! use circuit_guard::prelude::*;
//! use std::time::Duration;
//!
//! let breaker = CircuitBreaker::<std::io::Error>::builder()
//!     .reset_timeout(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//! assert_eq!(breaker.state(), State::Closed);
//! ```

pub use crate::{BreakerError, BreakerResult, CircuitBreaker, ConfigError, HookRegistry, State};
