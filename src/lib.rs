//! # circuit-guard
//!
//! A small, lock-guarded circuit breaker that opens after a run of consecutive
//! failures and lets exactly one trial call through once the reset timeout
//! has passed.
//!
//! ## How it behaves
//!
//! - **Closed**: calls pass through. Every failure bumps a consecutive failure
//!   counter, every success resets it. Reaching the failure threshold opens
//!   the circuit; the call that did so still gets its own error back.
//! - **Open**: calls are rejected with [`BreakerError::Open`] without running the
//!   operation, until more than the reset timeout has passed since the last
//!   recorded failure.
//! - **Half-Open**: the first call after the timeout becomes the trial probe.
//!   While it runs, everyone else is still rejected. If it succeeds the
//!   circuit closes, if it fails the circuit reopens and the timeout restarts.
//!
//! ## Basic Usage
//!
//! ```rust
//! use circuit_guard::{BreakerError, CircuitBreaker};
//! use std::error::Error;
//! use std::fmt;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct ServiceError(String);
//!
//! impl fmt::Display for ServiceError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "Service error: {}", self.0)
//!     }
//! }
//!
//! impl Error for ServiceError {}
//!
//! let breaker = CircuitBreaker::<ServiceError>::builder()
//!     .failure_threshold(3) // Open after 3 consecutive failures
//!     .reset_timeout(Duration::from_secs(30)) // Probe again after 30 seconds
//!     .build()
//!     .expect("valid configuration");
//!
//! match breaker.execute(|| Ok::<_, ServiceError>("Success".to_string())) {
//!     Ok(result) => println!("Call succeeded: {}", result),
//!     Err(BreakerError::Open) => println!("Circuit is open, call was prevented"),
//!     Err(BreakerError::Operation(err)) => println!("Call failed: {}", err),
//! }
//! ```
//!
//! ## Async Support
//!
//! With the `async` feature enabled the same contract is available for futures:
//!
//! ```rust,ignore
//! let result = breaker
//!     .execute_async(|| async { Ok::<_, ServiceError>("Success".to_string()) })
//!     .await;
//! ```
//!
//! ## Features
//!
//! - `std` - Standard library support (default)
//! - `async` - `execute_async` for future-returning operations
//! - `tracing` - Emit `tracing` events on state changes and rejections

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod breaker;
mod clock;
mod config;
mod error;
mod hook;
pub mod prelude;
mod state;

// Re-exports
pub use breaker::{BreakerSnapshot, CircuitBreaker};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BreakerBuilder, BreakerConfig};
pub use error::{BreakerError, BreakerResult, ConfigError};
pub use hook::HookRegistry;
pub use state::State;
