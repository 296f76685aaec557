use circuit_guard::{BreakerError, CircuitBreaker, HookRegistry, ManualClock};
use std::error::Error;
use std::fmt;
use std::time::Duration;

// Custom error type that implements Error trait
#[derive(Debug)]
struct ServiceError(String);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error: {}", self.0)
    }
}

impl Error for ServiceError {}

fn main() {
    // A manual clock lets the demo skip the cooldown instead of sleeping through it
    let clock = ManualClock::new();

    let hooks = HookRegistry::new();
    hooks.set_on_open(|| println!("  -> circuit opened"));
    hooks.set_on_half_open(|| println!("  -> trial call admitted"));
    hooks.set_on_close(|| println!("  -> circuit closed"));
    hooks.set_on_rejected(|| println!("  -> call rejected"));

    let breaker = CircuitBreaker::<ServiceError>::builder()
        .failure_threshold(2) // Open after 2 consecutive failures
        .reset_timeout(Duration::from_secs(10)) // Allow a trial call 10s after the last failure
        .clock(clock.clone())
        .hooks(hooks)
        .build()
        .expect("valid configuration");

    println!("Circuit initial state: {}", breaker.state());

    // (seconds to wait before the call, whether the service is healthy)
    let plan = [(0, false), (0, false), (1, true), (10, true), (0, false)];

    for (call, (wait, healthy)) in plan.into_iter().enumerate() {
        clock.advance(Duration::from_secs(wait));

        let result = breaker.execute(|| {
            if healthy {
                Ok("Success".to_string())
            } else {
                Err(ServiceError("External service error".to_string()))
            }
        });

        match result {
            Ok(value) => println!("Call {}: succeeded with {}", call + 1, value),
            Err(BreakerError::Open) => println!("Call {}: circuit is open", call + 1),
            Err(BreakerError::Operation(err)) => println!("Call {}: failed: {}", call + 1, err),
        }

        let snapshot = breaker.snapshot();
        println!(
            "  state = {}, consecutive failures = {}",
            snapshot.state, snapshot.failure_count
        );
    }
}
