//! Per-provider circuit breaker.
//!
//! The circuit has three states:
//!
//! - **Closed**: Normal operation, calls pass through.
//! - **Open**: The upstream is failing, calls are refused until the cool-down
//!   measured from the trip time has elapsed.
//! - **HalfOpen**: The cool-down has elapsed and exactly one probe call is
//!   allowed through. Its outcome closes or re-opens the circuit.
//!
//! All transitions happen under a single mutex so concurrent calls observe
//! one consistent sequence of trips and resets.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use currency_types::ProviderError;
use tracing::{debug, info, warn};

/// Default number of consecutive failed calls before the circuit opens.
const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default time the circuit stays open before a probe is allowed.
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(30);

/// Circuit breaker state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Circuit breaker configuration.
#[derive(Clone, Debug)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed calls that trip the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open after a trip.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    consecutive_failures: u32,
    tripped_at: Option<Instant>,
}

impl Circuit {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            tripped_at: None,
        }
    }

    fn cooled_down(&self, cooldown: Duration) -> bool {
        self.tripped_at
            .is_none_or(|tripped_at| tripped_at.elapsed() >= cooldown)
    }
}

/// Circuit breaker owned by a single provider instance.
pub struct CircuitBreaker {
    provider: String,
    circuit: Mutex<Circuit>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(provider: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            provider: provider.into(),
            circuit: Mutex::new(Circuit::new()),
            config,
        }
    }

    /// Lock the circuit, recovering from poison.
    ///
    /// A poisoned lock only means a panic happened mid-update; the state is
    /// still one of the three valid variants.
    fn lock(&self) -> MutexGuard<'_, Circuit> {
        self.circuit.lock().unwrap_or_else(|poisoned| {
            warn!(provider = %self.provider, "Circuit breaker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Asks to start a call.
    ///
    /// Returns `Unavailable` while the circuit is open, or while a half-open
    /// probe is already in flight. When the cool-down has elapsed the caller
    /// becomes the probe.
    pub fn try_acquire(&self) -> Result<CallPermit<'_>, ProviderError> {
        let mut circuit = self.lock();

        match circuit.state {
            CircuitState::Closed => Ok(CallPermit::new(self, false)),
            CircuitState::Open if circuit.cooled_down(self.config.cooldown) => {
                info!(provider = %self.provider, "Circuit breaker half-open, allowing probe call");
                circuit.state = CircuitState::HalfOpen;
                Ok(CallPermit::new(self, true))
            }
            CircuitState::Open | CircuitState::HalfOpen => {
                debug!(provider = %self.provider, state = %circuit.state, "Circuit breaker refused call");
                Err(ProviderError::Unavailable {
                    provider: self.provider.clone(),
                })
            }
        }
    }

    /// Current state. An open circuit whose cool-down has elapsed reports
    /// `HalfOpen`, since the next call will be let through.
    pub fn state(&self) -> CircuitState {
        let circuit = self.lock();
        match circuit.state {
            CircuitState::Open if circuit.cooled_down(self.config.cooldown) => {
                CircuitState::HalfOpen
            }
            state => state,
        }
    }

    /// Consecutive failed calls counted while closed.
    pub fn failure_count(&self) -> u32 {
        self.lock().consecutive_failures
    }

    fn on_success(&self, probe: bool) {
        let mut circuit = self.lock();

        match (circuit.state, probe) {
            (CircuitState::Closed, false) => {
                circuit.consecutive_failures = 0;
            }
            (CircuitState::HalfOpen, true) => {
                info!(provider = %self.provider, "Circuit breaker reset.");
                *circuit = Circuit::new();
            }
            // A call admitted before the trip finished late; it says nothing
            // about the upstream's current health.
            _ => {}
        }
    }

    fn on_failure(&self, probe: bool) {
        let mut circuit = self.lock();

        match (circuit.state, probe) {
            (CircuitState::Closed, false) => {
                circuit.consecutive_failures += 1;
                if circuit.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        provider = %self.provider,
                        failures = circuit.consecutive_failures,
                        cooldown_ms = self.config.cooldown.as_millis() as u64,
                        "Circuit breaker triggered! Breaking for cool-down window"
                    );
                    circuit.state = CircuitState::Open;
                    circuit.tripped_at = Some(Instant::now());
                } else {
                    debug!(
                        provider = %self.provider,
                        failures = circuit.consecutive_failures,
                        threshold = self.config.failure_threshold,
                        "Circuit breaker recorded failure"
                    );
                }
            }
            (CircuitState::HalfOpen, true) => {
                warn!(provider = %self.provider, "Circuit breaker probe failed, reopening");
                circuit.state = CircuitState::Open;
                circuit.tripped_at = Some(Instant::now());
            }
            _ => {}
        }
    }

    fn on_abandoned_probe(&self) {
        let mut circuit = self.lock();
        if circuit.state == CircuitState::HalfOpen {
            // Keep the original trip time so the next call probes right away.
            debug!(provider = %self.provider, "Circuit breaker probe abandoned");
            circuit.state = CircuitState::Open;
        }
    }
}

/// Admission for one call through the breaker.
///
/// Settle it with [`CallPermit::success`] or [`CallPermit::failure`]. A probe
/// permit dropped unsettled (the call was cancelled) hands the probe slot
/// back instead of leaving the circuit half-open forever.
#[must_use = "a permit must be settled with success() or failure()"]
pub struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    settled: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            settled: false,
        }
    }

    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn success(mut self) {
        self.settled = true;
        self.breaker.on_success(self.probe);
    }

    pub fn failure(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.probe);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.probe {
            self.breaker.on_abandoned_probe();
        }
    }
}
