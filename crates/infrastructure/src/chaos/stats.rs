//! Chaos statistics, shared by every strategy of a pipeline.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::{Deserialize, Serialize};

/// Result of one strategy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionResult {
    /// Chaos enabled but the draw did not fire
    NoInjection,
    /// The strategy's effect applies to this attempt
    Injected,
    /// Chaos disabled for this execution
    Skipped,
}

impl InjectionResult {
    /// Returns true if the effect applies
    #[must_use]
    pub const fn is_injected(self) -> bool {
        matches!(self, Self::Injected)
    }
}

/// The three chaos strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChaosStrategyKind {
    /// Fixed delay before the attempt
    Latency,
    /// Synthetic error instead of the attempt
    Fault,
    /// Failure-shaped response instead of the real one
    Outcome,
}

impl fmt::Display for ChaosStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latency => write!(f, "latency"),
            Self::Fault => write!(f, "fault"),
            Self::Outcome => write!(f, "outcome"),
        }
    }
}

/// Snapshot of chaos statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStats {
    /// Strategy evaluations (one per strategy per attempt)
    pub evaluations: u64,
    /// Evaluations skipped because chaos was disabled
    pub evaluations_skipped: u64,
    /// Latency injections
    pub latency_injected: u64,
    /// Fault injections
    pub faults_injected: u64,
    /// Outcome substitutions
    pub outcomes_injected: u64,
    /// Total latency added (milliseconds)
    pub total_latency_added_ms: u64,
}

impl ChaosStats {
    /// Total injections across all strategies
    #[must_use]
    pub const fn total_injected(&self) -> u64 {
        self.latency_injected + self.faults_injected + self.outcomes_injected
    }

    /// Observed injection rate over all evaluations
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn actual_injection_rate(&self) -> f64 {
        if self.evaluations == 0 {
            0.0
        } else {
            self.total_injected() as f64 / self.evaluations as f64
        }
    }
}

/// Lock-free counters behind [`ChaosStats`]
#[derive(Debug, Default)]
pub struct ChaosMonitor {
    evaluations: AtomicU64,
    evaluations_skipped: AtomicU64,
    latency_injected: AtomicU64,
    faults_injected: AtomicU64,
    outcomes_injected: AtomicU64,
    total_latency_added_ms: AtomicU64,
}

impl ChaosMonitor {
    /// Create a monitor with zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one strategy evaluation
    pub fn record(&self, kind: ChaosStrategyKind, result: InjectionResult) {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        match result {
            InjectionResult::Skipped => {
                self.evaluations_skipped.fetch_add(1, Ordering::Relaxed);
            },
            InjectionResult::NoInjection => {},
            InjectionResult::Injected => {
                let counter = match kind {
                    ChaosStrategyKind::Latency => &self.latency_injected,
                    ChaosStrategyKind::Fault => &self.faults_injected,
                    ChaosStrategyKind::Outcome => &self.outcomes_injected,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            },
        }
    }

    /// Record latency added by the latency strategy
    pub fn record_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.total_latency_added_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Get a copy of current statistics
    #[must_use]
    pub fn snapshot(&self) -> ChaosStats {
        ChaosStats {
            evaluations: self.evaluations.load(Ordering::Relaxed),
            evaluations_skipped: self.evaluations_skipped.load(Ordering::Relaxed),
            latency_injected: self.latency_injected.load(Ordering::Relaxed),
            faults_injected: self.faults_injected.load(Ordering::Relaxed),
            outcomes_injected: self.outcomes_injected.load(Ordering::Relaxed),
            total_latency_added_ms: self.total_latency_added_ms.load(Ordering::Relaxed),
        }
    }
}
