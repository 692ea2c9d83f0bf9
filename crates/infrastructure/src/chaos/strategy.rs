//! Shared evaluation step of the chaos strategies.

use std::{fmt, sync::Arc};

use application::{ChaosDecision, ChaosDecisionPort, ExecutionContext};
use tracing::debug;

use super::{
    random::{RandomSource, ThreadRandom},
    stats::{ChaosMonitor, ChaosStrategyKind, InjectionResult},
};

/// What every chaos strategy needs to decide an injection
///
/// The decision port is consulted afresh on every evaluation; nothing is
/// cached between attempts.
#[derive(Clone)]
pub struct ChaosStrategyOptions {
    decision: Arc<dyn ChaosDecisionPort>,
    random: Arc<dyn RandomSource>,
    monitor: Arc<ChaosMonitor>,
}

impl fmt::Debug for ChaosStrategyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaosStrategyOptions")
            .field("random", &self.random)
            .field("stats", &self.monitor.snapshot())
            .finish_non_exhaustive()
    }
}

impl ChaosStrategyOptions {
    /// Options using the thread RNG and a fresh monitor
    #[must_use]
    pub fn new(decision: Arc<dyn ChaosDecisionPort>) -> Self {
        Self {
            decision,
            random: Arc::new(ThreadRandom),
            monitor: Arc::new(ChaosMonitor::new()),
        }
    }

    /// Replace the random source
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Record into an existing monitor
    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<ChaosMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Monitor the strategies record into
    #[must_use]
    pub const fn monitor(&self) -> &Arc<ChaosMonitor> {
        &self.monitor
    }

    /// Decide whether `kind` injects for this attempt
    ///
    /// No sample is drawn while chaos is disabled.
    pub fn evaluate(&self, kind: ChaosStrategyKind, ctx: &ExecutionContext) -> InjectionResult {
        let decision = ChaosDecision::evaluate(self.decision.as_ref(), ctx);

        let result = if !decision.enabled {
            InjectionResult::Skipped
        } else if decision.effective_rate().fires(self.random.next_f64()) {
            debug!(
                strategy = %kind,
                operation = ctx.operation(),
                attempt = ctx.attempt(),
                rate = %decision.injection_rate,
                "Chaos injection triggered"
            );
            InjectionResult::Injected
        } else {
            InjectionResult::NoInjection
        };

        self.monitor.record(kind, result);
        result
    }
}
