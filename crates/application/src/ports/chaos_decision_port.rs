//! Chaos decision port
//!
//! Decides, per execution, whether chaos may be injected and how likely it is.
//! Implementations must be pure: both reads derive only from immutable
//! configuration and the passed context, so they are safe to call from any
//! number of concurrent calls.

#[cfg(test)]
use mockall::automock;

use domain::InjectionRate;

use crate::ExecutionContext;

/// Outcome of a chaos decision for one strategy evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosDecision {
    /// Whether chaos is enabled for this execution
    pub enabled: bool,
    /// Configured injection rate, independent of `enabled`
    pub injection_rate: InjectionRate,
}

impl ChaosDecision {
    /// Evaluate both reads of the port for one execution
    pub fn evaluate(port: &dyn ChaosDecisionPort, ctx: &ExecutionContext) -> Self {
        Self {
            enabled: port.is_enabled(ctx),
            injection_rate: port.injection_rate(ctx),
        }
    }

    /// Probability actually applied: the rate if enabled, otherwise zero
    #[must_use]
    pub const fn effective_rate(&self) -> InjectionRate {
        if self.enabled {
            self.injection_rate
        } else {
            InjectionRate::NEVER
        }
    }
}

/// Port for chaos injection decisions
#[cfg_attr(test, automock)]
pub trait ChaosDecisionPort: Send + Sync {
    /// Whether chaos injection is enabled for this execution
    fn is_enabled(&self, ctx: &ExecutionContext) -> bool;

    /// Injection rate for this execution
    fn injection_rate(&self, ctx: &ExecutionContext) -> InjectionRate;
}
