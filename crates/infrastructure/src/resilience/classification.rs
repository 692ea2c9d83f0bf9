//! Outcome classification shared by the retry and circuit-breaker layers.

use std::{fmt, sync::Arc};

use application::is_transient_status;

use crate::http::Outcome;

/// How a layer should treat one outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    /// A response the predicate does not handle
    Success,
    /// Matches the predicate: retried, counted as a breaker failure
    Handled,
    /// An error the predicate does not handle: passed through untouched
    Unhandled,
}

/// Predicate deciding which outcomes a policy handles
#[derive(Clone)]
pub struct OutcomePredicate {
    name: &'static str,
    predicate: Arc<dyn Fn(&Outcome) -> bool + Send + Sync>,
}

impl fmt::Debug for OutcomePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OutcomePredicate").field(&self.name).finish()
    }
}

impl Default for OutcomePredicate {
    fn default() -> Self {
        Self::transient_or_invalid_operation()
    }
}

impl OutcomePredicate {
    /// Create a named predicate
    pub fn new(
        name: &'static str,
        predicate: impl Fn(&Outcome) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            predicate: Arc::new(predicate),
        }
    }

    /// Transport-transient conditions only: network errors, timeouts, 5xx, 408, 429
    #[must_use]
    pub fn transient() -> Self {
        Self::new("transient", |outcome| match outcome {
            Ok(response) => is_transient_status(response.status().as_u16()),
            Err(e) => e.is_transient(),
        })
    }

    /// Transient conditions plus the invalid-operation error the fault strategy raises
    #[must_use]
    pub fn transient_or_invalid_operation() -> Self {
        Self::new("transient_or_invalid_operation", |outcome| match outcome {
            Ok(response) => is_transient_status(response.status().as_u16()),
            Err(e) => e.is_retryable(),
        })
    }

    /// Name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if the policy handles this outcome
    #[must_use]
    pub fn should_handle(&self, outcome: &Outcome) -> bool {
        (self.predicate)(outcome)
    }

    /// Classify an outcome
    #[must_use]
    pub fn classify(&self, outcome: &Outcome) -> OutcomeClass {
        if self.should_handle(outcome) {
            OutcomeClass::Handled
        } else if outcome.is_ok() {
            OutcomeClass::Success
        } else {
            OutcomeClass::Unhandled
        }
    }
}
