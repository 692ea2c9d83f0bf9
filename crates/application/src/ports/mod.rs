//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod chaos_decision_port;
mod todos_port;

#[cfg(test)]
pub use chaos_decision_port::MockChaosDecisionPort;
pub use chaos_decision_port::{ChaosDecision, ChaosDecisionPort};
#[cfg(test)]
pub use todos_port::MockTodosPort;
pub use todos_port::TodosPort;
