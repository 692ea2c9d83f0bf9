//! Chaos injection for outbound calls.
//!
//! Three strategies sit directly above the transport, outermost first:
//! - latency: delays the attempt by a fixed duration
//! - fault: raises `ApplicationError::InvalidOperation` instead of the attempt
//! - outcome: substitutes a failure-shaped response for the real one
//!
//! Every strategy asks the [`ChaosDecisionPort`](application::ChaosDecisionPort)
//! before each attempt and fires with the effective rate, which is the
//! configured rate when chaos is enabled and zero otherwise.
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::chaos::{ChaosLayer, ChaosPipelineConfig, ChaosStrategyOptions};
//!
//! let options = ChaosStrategyOptions::new(Arc::new(manager));
//! let service = ServiceBuilder::new()
//!     .layer(ChaosLayer::new(&ChaosPipelineConfig::default(), &options))
//!     .service(transport);
//! ```

mod chaos_manager;
mod fault;
mod latency;
mod outcome;
mod pipeline;
mod random;
mod stats;
mod strategy;

pub use chaos_manager::{ChaosManagerConfig, EnvironmentChaosManager};
pub use fault::{ChaosFault, ChaosFaultLayer, DEFAULT_FAULT_MESSAGE};
pub use latency::{ChaosLatency, ChaosLatencyLayer};
pub use outcome::{ChaosOutcome, ChaosOutcomeLayer};
pub use pipeline::{ChaosLayer, ChaosPipelineConfig};
pub use random::{FixedRandom, RandomSource, ScriptedRandom, ThreadRandom};
pub use stats::{ChaosMonitor, ChaosStats, ChaosStrategyKind, InjectionResult};
pub use strategy::ChaosStrategyOptions;
