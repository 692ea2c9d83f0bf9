//! The three chaos strategies composed in their fixed order.

use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use tower::Layer;

use super::{
    fault::{ChaosFault, ChaosFaultLayer, DEFAULT_FAULT_MESSAGE},
    latency::{ChaosLatency, ChaosLatencyLayer},
    outcome::{ChaosOutcome, ChaosOutcomeLayer},
    stats::ChaosMonitor,
    strategy::ChaosStrategyOptions,
};

/// Toggles and effects of the chaos strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaosPipelineConfig {
    /// Enable the latency strategy
    pub latency_enabled: bool,
    /// Delay injected by the latency strategy
    pub latency: Duration,
    /// Enable the fault strategy
    pub fault_enabled: bool,
    /// Message of the synthetic fault
    pub fault_message: String,
    /// Enable the outcome strategy
    pub outcome_enabled: bool,
    /// Status of the substituted response
    pub outcome_status: StatusCode,
}

impl Default for ChaosPipelineConfig {
    fn default() -> Self {
        Self {
            latency_enabled: true,
            latency: Duration::from_secs(5),
            fault_enabled: true,
            fault_message: DEFAULT_FAULT_MESSAGE.to_string(),
            outcome_enabled: true,
            outcome_status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Latency, then fault, then outcome around the transport
#[derive(Debug, Clone)]
pub struct ChaosLayer {
    latency: ChaosLatencyLayer,
    fault: ChaosFaultLayer,
    outcome: ChaosOutcomeLayer,
    monitor: Arc<ChaosMonitor>,
}

impl ChaosLayer {
    /// Build the strategies from configuration and shared options
    #[must_use]
    pub fn new(config: &ChaosPipelineConfig, options: &ChaosStrategyOptions) -> Self {
        Self {
            latency: ChaosLatencyLayer::new(options.clone(), config.latency, config.latency_enabled),
            fault: ChaosFaultLayer::new(
                options.clone(),
                config.fault_message.clone(),
                config.fault_enabled,
            ),
            outcome: ChaosOutcomeLayer::new(
                options.clone(),
                config.outcome_status,
                config.outcome_enabled,
            ),
            monitor: Arc::clone(options.monitor()),
        }
    }

    /// Monitor shared by the three strategies
    #[must_use]
    pub const fn monitor(&self) -> &Arc<ChaosMonitor> {
        &self.monitor
    }
}

impl<S> Layer<S> for ChaosLayer {
    type Service = ChaosLatency<ChaosFault<ChaosOutcome<S>>>;

    fn layer(&self, inner: S) -> Self::Service {
        self.latency
            .layer(self.fault.layer(self.outcome.layer(inner)))
    }
}
