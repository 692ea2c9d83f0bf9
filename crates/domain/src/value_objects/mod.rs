//! Value Objects - Immutable, identity-less domain primitives

mod environment;
mod injection_rate;

pub use environment::Environment;
pub use injection_rate::{InjectionRate, InvalidInjectionRate};
