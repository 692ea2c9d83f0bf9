//! Domain layer for the chaos-tested todos client
//!
//! Contains the downstream entities, value objects and domain errors.
//! This layer has no I/O and defines the ubiquitous language shared by the
//! resilience and chaos layers.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
