//! Outbound HTTP transport
//!
//! The innermost service of every outbound pipeline. It issues the real
//! request with `reqwest`, propagates the correlation id as `X-Request-Id`
//! and hands the raw status and body back up through the layers above it.

mod transport;

pub use transport::{
    HttpTransport, HttpTransportConfig, Outcome, OutboundRequest, TransportResponse, X_REQUEST_ID,
};
