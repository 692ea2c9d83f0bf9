//! Downstream todos API configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http::HttpTransportConfig;

/// Where the todos are fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodosAppConfig {
    /// Base URL of the todos API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the todos collection
    #[serde(default = "default_path")]
    pub path: String,

    /// Connection timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://jsonplaceholder.typicode.com".to_string()
}

fn default_path() -> String {
    "/todos".to_string()
}

const fn default_connect_timeout() -> u64 {
    10
}

impl Default for TodosAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl TodosAppConfig {
    /// Transport settings for the todos destination
    #[must_use]
    pub fn to_transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..HttpTransportConfig::default()
        }
    }
}
