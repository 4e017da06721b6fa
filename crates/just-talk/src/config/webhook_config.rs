use crate::config::{default_timeout_secs, default_webhook_url};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Deployment environment selecting which webhook URL is used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production webhook.
    #[default]
    Prod,
    /// Test webhook.
    Test,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Prod => f.write_str("prod"),
            Environment::Test => f.write_str("test"),
        }
    }
}

/// Upload endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Which of the two URLs is active.
    #[serde(default)]
    pub environment: Environment,

    /// Production webhook URL.
    #[serde(default = "default_webhook_url")]
    pub url_prod: String,

    /// Test webhook URL.
    #[serde(default = "default_webhook_url")]
    pub url_test: String,

    /// Request timeout for the upload, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl WebhookConfig {
    /// URL configured for the active environment, as written.
    pub fn active_url(&self) -> &str {
        match self.environment {
            Environment::Prod => &self.url_prod,
            Environment::Test => &self.url_test,
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            url_prod: default_webhook_url(),
            url_test: default_webhook_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
