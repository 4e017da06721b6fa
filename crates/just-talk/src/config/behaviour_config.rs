use crate::config::default_multi_speaker;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Initial value of the multi-speaker toggle.
    #[serde(default = "default_multi_speaker")]
    pub multi_speaker: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            multi_speaker: default_multi_speaker(),
        }
    }
}
