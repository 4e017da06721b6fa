use crate::config::default_microphone_permission;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected input device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,

    /// Whether microphone capture is allowed at startup.
    #[serde(default = "default_microphone_permission")]
    pub microphone_permission: bool,

    /// Where span files are written until uploaded (None = cache dir).
    #[serde(default)]
    pub recordings_dir: Option<PathBuf>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            selected_device: None,
            microphone_permission: default_microphone_permission(),
            recordings_dir: None,
        }
    }
}
