mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod webhook_config;

pub(crate) use {
    audio_config::AudioConfig,
    behaviour_config::BehaviourConfig,
    config::Config,
    webhook_config::WebhookConfig,
};

#[cfg(test)]
pub(crate) use webhook_config::Environment;

use just_talk_core::PLACEHOLDER_ENDPOINT;

pub(crate) const DEFAULT_MULTI_SPEAKER: bool = true;
pub(crate) const DEFAULT_MICROPHONE_PERMISSION: bool = true;
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub(crate) fn default_multi_speaker() -> bool {
    DEFAULT_MULTI_SPEAKER
}

pub(crate) fn default_microphone_permission() -> bool {
    DEFAULT_MICROPHONE_PERMISSION
}

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

pub(crate) fn default_webhook_url() -> String {
    PLACEHOLDER_ENDPOINT.to_string()
}
