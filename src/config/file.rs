//! TOML configuration file loading
//!
//! Supports `~/.config/vox/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct VoxConfigFile {
    /// Session controller tuning
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Terminal voice backend tuning
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Session controller configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    /// Wake phrases (e.g. `["hey jarvis", "ok jarvis"]`)
    pub wake_phrases: Option<Vec<String>>,

    /// Awake window in seconds
    pub wake_window_secs: Option<u64>,

    /// Wake reminder throttle in seconds
    pub wake_prompt_interval_secs: Option<u64>,

    /// Barge-in poll timeout in milliseconds
    pub barge_poll_timeout_ms: Option<u64>,

    /// Debounce after an empty capture, in milliseconds
    pub capture_debounce_ms: Option<u64>,

    /// Pause between turns, in milliseconds
    pub inter_turn_pause_ms: Option<u64>,

    /// Thread/playback join bound, in milliseconds
    pub join_timeout_ms: Option<u64>,

    /// Text side-channel queue capacity
    pub text_queue_capacity: Option<usize>,
}

/// Terminal voice backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Full-length capture timeout in seconds
    pub listen_timeout_secs: Option<u64>,

    /// Simulated playback dwell per word, in milliseconds
    pub word_pace_ms: Option<u64>,
}

impl VoxConfigFile {
    /// Overlay every present field onto `config`.
    pub fn apply(self, config: &mut Config) {
        let s = self.session;
        if let Some(phrases) = s.wake_phrases {
            config.session.wake_phrases = phrases;
        }
        if let Some(secs) = s.wake_window_secs {
            config.session.wake_window = Duration::from_secs(secs);
        }
        if let Some(secs) = s.wake_prompt_interval_secs {
            config.session.wake_prompt_interval = Duration::from_secs(secs);
        }
        if let Some(ms) = s.barge_poll_timeout_ms {
            config.session.barge_poll_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = s.capture_debounce_ms {
            config.session.capture_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = s.inter_turn_pause_ms {
            config.session.inter_turn_pause = Duration::from_millis(ms);
        }
        if let Some(ms) = s.join_timeout_ms {
            config.session.join_timeout = Duration::from_millis(ms);
        }
        if let Some(capacity) = s.text_queue_capacity {
            config.session.text_queue_capacity = capacity;
        }

        let v = self.voice;
        if let Some(secs) = v.listen_timeout_secs {
            config.voice.listen_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = v.word_pace_ms {
            config.voice.word_pace = Duration::from_millis(ms);
        }
    }
}

/// Read and parse the config file at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_from(path: &Path) -> Result<Option<VoxConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    let parsed = toml::from_str(&raw)?;
    Ok(Some(parsed))
}
