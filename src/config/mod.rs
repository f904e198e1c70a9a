//! Configuration management for the Vox gateway

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::classify::normalize;
use crate::{Error, Result};

/// Default wake phrases, matched against normalized transcripts
const DEFAULT_WAKE_PHRASES: &[&str] = &["hey jarvis", "ok jarvis", "hello jarvis"];

/// How long a session stays responsive after a processed turn
const DEFAULT_WAKE_WINDOW: Duration = Duration::from_secs(15);

/// Minimum gap between "say the wake phrase" reminders
const DEFAULT_WAKE_PROMPT_INTERVAL: Duration = Duration::from_secs(4);

/// Bound on each barge-in capture poll during playback
const DEFAULT_BARGE_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Pause after an empty capture before retrying
const DEFAULT_CAPTURE_DEBOUNCE: Duration = Duration::from_millis(200);

/// Pause between turns
const DEFAULT_INTER_TURN_PAUSE: Duration = Duration::from_millis(200);

/// Bound on joining the loop thread and playback jobs
const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Text side-channel queue capacity (drop-newest beyond this)
const DEFAULT_TEXT_QUEUE_CAPACITY: usize = 8;

/// Bound on one full-length terminal capture
const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(8);

/// Simulated playback dwell per word
const DEFAULT_WORD_PACE: Duration = Duration::from_millis(300);

/// Vox gateway configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Session controller tuning
    pub session: SessionConfig,

    /// Terminal voice backend tuning
    pub voice: VoiceConfig,
}

/// Session controller configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Wake phrases, stored normalized (lowercase, single spaces)
    pub wake_phrases: Vec<String>,

    /// Awake window re-extended on every processed turn
    pub wake_window: Duration,

    /// Throttle between wake-phrase reminders while asleep
    pub wake_prompt_interval: Duration,

    /// Timeout of each barge-in capture poll
    pub barge_poll_timeout: Duration,

    /// Sleep after an empty full-length capture
    pub capture_debounce: Duration,

    /// Sleep between turns
    pub inter_turn_pause: Duration,

    /// Bound when joining the loop thread or a playback job
    pub join_timeout: Duration,

    /// Bounded capacity of the text side-channel queue
    pub text_queue_capacity: usize,
}

/// Terminal voice backend configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Bound on one full-length capture
    pub listen_timeout: Duration,

    /// Simulated playback dwell per word
    pub word_pace: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_phrases: DEFAULT_WAKE_PHRASES.iter().map(ToString::to_string).collect(),
            wake_window: DEFAULT_WAKE_WINDOW,
            wake_prompt_interval: DEFAULT_WAKE_PROMPT_INTERVAL,
            barge_poll_timeout: DEFAULT_BARGE_POLL_TIMEOUT,
            capture_debounce: DEFAULT_CAPTURE_DEBOUNCE,
            inter_turn_pause: DEFAULT_INTER_TURN_PAUSE,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            text_queue_capacity: DEFAULT_TEXT_QUEUE_CAPACITY,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
            word_pace: DEFAULT_WORD_PACE,
        }
    }
}

impl SessionConfig {
    /// The primary wake phrase, used in user-facing prompts.
    #[must_use]
    pub fn primary_phrase(&self) -> &str {
        self.wake_phrases.first().map_or("hey jarvis", String::as_str)
    }

    /// Greeting spoken when the session starts.
    #[must_use]
    pub fn greeting(&self) -> String {
        format!("Hello. Say {} when you need me.", self.primary_phrase())
    }

    /// Reminder emitted while asleep without a wake phrase.
    #[must_use]
    pub fn wake_reminder(&self) -> String {
        format!("Say {} first.", self.primary_phrase())
    }

    /// Acknowledgement emitted after a stop command.
    #[must_use]
    pub fn stop_ack(&self) -> String {
        format!(
            "Okay, I stopped. Say {} when you need me again.",
            self.primary_phrase()
        )
    }
}

impl Config {
    /// Load configuration: defaults, overlaid by the TOML config file (if
    /// present), overlaid by environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid, or if
    /// the resulting wake phrase list is unusable.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let file_path = path.map_or_else(default_config_path, |p| Some(p.to_path_buf()));
        if let Some(file_path) = file_path {
            if let Some(overlay) = file::load_from(&file_path)? {
                tracing::debug!(path = %file_path.display(), "loaded config file");
                overlay.apply(&mut config);
            } else if path.is_some() {
                // An explicitly requested file must exist.
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    file_path.display()
                )));
            }
        }

        if let Ok(phrases) = std::env::var("VOX_WAKE_PHRASES") {
            config.session.wake_phrases =
                phrases.split(',').map(ToString::to_string).collect();
        }

        config.session.wake_phrases = normalize_phrases(&config.session.wake_phrases)?;
        Ok(config)
    }
}

/// Normalize and validate wake phrases; empty results are configuration bugs.
fn normalize_phrases(phrases: &[String]) -> Result<Vec<String>> {
    let normalized: Vec<String> = phrases
        .iter()
        .map(|p| normalize(p))
        .filter(|p| !p.is_empty())
        .collect();

    if normalized.is_empty() {
        return Err(Error::Config(
            "at least one non-empty wake phrase is required".to_string(),
        ));
    }
    Ok(normalized)
}

/// Default config file location: `~/.config/vox/config.toml`
fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("vox").join("config.toml"))
}
