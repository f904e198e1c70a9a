//! Voice collaborator interfaces
//!
//! The controller only ever sees transcripts going in and reply text going
//! out. Acoustic capture, recognition, and synthesis live behind these traits
//! so the session logic can run against hardware backends, remote APIs, or
//! test doubles interchangeably.

mod terminal;

use std::time::Duration;

pub use terminal::{TerminalCapture, TerminalSynthesis};

use crate::Result;

/// Acquires user transcripts
///
/// Both calls block the invoking thread, are bounded by their timeout, return
/// `None` on silence or recognition failure, and never fail hard.
pub trait SpeechCapture: Send + Sync {
    /// Block for one full-length utterance, bounded by the backend's own
    /// maximum listen duration.
    fn listen(&self) -> Option<String>;

    /// Block for at most `timeout` waiting for an utterance. Used for short
    /// barge-in polls while the assistant is speaking.
    fn listen_for(&self, timeout: Duration) -> Option<String>;
}

/// Handle to one in-flight asynchronous playback
pub trait SynthesisJob: Send {
    /// Whether playback is still running.
    fn is_active(&self) -> bool;

    /// Wait for playback to finish, up to `timeout`. Returns `true` if the
    /// job completed within the bound.
    fn join_timeout(self: Box<Self>, timeout: Duration) -> bool;
}

/// Plays reply text out loud
///
/// At most one playback is active at a time; the controller enforces this by
/// always joining the previous job before starting another.
pub trait SpeechSynthesis: Send + Sync {
    /// Speak `text`, blocking until playback finishes or is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot start.
    fn speak(&self, text: &str) -> Result<()>;

    /// Start speaking `text` without blocking and return a join handle.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot start.
    fn speak_async(&self, text: &str) -> Result<Box<dyn SynthesisJob>>;

    /// Best-effort cancel of the active playback. Safe to call when idle.
    fn stop_speaking(&self);

    /// Whether a playback is currently active.
    fn is_speaking(&self) -> bool;
}
