//! Daemon - the assembled gateway
//!
//! Wires configuration into concrete collaborators, subscribes a log consumer
//! to the event bus, and runs the session controller until the user ends the
//! session.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::events::{EventBus, EventKind};
use crate::processor::{EchoResponder, InputProcessor};
use crate::session::SessionController;
use crate::voice::{SpeechCapture, SpeechSynthesis, TerminalCapture, TerminalSynthesis};
use crate::Result;

/// How often the daemon checks whether the session has ended
const SESSION_POLL: Duration = Duration::from_millis(200);

/// The Vox daemon - owns the controller and the event fan-out
pub struct Daemon {
    config: Config,
}

impl Daemon {
    /// Create a daemon from loaded configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run a terminal-backed session until the user says an exit word.
    ///
    /// Typed lines stand in for transcripts; replies are printed and paced so
    /// barge-in behaves like it would against real audio.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be assembled.
    pub fn run(self) -> Result<()> {
        let capture: Arc<dyn SpeechCapture> =
            Arc::new(TerminalCapture::stdin(self.config.voice.listen_timeout));
        let synthesis: Arc<dyn SpeechSynthesis> =
            Arc::new(TerminalSynthesis::new(self.config.voice.word_pace));
        let processor: Arc<dyn InputProcessor> = Arc::new(EchoResponder);
        self.run_with(capture, synthesis, processor)
    }

    /// Run with caller-supplied collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be assembled.
    pub fn run_with(
        self,
        capture: Arc<dyn SpeechCapture>,
        synthesis: Arc<dyn SpeechSynthesis>,
        processor: Arc<dyn InputProcessor>,
    ) -> Result<()> {
        let bus = Arc::new(EventBus::new());
        let events = bus.subscribe();

        // Event log consumer: every session event becomes a structured log line.
        thread::spawn(move || {
            for event in events {
                match event.kind {
                    EventKind::Status => {
                        tracing::info!(status = %event.payload, "session status");
                    }
                    EventKind::UserSpeech => {
                        tracing::info!(transcript = %event.payload, "user speech");
                    }
                    EventKind::AiResponse => {
                        tracing::info!(reply = %event.payload, "assistant reply");
                    }
                }
            }
        });

        let controller = SessionController::new(
            self.config.session.clone(),
            capture,
            synthesis,
            processor,
            bus,
        );

        tracing::info!(
            wake_phrase = %self.config.session.primary_phrase(),
            "vox gateway ready - type or say the wake phrase"
        );
        controller.start();

        // The session ends itself on an exit command; just wait for it.
        while controller.is_running() {
            thread::sleep(SESSION_POLL);
        }
        controller.stop();

        tracing::info!("session ended");
        Ok(())
    }
}
