//! Vox Gateway - wake-word gated voice session controller for AI assistants
//!
//! This library provides the core of a voice-driven conversational front end:
//! - Wake-phrase gating with an awake-session window
//! - A long-lived capture/classify/process/speak loop
//! - Interruptible playback (barge-in cancels a reply mid-utterance)
//! - A text side channel that bypasses audio capture
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  Collaborators                       │
//! │  SpeechCapture │ SpeechSynthesis │ InputProcessor   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │               Session Controller                     │
//! │  Wake Gate │ Main Loop │ Barge-in │ Text Channel    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Event Bus                           │
//! │  status │ user_speech │ ai_response  → subscribers  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! Speech recognition, real synthesis, and the command/LLM responder are
//! external: the controller sees them only through the [`voice`] and
//! [`processor`] traits.

pub mod config;
pub mod daemon;
pub mod error;
pub mod events;
pub mod processor;
pub mod session;
pub mod voice;

pub use config::{Config, SessionConfig, VoiceConfig};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use events::{Event, EventBus, EventKind, EventSink};
pub use processor::{EchoResponder, InputProcessor};
pub use session::SessionController;
pub use session::gate::{GateDecision, WakeGate};
pub use voice::{SpeechCapture, SpeechSynthesis, SynthesisJob, TerminalCapture, TerminalSynthesis};
