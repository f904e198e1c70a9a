//! Input processing boundary
//!
//! The controller hands resolved utterance text to an [`InputProcessor`] and
//! speaks whatever comes back. The real responder (command parsing, LLM
//! routing, memory) lives behind this trait; the controller treats its output
//! as opaque.

/// Turns user text into a reply
///
/// `process` must be infallible from the caller's perspective: any internal
/// failure is represented as a fallback reply string, never an error or a
/// panic. Implementations may be called concurrently from the main loop and
/// side-channel workers.
pub trait InputProcessor: Send + Sync {
    /// Produce a reply for the given utterance.
    fn process(&self, text: &str) -> String;
}

/// Fallback reply used when the processor receives nothing usable
pub const EMPTY_INPUT_REPLY: &str = "I did not hear anything.";

/// Minimal built-in responder
///
/// Echoes the utterance back. Stands in for the real command/LLM engine when
/// running the gateway without one wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoResponder;

impl InputProcessor for EchoResponder {
    fn process(&self, text: &str) -> String {
        let cleaned = text.trim();
        if cleaned.is_empty() {
            return EMPTY_INPUT_REPLY.to_string();
        }
        format!("You said: {cleaned}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_trimmed_input() {
        let p = EchoResponder;
        assert_eq!(p.process("  what time is it  "), "You said: what time is it");
    }

    #[test]
    fn blank_input_gets_fallback_reply() {
        let p = EchoResponder;
        assert_eq!(p.process(""), EMPTY_INPUT_REPLY);
        assert_eq!(p.process("   "), EMPTY_INPUT_REPLY);
    }
}
