//! Wake-word gate
//!
//! Decides, per utterance, whether the session should process it. Asleep
//! sessions only react to a wake phrase; awake sessions forward everything.
//! The gate is pure state over [`Instant`]s so it can be tested without
//! threads or collaborators.
//!
//! The awake window is re-extended on every processed turn but its expiry is
//! never acted on: only an explicit stop command puts the session back to
//! sleep. That mirrors the behavior of the system this gateway descends from;
//! the expiry timestamp is still tracked and exposed for observability.

use std::time::{Duration, Instant};

use crate::session::classify::{contains_wake_phrase, strip_wake_phrase};

/// What the gate decided about one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Process this text as the turn's command
    Forward(String),
    /// Wake phrase with no command attached; reply "Yes?" and wait
    Acknowledge,
    /// Asleep and no wake phrase; remind the user what to say
    Remind,
    /// Asleep, no wake phrase, reminder still throttled; do nothing
    Ignore,
}

/// Sleep/awake state machine keyed on configured wake phrases
#[derive(Debug)]
pub struct WakeGate {
    phrases: Vec<String>,
    wake_window: Duration,
    prompt_interval: Duration,
    awake: bool,
    awake_until: Option<Instant>,
    last_prompt_at: Option<Instant>,
}

impl WakeGate {
    /// Create an asleep gate.
    ///
    /// `phrases` must already be normalized (lowercase, single spaces); the
    /// configuration layer guarantees this.
    #[must_use]
    pub fn new(phrases: Vec<String>, wake_window: Duration, prompt_interval: Duration) -> Self {
        Self {
            phrases,
            wake_window,
            prompt_interval,
            awake: false,
            awake_until: None,
            last_prompt_at: None,
        }
    }

    /// Run one utterance through the gate.
    ///
    /// On `Forward`, the session is awake and its window has been re-extended
    /// to `now + wake_window`; the carried text is what the processor should
    /// see this turn (wake phrase stripped when one was present and left a
    /// usable remainder).
    pub fn observe(&mut self, now: Instant, text: &str) -> GateDecision {
        let resolved = if self.awake {
            self.observe_awake(now, text)
        } else {
            match self.observe_asleep(now, text) {
                Ok(resolved) => resolved,
                Err(decision) => return decision,
            }
        };

        // Awake is sticky for the rest of a processed turn.
        self.awake = true;
        self.awake_until = Some(now + self.wake_window);
        GateDecision::Forward(resolved)
    }

    /// Asleep path: wake up on a phrase, otherwise remind (throttled).
    fn observe_asleep(&mut self, now: Instant, text: &str) -> Result<String, GateDecision> {
        if !contains_wake_phrase(text, &self.phrases) {
            let due = self
                .last_prompt_at
                .is_none_or(|at| now.duration_since(at) >= self.prompt_interval);
            if due {
                self.last_prompt_at = Some(now);
                return Err(GateDecision::Remind);
            }
            return Err(GateDecision::Ignore);
        }

        self.awake = true;
        self.awake_until = Some(now + self.wake_window);

        let command = strip_wake_phrase(text, &self.phrases);
        if command.is_empty() || contains_wake_phrase(&command, &self.phrases) {
            return Err(GateDecision::Acknowledge);
        }
        Ok(command)
    }

    /// Awake path: strip a repeated wake phrase when it leaves a real command.
    fn observe_awake(&mut self, now: Instant, text: &str) -> String {
        if contains_wake_phrase(text, &self.phrases) {
            self.awake_until = Some(now + self.wake_window);
            let stripped = strip_wake_phrase(text, &self.phrases);
            if !stripped.is_empty() && !contains_wake_phrase(&stripped, &self.phrases) {
                return stripped;
            }
        }
        text.to_string()
    }

    /// Put the session back to sleep (explicit stop command).
    pub fn sleep(&mut self) {
        self.awake = false;
    }

    /// Whether the session flag says awake.
    #[must_use]
    pub const fn is_awake(&self) -> bool {
        self.awake
    }

    /// When the current awake window expires, if one was ever opened.
    #[must_use]
    pub const fn awake_until(&self) -> Option<Instant> {
        self.awake_until
    }

    /// The configured wake phrases.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(15);
    const THROTTLE: Duration = Duration::from_secs(4);

    fn gate() -> WakeGate {
        WakeGate::new(
            vec![
                "hey jarvis".to_string(),
                "ok jarvis".to_string(),
                "hello jarvis".to_string(),
            ],
            WINDOW,
            THROTTLE,
        )
    }

    #[test]
    fn wake_phrase_with_command_forwards_remainder() {
        let mut g = gate();
        let now = Instant::now();

        let decision = g.observe(now, "Hey Jarvis, what time is it?");
        assert_eq!(decision, GateDecision::Forward("what time is it".to_string()));
        assert!(g.is_awake());
        assert_eq!(g.awake_until(), Some(now + WINDOW));
    }

    #[test]
    fn bare_wake_phrase_is_acknowledged_and_wakes() {
        let mut g = gate();
        assert_eq!(g.observe(Instant::now(), "hey jarvis"), GateDecision::Acknowledge);
        assert!(g.is_awake());
    }

    #[test]
    fn doubled_wake_phrase_is_acknowledged() {
        let mut g = gate();
        let decision = g.observe(Instant::now(), "hey jarvis ok jarvis");
        assert_eq!(decision, GateDecision::Acknowledge);
    }

    #[test]
    fn asleep_without_phrase_reminds_then_throttles() {
        let mut g = gate();
        let now = Instant::now();

        assert_eq!(g.observe(now, "what time is it"), GateDecision::Remind);
        assert_eq!(
            g.observe(now + Duration::from_secs(1), "anyone there"),
            GateDecision::Ignore
        );
        assert_eq!(
            g.observe(now + THROTTLE, "still here"),
            GateDecision::Remind
        );
        assert!(!g.is_awake());
    }

    #[test]
    fn awake_session_forwards_plain_text_and_extends_window() {
        let mut g = gate();
        let t0 = Instant::now();
        g.observe(t0, "hey jarvis");

        let t1 = t0 + Duration::from_secs(5);
        let decision = g.observe(t1, "What's the weather?");
        assert_eq!(decision, GateDecision::Forward("What's the weather?".to_string()));
        assert_eq!(g.awake_until(), Some(t1 + WINDOW));
    }

    #[test]
    fn awake_session_strips_repeated_phrase_with_command() {
        let mut g = gate();
        g.observe(Instant::now(), "hey jarvis");

        let decision = g.observe(Instant::now(), "ok jarvis play some music");
        assert_eq!(decision, GateDecision::Forward("play some music".to_string()));
    }

    #[test]
    fn awake_session_forwards_bare_phrase_unstripped() {
        let mut g = gate();
        g.observe(Instant::now(), "hey jarvis turn on the lights");

        // Already awake, phrase alone leaves no remainder: forward as-is.
        let decision = g.observe(Instant::now(), "hey jarvis");
        assert_eq!(decision, GateDecision::Forward("hey jarvis".to_string()));
    }

    #[test]
    fn sleep_resets_flag_but_not_window_timestamp() {
        let mut g = gate();
        g.observe(Instant::now(), "hey jarvis lights off");
        let expiry = g.awake_until();

        g.sleep();
        assert!(!g.is_awake());
        assert_eq!(g.awake_until(), expiry);
    }

    #[test]
    fn window_expiry_alone_does_not_revert_to_asleep() {
        let mut g = gate();
        let t0 = Instant::now();
        g.observe(t0, "hey jarvis hello there");

        // Long past the window: still awake, commands still flow.
        let late = t0 + WINDOW * 10;
        let decision = g.observe(late, "and another thing");
        assert_eq!(decision, GateDecision::Forward("and another thing".to_string()));
    }
}
