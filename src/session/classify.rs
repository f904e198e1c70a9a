//! Transcript normalization and utterance classification
//!
//! Pure functions shared by the main loop, the barge-in poll, and the text
//! side channel. Stop/exit detection is word-level membership on normalized
//! text ("stopwatch" never matches "stop"); wake-phrase detection is substring
//! containment on the same normalized form.

/// Words that halt playback and put the session back to sleep
pub const STOP_WORDS: &[&str] = &["stop"];

/// Words that terminate the whole session
pub const EXIT_WORDS: &[&str] = &["quit", "exit", "bye", "close"];

/// Lowercase `text` and collapse every run of non-alphanumeric characters to
/// a single space, trimming the ends.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            pending_space = true;
        }
    }
    out
}

fn has_word(text: &str, words: &[&str]) -> bool {
    normalize(text)
        .split_whitespace()
        .any(|token| words.contains(&token))
}

/// Whether the utterance is a stop command.
#[must_use]
pub fn is_stop_command(text: &str) -> bool {
    has_word(text, STOP_WORDS)
}

/// Whether the utterance is an exit command.
#[must_use]
pub fn is_exit_command(text: &str) -> bool {
    has_word(text, EXIT_WORDS)
}

/// Whether the utterance contains any of the configured wake phrases.
#[must_use]
pub fn contains_wake_phrase(text: &str, phrases: &[String]) -> bool {
    let normalized = normalize(text);
    phrases.iter().any(|p| normalized.contains(p.as_str()))
}

/// Strip the first matched wake phrase, returning the normalized remainder.
///
/// If no phrase matches, the trimmed original text is returned unchanged.
#[must_use]
pub fn strip_wake_phrase(text: &str, phrases: &[String]) -> String {
    let normalized = normalize(text);
    for phrase in phrases {
        if let Some(idx) = normalized.find(phrase.as_str()) {
            return normalized[idx + phrase.len()..].trim().to_string();
        }
    }
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases() -> Vec<String> {
        vec![
            "hey jarvis".to_string(),
            "ok jarvis".to_string(),
            "hello jarvis".to_string(),
        ]
    }

    #[test]
    fn normalize_collapses_punctuation_runs() {
        assert_eq!(normalize("Hey, Jarvis!!  What's up?"), "hey jarvis what s up");
        assert_eq!(normalize("...  "), "");
        assert_eq!(normalize("STOP"), "stop");
    }

    #[test]
    fn stop_matches_whole_words_only() {
        assert!(is_stop_command("please stop now"));
        assert!(is_stop_command("Stop!"));
        assert!(!is_stop_command("start my stopwatch"));
        assert!(!is_stop_command("unstoppable"));
    }

    #[test]
    fn exit_words_match_any_token() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("ok bye then"));
        assert!(is_exit_command("please close."));
        assert!(!is_exit_command("the exits are closed-ish"));
    }

    #[test]
    fn wake_phrase_survives_case_and_punctuation() {
        let p = phrases();
        assert!(contains_wake_phrase("Hey Jarvis, what time is it?", &p));
        assert!(contains_wake_phrase("OK... Jarvis?", &p));
        assert!(contains_wake_phrase("well HELLO jarvis", &p));
        assert!(!contains_wake_phrase("hey jarvi", &p));
    }

    #[test]
    fn strip_returns_remainder_after_first_phrase() {
        let p = phrases();
        assert_eq!(
            strip_wake_phrase("Hey Jarvis, what time is it?", &p),
            "what time is it"
        );
        assert_eq!(strip_wake_phrase("hey jarvis", &p), "");
        assert_eq!(strip_wake_phrase("no trigger here ", &p), "no trigger here");
    }

    #[test]
    fn strip_handles_phrase_mid_utterance() {
        let p = phrases();
        assert_eq!(
            strip_wake_phrase("um, hey jarvis set a timer", &p),
            "set a timer"
        );
    }
}
