//! Terminal-backed capture and synthesis
//!
//! Lets the gateway run end to end on a keyboard and a terminal: typed lines
//! stand in for transcripts, and playback is simulated by printing the reply
//! and pacing through it word by word so barge-in timing is realistic.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::voice::{SpeechCapture, SpeechSynthesis, SynthesisJob};
use crate::{Error, Result};

/// How long a simulated playback dwells on each word
const WORD_PACE: Duration = Duration::from_millis(300);

/// Granularity of the cancellation check during simulated playback
const CANCEL_POLL: Duration = Duration::from_millis(25);

/// Reads "transcripts" as lines from an input stream
///
/// A background thread drains the stream into a channel so both the
/// full-length `listen` and the short barge-in poll are plain bounded waits.
pub struct TerminalCapture {
    lines: Mutex<Receiver<String>>,
    listen_timeout: Duration,
}

impl TerminalCapture {
    /// Capture lines from stdin.
    #[must_use]
    pub fn stdin(listen_timeout: Duration) -> Self {
        let (tx, rx) = channel();
        // The stdin lock is not Send; take it on the reader thread itself.
        thread::spawn(move || {
            let stdin = std::io::stdin();
            read_lines(stdin.lock(), &tx);
        });
        Self {
            lines: Mutex::new(rx),
            listen_timeout,
        }
    }

    /// Capture lines from any buffered reader (used by diagnostics and tests).
    #[must_use]
    pub fn from_reader<R>(reader: R, listen_timeout: Duration) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = channel();
        thread::spawn(move || read_lines(reader, &tx));
        Self {
            lines: Mutex::new(rx),
            listen_timeout,
        }
    }

    fn recv(&self, timeout: Duration) -> Option<String> {
        let Ok(rx) = self.lines.lock() else {
            return None;
        };
        rx.recv_timeout(timeout).ok()
    }
}

fn read_lines<R: BufRead>(reader: R, tx: &Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                if tx.send(text).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "terminal input closed");
                break;
            }
        }
    }
}

impl SpeechCapture for TerminalCapture {
    fn listen(&self) -> Option<String> {
        self.recv(self.listen_timeout)
    }

    fn listen_for(&self, timeout: Duration) -> Option<String> {
        self.recv(timeout)
    }
}

/// Prints replies and simulates their playback duration
///
/// The pacing makes `stop_speaking` and barge-in observable without audio
/// hardware: a long reply stays "speaking" for a proportional wall-clock time
/// and can be cancelled mid-utterance.
pub struct TerminalSynthesis {
    word_pace: Duration,
    cancel: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
}

impl Default for TerminalSynthesis {
    fn default() -> Self {
        Self::new(WORD_PACE)
    }
}

impl TerminalSynthesis {
    /// Create a synthesis backend dwelling `word_pace` per spoken word.
    #[must_use]
    pub fn new(word_pace: Duration) -> Self {
        Self {
            word_pace,
            cancel: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    fn play(text: &str, word_pace: Duration, cancel: &AtomicBool, active: &AtomicBool) {
        println!(">> {text}");
        let words = text.split_whitespace().count().max(1);
        let total = word_pace.saturating_mul(u32::try_from(words).unwrap_or(u32::MAX));
        let started = std::time::Instant::now();

        while started.elapsed() < total {
            if cancel.load(Ordering::SeqCst) {
                tracing::debug!("playback cancelled");
                break;
            }
            thread::sleep(CANCEL_POLL.min(total.saturating_sub(started.elapsed())));
        }
        active.store(false, Ordering::SeqCst);
    }
}

impl SpeechSynthesis for TerminalSynthesis {
    fn speak(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.cancel.store(false, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);
        Self::play(text, self.word_pace, &self.cancel, &self.active);
        Ok(())
    }

    fn speak_async(&self, text: &str) -> Result<Box<dyn SynthesisJob>> {
        if text.is_empty() {
            return Err(Error::Synthesis("nothing to speak".to_string()));
        }
        self.cancel.store(false, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);

        let text = text.to_string();
        let word_pace = self.word_pace;
        let cancel = Arc::clone(&self.cancel);
        let active = Arc::clone(&self.active);
        let (done_tx, done_rx) = channel();

        thread::spawn(move || {
            Self::play(&text, word_pace, &cancel, &active);
            let _ = done_tx.send(());
        });

        Ok(Box::new(TerminalJob {
            active: Arc::clone(&self.active),
            done: done_rx,
        }))
    }

    fn stop_speaking(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

struct TerminalJob {
    active: Arc<AtomicBool>,
    done: Receiver<()>,
}

impl SynthesisJob for TerminalJob {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn join_timeout(self: Box<Self>, timeout: Duration) -> bool {
        // A disconnected channel means the playback thread already exited.
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => true,
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
        }
    }
}
