//! Shared test doubles for session controller tests
//!
//! Scripted collaborators stand in for audio hardware: captures replay a
//! scripted sequence of transcripts, synthesis simulates a cancellable
//! playback of configurable length, and the sink records every event.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, channel};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use vox_gateway::SessionConfig;
use vox_gateway::events::{Event, EventKind, EventSink};
use vox_gateway::processor::InputProcessor;
use vox_gateway::voice::{SpeechCapture, SpeechSynthesis, SynthesisJob};
use vox_gateway::{Error, Result};

/// Session config with short timings so tests run in milliseconds
pub fn fast_config() -> SessionConfig {
    SessionConfig {
        barge_poll_timeout: Duration::from_millis(20),
        capture_debounce: Duration::from_millis(5),
        inter_turn_pause: Duration::from_millis(5),
        join_timeout: Duration::from_secs(2),
        ..SessionConfig::default()
    }
}

/// Poll `cond` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

/// Replays scripted transcripts; `None` entries model silence/timeouts
pub struct ScriptedCapture {
    main: Mutex<VecDeque<Option<String>>>,
    polls: Mutex<VecDeque<Option<String>>>,
}

impl ScriptedCapture {
    pub fn new(main: &[Option<&str>], polls: &[Option<&str>]) -> Self {
        let to_deque = |items: &[Option<&str>]| {
            items
                .iter()
                .map(|i| i.map(ToString::to_string))
                .collect::<VecDeque<_>>()
        };
        Self {
            main: Mutex::new(to_deque(main)),
            polls: Mutex::new(to_deque(polls)),
        }
    }

    fn pop(queue: &Mutex<VecDeque<Option<String>>>) -> Option<String> {
        let next = queue.lock().unwrap().pop_front();
        match next {
            Some(Some(text)) => Some(text),
            // Scripted silence or an exhausted script: behave like a bounded
            // capture that heard nothing.
            Some(None) | None => {
                thread::sleep(Duration::from_millis(10));
                None
            }
        }
    }
}

impl SpeechCapture for ScriptedCapture {
    fn listen(&self) -> Option<String> {
        Self::pop(&self.main)
    }

    fn listen_for(&self, _timeout: Duration) -> Option<String> {
        Self::pop(&self.polls)
    }
}

/// Simulated synthesis with a fixed playback duration
pub struct FakeSynthesis {
    duration: Duration,
    cancel: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
    spoken: Mutex<Vec<String>>,
    async_spoken: Mutex<Vec<String>>,
    cancellations: AtomicUsize,
}

impl FakeSynthesis {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            cancel: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicBool::new(false)),
            spoken: Mutex::new(Vec::new()),
            async_spoken: Mutex::new(Vec::new()),
            cancellations: AtomicUsize::new(0),
        }
    }

    /// Texts spoken through the blocking path.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    /// Texts spoken through the async (orchestrated) path.
    pub fn async_spoken(&self) -> Vec<String> {
        self.async_spoken.lock().unwrap().clone()
    }

    /// How many times `stop_speaking` was called.
    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl SpeechSynthesis for FakeSynthesis {
    fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn speak_async(&self, text: &str) -> Result<Box<dyn SynthesisJob>> {
        if text.is_empty() {
            return Err(Error::Synthesis("nothing to speak".to_string()));
        }
        self.async_spoken.lock().unwrap().push(text.to_string());
        self.cancel.store(false, Ordering::SeqCst);
        self.active.store(true, Ordering::SeqCst);

        let duration = self.duration;
        let cancel = Arc::clone(&self.cancel);
        let active = Arc::clone(&self.active);
        let (done_tx, done_rx) = channel();

        thread::spawn(move || {
            let started = Instant::now();
            while started.elapsed() < duration && !cancel.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(5));
            }
            active.store(false, Ordering::SeqCst);
            let _ = done_tx.send(());
        });

        Ok(Box::new(FakeJob {
            active: Arc::clone(&self.active),
            done: done_rx,
        }))
    }

    fn stop_speaking(&self) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

struct FakeJob {
    active: Arc<AtomicBool>,
    done: Receiver<()>,
}

impl SynthesisJob for FakeJob {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn join_timeout(self: Box<Self>, timeout: Duration) -> bool {
        self.done.recv_timeout(timeout).is_ok()
    }
}

/// Records processor invocations and returns a canned reply
pub struct RecordingProcessor {
    calls: Mutex<Vec<String>>,
    reply: String,
}

impl RecordingProcessor {
    pub fn new(reply: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            reply: reply.to_string(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl InputProcessor for RecordingProcessor {
    fn process(&self, text: &str) -> String {
        self.calls.lock().unwrap().push(text.to_string());
        self.reply.clone()
    }
}

/// Collects every emitted event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Payloads of all recorded events of one kind, in emission order.
    pub fn payloads(&self, kind: EventKind) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.payload)
            .collect()
    }

    /// Wait until an event of `kind` with exactly `payload` has been emitted.
    pub fn wait_for(&self, kind: EventKind, payload: &str, timeout: Duration) -> bool {
        wait_until(timeout, || {
            self.payloads(kind).iter().any(|p| p == payload)
        })
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}
