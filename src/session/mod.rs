//! Session controller
//!
//! The long-lived loop that owns the voice session: it sequences capture,
//! stop/exit classification, the wake gate, input processing, and playback,
//! and it keeps speaking interruptible by polling for barge-in speech while a
//! reply plays. A failed turn is logged and the loop carries on; only an
//! explicit exit command (or [`SessionController::stop`]) ends the session.
//!
//! Threading: one controller thread runs the main loop, one worker thread
//! drains the text side channel, and playback runs on the synthesis
//! collaborator's own short-lived thread, joined before each turn completes.

pub mod classify;
pub mod gate;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::SessionConfig;
use crate::events::{Event, EventSink};
use crate::processor::InputProcessor;
use crate::session::classify::{is_exit_command, is_stop_command};
use crate::session::gate::{GateDecision, WakeGate};
use crate::voice::{SpeechCapture, SpeechSynthesis};
use crate::Result;

/// Reply when a wake phrase arrives with no command attached
const WAKE_ACK: &str = "Yes?";

/// Reply when a barge-in stop command cancels playback
const BARGE_STOP_ACK: &str = "Okay, I stopped speaking.";

/// Reply spoken before the session terminates
const FAREWELL: &str = "Goodbye.";

/// Status payload values
const STATUS_CONNECTED: &str = "connected";
const STATUS_LISTENING: &str = "listening";
const STATUS_PROCESSING: &str = "processing";

/// Drives one voice session over injected collaborators
///
/// All session state is in-memory and dies with the controller; nothing
/// persists across restarts.
pub struct SessionController {
    inner: Arc<Inner>,
    loop_thread: Mutex<Option<JoinHandle<()>>>,
    text_tx: SyncSender<String>,
}

/// State shared between the main loop, playback polls, and text workers
struct Inner {
    capture: Arc<dyn SpeechCapture>,
    synthesis: Arc<dyn SpeechSynthesis>,
    processor: Arc<dyn InputProcessor>,
    sink: Arc<dyn EventSink>,
    config: SessionConfig,
    running: AtomicBool,
    gate: Mutex<WakeGate>,
    /// Single-capacity barge-in handoff: overwrite-or-drop, newest wins
    barge_in: Mutex<Option<String>>,
    /// Signalled when the loop thread exits, so `stop` can join with a bound
    loop_done: (Mutex<bool>, Condvar),
}

impl SessionController {
    /// Create a controller over the given collaborators.
    ///
    /// Also starts the text side-channel worker; it runs until the controller
    /// is dropped.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        capture: Arc<dyn SpeechCapture>,
        synthesis: Arc<dyn SpeechSynthesis>,
        processor: Arc<dyn InputProcessor>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let gate = WakeGate::new(
            config.wake_phrases.clone(),
            config.wake_window,
            config.wake_prompt_interval,
        );
        let (text_tx, text_rx) = sync_channel(config.text_queue_capacity);

        let inner = Arc::new(Inner {
            capture,
            synthesis,
            processor,
            sink,
            config,
            running: AtomicBool::new(false),
            gate: Mutex::new(gate),
            barge_in: Mutex::new(None),
            loop_done: (Mutex::new(false), Condvar::new()),
        });

        let worker_inner = Arc::clone(&inner);
        thread::spawn(move || text_worker(&worker_inner, &text_rx));

        Self {
            inner,
            loop_thread: Mutex::new(None),
            text_tx,
        }
    }

    /// Spawn the main loop. No-op if the loop is already running.
    pub fn start(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already running");
            return;
        }

        if let Ok(mut done) = self.inner.loop_done.0.lock() {
            *done = false;
        }

        let inner = Arc::clone(&self.inner);
        let handle = thread::spawn(move || {
            run_loop(&inner);
            let (lock, cv) = &inner.loop_done;
            if let Ok(mut done) = lock.lock() {
                *done = true;
            }
            cv.notify_all();
        });

        if let Ok(mut slot) = self.loop_thread.lock() {
            *slot = Some(handle);
        }
        tracing::info!("session started");
    }

    /// Request termination, cancel active playback, and join the loop thread
    /// with a bound. Idempotent and safe from any thread.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.synthesis.stop_speaking();

        let handle = self.loop_thread.lock().ok().and_then(|mut slot| slot.take());
        let Some(handle) = handle else {
            return;
        };

        // The loop may be blocked in a capture bounded only by the
        // collaborator's own timeout; wait for its exit signal, then detach
        // rather than block shutdown past the configured bound.
        let (lock, cv) = &self.inner.loop_done;
        let finished = lock.lock().is_ok_and(|guard| {
            let (guard, _) = cv
                .wait_timeout_while(guard, self.inner.config.join_timeout, |done| !*done)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            *guard
        });

        if finished {
            let _ = handle.join();
            tracing::info!("session stopped");
        } else {
            tracing::warn!("loop thread still draining capture; detached");
        }
    }

    /// Queue externally supplied text, bypassing audio capture.
    ///
    /// Fire-and-forget: the text is processed on the side-channel worker. The
    /// queue is bounded; when it is full the newest input is dropped with a
    /// warning rather than blocking the caller.
    pub fn handle_text_input(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        match self.text_tx.try_send(text.to_string()) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(input = %dropped, "text input queue full, dropping");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("text input worker is gone");
            }
        }
    }

    /// Whether the main loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Whether the session is awake (wake phrase seen, no stop since).
    #[must_use]
    pub fn is_awake(&self) -> bool {
        self.inner.gate.lock().is_ok_and(|gate| gate.is_awake())
    }
}

/// Main loop body: greet, then turn over utterances until told to exit.
fn run_loop(inner: &Arc<Inner>) {
    inner.emit(Event::status(STATUS_CONNECTED));
    if let Err(e) = inner.synthesis.speak(&inner.config.greeting()) {
        tracing::warn!(error = %e, "greeting playback failed");
    }

    let mut announced_listening = false;
    while inner.running.load(Ordering::SeqCst) {
        if let Err(e) = inner.turn(&mut announced_listening) {
            tracing::error!(error = %e, "turn failed, continuing session");
        }
    }
    tracing::debug!("main loop exited");
}

/// Side-channel worker: drains queued text until the controller is dropped.
fn text_worker(inner: &Arc<Inner>, rx: &Receiver<String>) {
    while let Ok(text) = rx.recv() {
        inner.process_text_input(&text);
    }
    tracing::debug!("text worker exited");
}

impl Inner {
    fn emit(&self, event: Event) {
        self.sink.emit(event);
    }

    /// One main-loop iteration. Collaborator failures surface as `Err` and
    /// are contained at the loop boundary.
    fn turn(self: &Arc<Self>, announced_listening: &mut bool) -> Result<()> {
        let Some(text) = self.next_utterance(announced_listening) else {
            thread::sleep(self.config.capture_debounce);
            return Ok(());
        };
        *announced_listening = false;

        tracing::info!(transcript = %text, "heard");
        self.emit(Event::user_speech(text.clone()));

        if is_stop_command(&text) {
            self.handle_stop();
            return Ok(());
        }
        if is_exit_command(&text) {
            return self.handle_exit();
        }

        let decision = self
            .gate
            .lock()
            .map_or(GateDecision::Ignore, |mut gate| gate.observe(Instant::now(), &text));

        let resolved = match decision {
            GateDecision::Forward(resolved) => resolved,
            GateDecision::Acknowledge => {
                self.emit(Event::ai_response(WAKE_ACK));
                self.speak_with_interrupt(WAKE_ACK);
                return Ok(());
            }
            GateDecision::Remind => {
                self.emit(Event::ai_response(self.config.wake_reminder()));
                return Ok(());
            }
            GateDecision::Ignore => return Ok(()),
        };

        self.emit(Event::status(STATUS_PROCESSING));
        let reply = self.processor.process(&resolved);
        self.emit(Event::ai_response(reply.clone()));
        self.speak_with_interrupt(&reply);

        thread::sleep(self.config.inter_turn_pause);
        Ok(())
    }

    /// Take the pending barge-in utterance, or block on a fresh capture.
    ///
    /// `status=listening` is announced once when entering capture, not
    /// repeated across consecutive empty captures.
    fn next_utterance(&self, announced_listening: &mut bool) -> Option<String> {
        if let Some(pending) = self.barge_in.lock().ok().and_then(|mut slot| slot.take()) {
            tracing::debug!(transcript = %pending, "consuming barge-in utterance");
            return Some(pending);
        }

        if !*announced_listening {
            self.emit(Event::status(STATUS_LISTENING));
            *announced_listening = true;
        }

        self.capture.listen().filter(|text| !text.trim().is_empty())
    }

    /// Stop command: halt playback, put the gate to sleep, keep looping.
    fn handle_stop(&self) {
        if self.synthesis.is_speaking() {
            self.synthesis.stop_speaking();
        }
        if let Ok(mut gate) = self.gate.lock() {
            gate.sleep();
        }
        self.emit(Event::ai_response(self.config.stop_ack()));
    }

    /// Exit command: say goodbye (blocking) and end the session.
    fn handle_exit(&self) -> Result<()> {
        self.emit(Event::ai_response(FAREWELL));
        let spoken = self.synthesis.speak(FAREWELL);
        self.running.store(false, Ordering::SeqCst);
        spoken
    }

    /// Playback orchestrator: speak asynchronously while polling for
    /// barge-in speech, and always join the job before returning so playback
    /// never overlaps across turns.
    fn speak_with_interrupt(self: &Arc<Self>, text: &str) {
        let job = match self.synthesis.speak_async(text) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!(error = %e, "async playback failed to start");
                return;
            }
        };

        while self.running.load(Ordering::SeqCst) && job.is_active() {
            let Some(heard) = self.capture.listen_for(self.config.barge_poll_timeout) else {
                continue;
            };
            if heard.trim().is_empty() {
                continue;
            }

            self.emit(Event::user_speech(heard.clone()));

            if is_stop_command(&heard) {
                self.synthesis.stop_speaking();
                self.emit(Event::ai_response(BARGE_STOP_ACK));
                break;
            }
            if is_exit_command(&heard) {
                self.synthesis.stop_speaking();
                self.emit(Event::ai_response(FAREWELL));
                self.running.store(false, Ordering::SeqCst);
                break;
            }

            // Anything else becomes the next turn's input; the session is
            // already awake so it skips the wake gate.
            tracing::debug!(transcript = %heard, "barge-in, cancelling playback");
            if let Ok(mut slot) = self.barge_in.lock() {
                *slot = Some(heard);
            }
            self.synthesis.stop_speaking();
            break;
        }

        if !job.join_timeout(self.config.join_timeout) {
            tracing::warn!("playback did not settle within the join bound");
        }
    }

    /// Side-channel turn: same stop/exit handling as the main loop, without
    /// the capture/poll mechanics around utterance acquisition.
    fn process_text_input(self: &Arc<Self>, text: &str) {
        self.emit(Event::user_speech(text.to_string()));

        if is_stop_command(text) {
            self.synthesis.stop_speaking();
            if let Ok(mut gate) = self.gate.lock() {
                gate.sleep();
            }
            self.emit(Event::ai_response(self.config.stop_ack()));
            return;
        }
        if is_exit_command(text) {
            self.synthesis.stop_speaking();
            self.emit(Event::ai_response(FAREWELL));
            self.running.store(false, Ordering::SeqCst);
            return;
        }

        self.emit(Event::status(STATUS_PROCESSING));
        let reply = self.processor.process(text);
        self.emit(Event::ai_response(reply.clone()));
        self.speak_with_interrupt(&reply);
        self.emit(Event::status(STATUS_LISTENING));
    }
}
