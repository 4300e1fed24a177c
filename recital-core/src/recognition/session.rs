//! `RecognitionSession` — supervises a continuous recognition backend.
//!
//! ## Lifecycle
//!
//! ```text
//! start_listening() ──► Listening ──Ended──► Restarting ──backoff──► Listening
//!                          │   ▲                  │
//!                          │   └── transcript resets attempt count
//!        fatal error ──────┤                      └── attempts exhausted ──► Stopped
//!        stop_listening() ─┴──► Stopped
//! ```
//!
//! The "should listen" flag is the single source of truth for whether a
//! restart may happen. Every scheduled restart captures the session's
//! current [`CancelToken`]; `stop_listening` and fatal errors cancel it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{RecognitionBackend, RecognitionErrorCode, RecognitionEvent, RestartPolicy};
use crate::{
    cancel::CancelToken,
    error::Result,
    ipc::events::{
        ListeningStatus, ListeningStatusEvent, SegmentKind, TranscriptEvent, TranscriptSegment,
    },
};

/// Broadcast channel capacity: transcript partials can arrive quickly.
const BROADCAST_CAP: usize = 256;

struct Inner {
    backend: Box<dyn RecognitionBackend>,
    policy: RestartPolicy,
    should_listen: bool,
    /// Backend session believed to be open.
    active: bool,
    /// Consecutive restarts since the last transcript.
    attempts: u32,
    restart_token: CancelToken,
    pending_restart: Option<JoinHandle<()>>,
    committed: String,
    interim: String,
    next_utterance: u64,
    seq: u64,
    status: ListeningStatus,
    transcript_tx: broadcast::Sender<TranscriptEvent>,
    status_tx: broadcast::Sender<ListeningStatusEvent>,
}

/// Clonable handle around a recognition backend.
#[derive(Clone)]
pub struct RecognitionSession {
    inner: Arc<Mutex<Inner>>,
    transcript_tx: broadcast::Sender<TranscriptEvent>,
    status_tx: broadcast::Sender<ListeningStatusEvent>,
}

impl std::fmt::Debug for RecognitionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionSession").finish_non_exhaustive()
    }
}

impl RecognitionSession {
    pub fn new<B: RecognitionBackend>(backend: B, policy: RestartPolicy) -> Self {
        let (transcript_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);
        let inner = Inner {
            backend: Box::new(backend),
            policy,
            should_listen: false,
            active: false,
            attempts: 0,
            restart_token: CancelToken::new(),
            pending_restart: None,
            committed: String::new(),
            interim: String::new(),
            next_utterance: 0,
            seq: 0,
            status: ListeningStatus::Idle,
            transcript_tx: transcript_tx.clone(),
            status_tx: status_tx.clone(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            transcript_tx,
            status_tx,
        }
    }

    /// Open the backend session and keep it open until `stop_listening`.
    /// Calling it while already listening is a no-op.
    ///
    /// # Errors
    /// Propagates the backend's `start` failure (status becomes `Error`).
    pub fn start_listening(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.should_listen && inner.active {
            return Ok(());
        }
        inner.cancel_restart();
        inner.should_listen = true;
        inner.attempts = 0;

        if let Err(e) = inner.backend.start() {
            warn!(error = %e, "recognition failed to start");
            inner.should_listen = false;
            inner.set_status(ListeningStatus::Error, Some(e.to_string()));
            return Err(e);
        }
        inner.active = true;
        inner.set_status(ListeningStatus::Listening, None);
        info!("recognition started");
        Ok(())
    }

    /// Stop listening. No restart fires after this returns.
    pub fn stop_listening(&self) {
        let mut inner = self.inner.lock();
        inner.should_listen = false;
        inner.cancel_restart();
        if inner.active {
            inner.backend.stop();
            inner.active = false;
        }
        inner.interim.clear();
        inner.set_status(ListeningStatus::Stopped, None);
        info!("recognition stopped");
    }

    /// Whether the caller currently wants to be listening.
    pub fn is_listening(&self) -> bool {
        self.inner.lock().should_listen
    }

    pub fn status(&self) -> ListeningStatus {
        self.inner.lock().status
    }

    /// Committed text followed by the live interim hypothesis.
    pub fn transcript(&self) -> String {
        let inner = self.inner.lock();
        match (inner.committed.is_empty(), inner.interim.is_empty()) {
            (_, true) => inner.committed.clone(),
            (true, false) => inner.interim.clone(),
            (false, false) => format!("{} {}", inner.committed, inner.interim),
        }
    }

    /// Forget accumulated text, e.g. when moving to the next sentence.
    pub fn clear_transcript(&self) {
        let mut inner = self.inner.lock();
        inner.committed.clear();
        inner.interim.clear();
    }

    pub fn subscribe_transcripts(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.transcript_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<ListeningStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Feed a backend callback into the session.
    pub fn handle_event(&self, event: RecognitionEvent) {
        let mut inner = self.inner.lock();
        match event {
            RecognitionEvent::Transcript {
                text,
                is_final,
                confidence,
            } => {
                if !inner.should_listen {
                    debug!("dropping transcript received while not listening");
                    return;
                }
                inner.attempts = 0;
                inner.record_transcript(text, is_final, confidence);
            }
            RecognitionEvent::Error(code) => Self::handle_error(&mut inner, code),
            RecognitionEvent::Ended => {
                inner.active = false;
                if !inner.should_listen {
                    debug!("recognition ended after stop");
                    return;
                }
                if inner.pending_restart.is_some() {
                    debug!("recognition end while a restart is pending");
                    return;
                }
                schedule_restart(&self.inner, &mut inner);
            }
        }
    }

    fn handle_error(inner: &mut Inner, code: RecognitionErrorCode) {
        if code.is_ignored() {
            debug!(code = %code, "ignoring recognition error");
            return;
        }
        if code.is_fatal() {
            warn!(code = %code, "fatal recognition error — listening stopped");
            inner.should_listen = false;
            inner.active = false;
            inner.cancel_restart();
            inner.set_status(ListeningStatus::Error, Some(code.to_string()));
            return;
        }
        warn!(code = %code, "recognition error");
        let status = inner.status;
        inner.set_status(status, Some(code.to_string()));
    }
}

/// Schedule the next restart attempt, or give up once the policy is
/// exhausted. `shared` is the mutex `inner` was locked from.
fn schedule_restart(shared: &Arc<Mutex<Inner>>, inner: &mut Inner) {
    inner.attempts = inner.attempts.saturating_add(1);
    let attempt = inner.attempts;

    if !inner.policy.allows(attempt) {
        warn!(
            attempts = attempt - 1,
            "recognition kept ending — giving up on automatic restart"
        );
        inner.should_listen = false;
        inner.set_status(
            ListeningStatus::Stopped,
            Some("restart limit reached".into()),
        );
        return;
    }

    let delay = inner.policy.backoff(attempt);
    inner.set_status(
        ListeningStatus::Restarting,
        Some(format!("attempt {attempt}")),
    );
    info!(attempt, delay_ms = delay.as_millis() as u64, "recognition restart scheduled");

    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!("no tokio runtime — restarting recognition without backoff");
            restart_now(shared, inner);
            return;
        }
    };

    let token = inner.restart_token.clone();
    let task_shared = Arc::clone(shared);
    inner.pending_restart = Some(handle.spawn(async move {
        tokio::time::sleep(delay).await;
        let mut inner = task_shared.lock();
        if token.is_cancelled() || !inner.should_listen {
            return;
        }
        inner.pending_restart = None;
        restart_now(&task_shared, &mut inner);
    }));
}

fn restart_now(shared: &Arc<Mutex<Inner>>, inner: &mut Inner) {
    if inner.active {
        debug!("recognition already running, restart skipped");
        return;
    }
    match inner.backend.start() {
        Ok(()) => {
            inner.active = true;
            inner.set_status(ListeningStatus::Listening, None);
            debug!(attempt = inner.attempts, "recognition restarted");
        }
        Err(e) => {
            warn!(error = %e, attempt = inner.attempts, "recognition restart failed");
            schedule_restart(shared, inner);
        }
    }
}

impl Inner {
    fn cancel_restart(&mut self) {
        self.restart_token.cancel();
        self.restart_token = CancelToken::new();
        if let Some(pending) = self.pending_restart.take() {
            pending.abort();
        }
    }

    fn record_transcript(&mut self, text: String, is_final: bool, confidence: Option<f32>) {
        let id = format!("rec-{}", self.next_utterance);
        let kind = if is_final {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !self.committed.is_empty() {
                    self.committed.push(' ');
                }
                self.committed.push_str(trimmed);
            }
            self.interim.clear();
            self.next_utterance += 1;
            SegmentKind::Final
        } else {
            self.interim = text.trim().to_string();
            SegmentKind::Partial
        };

        let seq = self.seq;
        self.seq += 1;
        let _ = self.transcript_tx.send(TranscriptEvent {
            seq,
            segments: vec![TranscriptSegment {
                id,
                text,
                kind,
                confidence,
            }],
        });
    }

    fn set_status(&mut self, status: ListeningStatus, detail: Option<String>) {
        self.status = status;
        let _ = self.status_tx.send(ListeningStatusEvent { status, detail });
    }
}
