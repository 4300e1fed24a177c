//! `PlaybackScheduler` — sentence-sequenced speech with cancellation.
//!
//! ## States
//!
//! ```text
//! Idle ──speak / speak_all──► Speaking(i) ──End──► (pause) ──► Speaking(i+1) … ──► Idle
//!   ▲                             │
//!   └──────────── stop() ─────────┘
//! ```
//!
//! At most one utterance is ever in flight. Sequencing is driven purely by
//! backend `End` events: the next sentence is scheduled from inside the
//! previous one's `End`, after `pause`, on a tokio timer task. Every
//! scheduled continuation carries a [`SequenceStep`] snapshot including the
//! sequence's [`CancelToken`]; `stop()`, `speak()` and `jump_to_sentence()`
//! cancel that token so a late timer or a late `End` can never start another
//! utterance.
//!
//! `PlaybackScheduler` is a cheap clonable handle (`Arc` + `parking_lot::Mutex`)
//! so it can be shared with the practice controller and the host's event
//! forwarding tasks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{SynthesisBackend, SynthesisEvent, Utterance, UtteranceId};
use crate::{
    cancel::CancelToken,
    config::{PracticeConfig, VoiceSettings},
    error::{RecitalError, Result},
    ipc::events::{PlaybackStatus, PlaybackStatusEvent},
    text::Sentence,
};

/// Broadcast channel capacity for status events.
const BROADCAST_CAP: usize = 64;

/// State handed to one sequencing step. Captured when the step is
/// scheduled, never re-read from the scheduler afterwards.
#[derive(Debug, Clone)]
struct SequenceStep {
    token: CancelToken,
    cursor: usize,
    voice: VoiceSettings,
}

/// The live `speak_all` session.
#[derive(Debug)]
struct Sequence {
    queue: Arc<[Sentence]>,
    cursor: usize,
    token: CancelToken,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: UtteranceId,
    sentence_index: Option<usize>,
}

struct Inner {
    backend: Box<dyn SynthesisBackend>,
    voice: VoiceSettings,
    pause: Duration,
    /// Document used by `jump_to_sentence`; replaced by `speak_all`.
    sentences: Arc<[Sentence]>,
    current_index: Option<usize>,
    in_flight: Option<InFlight>,
    speaking: bool,
    sequence: Option<Sequence>,
    /// Pause timer between two sentences of the live sequence.
    pending_step: Option<JoinHandle<()>>,
    next_utterance: u64,
    warned_no_runtime: bool,
    status_tx: broadcast::Sender<PlaybackStatusEvent>,
}

/// Sequences synthesis requests over a list of sentences.
#[derive(Clone)]
pub struct PlaybackScheduler {
    inner: Arc<Mutex<Inner>>,
    status_tx: broadcast::Sender<PlaybackStatusEvent>,
}

impl std::fmt::Debug for PlaybackScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackScheduler").finish_non_exhaustive()
    }
}

impl PlaybackScheduler {
    /// Create a scheduler that owns `backend`. `pause` is inserted between
    /// sentences of a `speak_all` sequence; zero issues the next sentence
    /// directly from the `End` event.
    pub fn new<B: SynthesisBackend>(backend: B, voice: VoiceSettings, pause: Duration) -> Self {
        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);
        let inner = Inner {
            backend: Box::new(backend),
            voice,
            pause,
            sentences: Arc::from(Vec::new()),
            current_index: None,
            in_flight: None,
            speaking: false,
            sequence: None,
            pending_step: None,
            next_utterance: 0,
            warned_no_runtime: false,
            status_tx: status_tx.clone(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            status_tx,
        }
    }

    pub fn from_config<B: SynthesisBackend>(backend: B, config: &PracticeConfig) -> Self {
        Self::new(backend, config.voice.clone(), config.sentence_pause())
    }

    /// Replace the document used by `jump_to_sentence`. Does not affect a
    /// running sequence until it is restarted.
    pub fn set_sentences(&self, sentences: Vec<Sentence>) {
        let mut inner = self.inner.lock();
        inner.sentences = Arc::from(sentences);
        if inner
            .current_index
            .is_some_and(|i| i >= inner.sentences.len())
        {
            inner.current_index = None;
        }
    }

    pub fn sentences(&self) -> Arc<[Sentence]> {
        Arc::clone(&self.inner.lock().sentences)
    }

    /// Voice used for requests built from now on.
    pub fn set_voice(&self, voice: VoiceSettings) {
        self.inner.lock().voice = voice;
    }

    pub fn voice(&self) -> VoiceSettings {
        self.inner.lock().voice.clone()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.lock().current_index
    }

    /// `true` between the backend's `Start` and `End`/`Error`.
    pub fn is_speaking(&self) -> bool {
        self.inner.lock().speaking
    }

    /// `true` while a `speak_all` sequence is live (including its pauses).
    pub fn is_sequencing(&self) -> bool {
        self.inner.lock().sequence.is_some()
    }

    /// Id of the request the backend is currently working on.
    pub fn in_flight(&self) -> Option<UtteranceId> {
        self.inner.lock().in_flight.map(|f| f.id)
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<PlaybackStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Speak one piece of text, cancelling anything in flight (including a
    /// live sequence). Blank text cancels but issues nothing.
    ///
    /// # Errors
    /// Propagates the backend's `request` failure.
    pub fn speak(&self, text: &str, sentence_index: Option<usize>) -> Result<Option<UtteranceId>> {
        let mut inner = self.inner.lock();
        inner.cancel_current();
        if let Some(index) = sentence_index {
            inner.current_index = Some(index);
        }
        if text.trim().is_empty() {
            debug!(?sentence_index, "speak called with blank text — nothing issued");
            return Ok(None);
        }
        let voice = inner.voice.clone();
        inner.issue(text, sentence_index, voice).map(Some)
    }

    /// Speak `sentences` from `start_index` to the end, one at a time.
    ///
    /// Replaces the document used by `jump_to_sentence`. Blank sentences are
    /// skipped without reaching the backend.
    ///
    /// # Errors
    /// - `RecitalError::SentenceOutOfRange` if `start_index` is past the end.
    /// - The backend's `request` failure for the first sentence.
    pub fn speak_all(&self, sentences: Vec<Sentence>, start_index: usize) -> Result<()> {
        let mut inner = self.inner.lock();
        if start_index >= sentences.len() {
            return Err(RecitalError::SentenceOutOfRange {
                index: start_index,
                len: sentences.len(),
            });
        }
        inner.cancel_current();
        inner.sentences = Arc::from(sentences);
        info!(
            start_index,
            sentences = inner.sentences.len(),
            "starting sentence sequence"
        );
        let step = inner.start_sequence(start_index);
        inner.run_step(step).map(|_| ())
    }

    /// Cancel everything: live sequence, pending pause, in-flight utterance.
    /// After this returns no request of the cancelled work is issued.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        let was_active =
            inner.in_flight.is_some() || inner.sequence.is_some() || inner.pending_step.is_some();
        inner.cancel_current();
        if was_active {
            info!("playback stopped");
        }
        inner.emit(PlaybackStatus::Stopped, inner.current_index, None);
    }

    /// Move to sentence `index`. If something is playing it is cancelled and
    /// `index` is spoken immediately; a live sequence continues from `index`.
    /// The pause between two sentences of a live sequence counts as
    /// speaking, so a jump during the pause also speaks `index` at once.
    ///
    /// # Errors
    /// - `RecitalError::SentenceOutOfRange` if `index` is not in the document.
    pub fn jump_to_sentence(&self, index: usize) -> Result<()> {
        let mut inner = self.inner.lock();
        let len = inner.sentences.len();
        if index >= len {
            return Err(RecitalError::SentenceOutOfRange { index, len });
        }
        inner.current_index = Some(index);

        if inner.sequence.is_some() {
            debug!(index, "jump inside live sequence — restarting sequence");
            inner.cancel_current();
            let step = inner.start_sequence(index);
            return inner.run_step(step).map(|_| ());
        }

        if inner.speaking || inner.in_flight.is_some() {
            debug!(index, "jump while speaking — re-issuing");
            inner.cancel_current();
            let text = inner.sentences[index].text.clone();
            if !text.trim().is_empty() {
                let voice = inner.voice.clone();
                inner.issue(&text, Some(index), voice)?;
            }
        }
        Ok(())
    }

    /// Feed a backend callback for utterance `id` into the state machine.
    pub fn handle_event(&self, id: UtteranceId, event: SynthesisEvent) {
        let mut inner = self.inner.lock();
        let Some(in_flight) = inner.in_flight.filter(|f| f.id == id) else {
            debug!(id = id.0, ?event, "ignoring event for stale utterance");
            return;
        };

        match event {
            SynthesisEvent::Start => {
                inner.speaking = true;
                inner.emit(PlaybackStatus::Speaking, in_flight.sentence_index, None);
            }
            SynthesisEvent::End => {
                inner.in_flight = None;
                inner.speaking = false;
                let next = inner
                    .sequence
                    .as_ref()
                    .filter(|s| !s.token.is_cancelled())
                    .map(|s| SequenceStep {
                        token: s.token.clone(),
                        cursor: s.cursor + 1,
                        voice: inner.voice.clone(),
                    });
                match next {
                    Some(step) => self.schedule_step(&mut inner, step),
                    None => inner.emit(PlaybackStatus::Idle, in_flight.sentence_index, None),
                }
            }
            SynthesisEvent::Error(code) => {
                warn!(id = id.0, code = %code, "synthesis error — utterance aborted");
                inner.in_flight = None;
                inner.speaking = false;
                inner.end_sequence();
                inner.emit(PlaybackStatus::Error, in_flight.sentence_index, Some(code));
            }
        }
    }

    /// Run `step` after the configured pause (or inline when there is no
    /// pause or no tokio runtime to time it).
    fn schedule_step(&self, inner: &mut Inner, step: SequenceStep) {
        if inner.pause.is_zero() {
            inner.advance(step);
            return;
        }

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                if !inner.warned_no_runtime {
                    warn!("no tokio runtime — sentence pause skipped");
                    inner.warned_no_runtime = true;
                }
                inner.advance(step);
                return;
            }
        };

        let shared = Arc::clone(&self.inner);
        let pause = inner.pause;
        debug!(cursor = step.cursor, pause_ms = pause.as_millis() as u64, "next sentence scheduled");
        inner.pending_step = Some(handle.spawn(async move {
            tokio::time::sleep(pause).await;
            let mut inner = shared.lock();
            if step.token.is_cancelled() {
                return;
            }
            inner.pending_step = None;
            inner.advance(step);
        }));
    }
}

impl Inner {
    /// Cancel the live sequence, the pending pause and the in-flight
    /// utterance. Leaves `current_index` alone.
    fn cancel_current(&mut self) {
        self.end_sequence();
        if self.in_flight.take().is_some() {
            self.backend.cancel();
        }
        self.speaking = false;
    }

    fn end_sequence(&mut self) {
        if let Some(sequence) = self.sequence.take() {
            sequence.token.cancel();
        }
        if let Some(pending) = self.pending_step.take() {
            pending.abort();
        }
    }

    /// Install a fresh sequence over the current document.
    fn start_sequence(&mut self, cursor: usize) -> SequenceStep {
        let token = CancelToken::new();
        self.sequence = Some(Sequence {
            queue: Arc::clone(&self.sentences),
            cursor,
            token: token.clone(),
        });
        SequenceStep {
            token,
            cursor,
            voice: self.voice.clone(),
        }
    }

    /// Like `run_step`, reporting failures on the status channel since no
    /// caller is waiting for the result.
    fn advance(&mut self, step: SequenceStep) {
        if let Err(e) = self.run_step(step) {
            warn!(error = %e, "sequence step failed");
        }
    }

    /// Issue the first non-blank sentence at or after `step.cursor`, or
    /// finish the sequence if none is left.
    fn run_step(&mut self, step: SequenceStep) -> Result<Option<UtteranceId>> {
        let Some(sequence) = self.sequence.as_mut() else {
            return Ok(None);
        };
        if !sequence.token.same_as(&step.token) || step.token.is_cancelled() {
            return Ok(None);
        }

        let mut cursor = step.cursor;
        while sequence.queue.get(cursor).is_some_and(Sentence::is_blank) {
            debug!(cursor, "skipping blank sentence");
            cursor += 1;
        }
        sequence.cursor = cursor;

        let Some(sentence) = sequence.queue.get(cursor) else {
            info!(sentences = sequence.queue.len(), "sentence sequence finished");
            self.sequence = None;
            self.emit(PlaybackStatus::Finished, self.current_index, None);
            return Ok(None);
        };

        let text = sentence.text.clone();
        self.issue(&text, Some(cursor), step.voice).map(Some)
    }

    fn issue(
        &mut self,
        text: &str,
        sentence_index: Option<usize>,
        voice: VoiceSettings,
    ) -> Result<UtteranceId> {
        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;
        if let Some(index) = sentence_index {
            self.current_index = Some(index);
        }

        let utterance = Utterance {
            id,
            text: text.to_string(),
            voice,
            sentence_index,
        };
        self.in_flight = Some(InFlight { id, sentence_index });
        debug!(id = id.0, ?sentence_index, "issuing utterance");

        if let Err(e) = self.backend.request(&utterance) {
            warn!(id = id.0, error = %e, "synthesis request rejected");
            self.in_flight = None;
            self.speaking = false;
            self.end_sequence();
            self.emit(PlaybackStatus::Error, sentence_index, Some(e.to_string()));
            return Err(e);
        }
        Ok(id)
    }

    fn emit(&self, status: PlaybackStatus, sentence_index: Option<usize>, detail: Option<String>) {
        let _ = self.status_tx.send(PlaybackStatusEvent {
            status,
            sentence_index,
            detail,
        });
    }
}
