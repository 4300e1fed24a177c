//! `RecordingVoice` — backend that records calls instead of producing audio.
//!
//! Used by tests and the benchmark binary to drive the scheduler without a
//! speech engine. Events are fed back manually through
//! `PlaybackScheduler::handle_event`.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{SynthesisBackend, Utterance};
use crate::error::{RecitalError, Result};

/// One call observed by the stub.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceCall {
    Request(Utterance),
    Cancel,
}

/// Shared view of the calls a `RecordingVoice` has received.
#[derive(Debug, Clone, Default)]
pub struct VoiceLog(Arc<Mutex<Vec<VoiceCall>>>);

impl VoiceLog {
    pub fn calls(&self) -> Vec<VoiceCall> {
        self.0.lock().clone()
    }

    pub fn requests(&self) -> Vec<Utterance> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                VoiceCall::Request(u) => Some(u.clone()),
                VoiceCall::Cancel => None,
            })
            .collect()
    }

    pub fn last_request(&self) -> Option<Utterance> {
        self.requests().pop()
    }

    pub fn cancel_count(&self) -> usize {
        self.0
            .lock()
            .iter()
            .filter(|c| matches!(c, VoiceCall::Cancel))
            .count()
    }
}

/// Synthesis backend that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingVoice {
    log: VoiceLog,
    fail_requests: bool,
}

impl RecordingVoice {
    pub fn new() -> (Self, VoiceLog) {
        let voice = Self::default();
        let log = voice.log.clone();
        (voice, log)
    }

    /// A stub whose every `request` fails, for error-path tests.
    pub fn failing() -> (Self, VoiceLog) {
        let (mut voice, log) = Self::new();
        voice.fail_requests = true;
        (voice, log)
    }
}

impl SynthesisBackend for RecordingVoice {
    fn request(&mut self, utterance: &Utterance) -> Result<()> {
        debug!(id = utterance.id.0, text = %utterance.text, "RecordingVoice::request");
        self.log.0.lock().push(VoiceCall::Request(utterance.clone()));
        if self.fail_requests {
            return Err(RecitalError::Synthesis("stub configured to fail".into()));
        }
        Ok(())
    }

    fn cancel(&mut self) {
        debug!("RecordingVoice::cancel");
        self.log.0.lock().push(VoiceCall::Cancel);
    }
}
