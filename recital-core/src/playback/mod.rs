//! Voice-synthesis playback.
//!
//! The `SynthesisBackend` trait decouples the scheduler from any specific
//! speech engine (platform TTS, a cloud voice, the recording stub used in
//! tests). The scheduler is the only caller of the backend.
//!
//! ## Event flow
//!
//! ```text
//! PlaybackScheduler ──request(Utterance)──► SynthesisBackend
//!        ▲                                        │
//!        └──── handle_event(id, Start|End|Error) ─┘   (asynchronously)
//! ```

pub mod scheduler;
pub mod stub;

pub use scheduler::PlaybackScheduler;

use serde::{Deserialize, Serialize};

use crate::config::VoiceSettings;
use crate::error::Result;

/// Identifies one synthesis request. Events carrying any id other than the
/// in-flight one are stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtteranceId(pub u64);

/// Everything the backend needs to speak one piece of text.
///
/// `voice` is a snapshot taken when the request was built; later voice
/// changes only affect later requests.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub voice: VoiceSettings,
    pub sentence_index: Option<usize>,
}

/// Lifecycle callbacks reported by the backend for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Start,
    End,
    /// Backend-specific error code (e.g. `"synthesis-failed"`).
    Error(String),
}

/// Contract for voice-synthesis backends.
///
/// Implementations must deliver [`SynthesisEvent`]s by calling
/// [`PlaybackScheduler::handle_event`] from outside `request`/`cancel`
/// (another task, thread, or a later turn of the host's event loop);
/// calling back synchronously from inside either method deadlocks.
pub trait SynthesisBackend: Send + 'static {
    /// Begin speaking `utterance`. Returns once the request is queued.
    ///
    /// # Errors
    /// Returns an error if the backend cannot accept the request at all.
    fn request(&mut self, utterance: &Utterance) -> Result<()>;

    /// Abort whatever is currently being spoken.
    fn cancel(&mut self);
}
