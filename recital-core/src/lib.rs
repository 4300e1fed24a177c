//! # recital-core
//!
//! Core of a read-aloud, dictation and recitation practice tool.
//!
//! ## Architecture
//!
//! ```text
//! raw text → segment_sentences → [Sentence]
//!                                    │
//!            ┌───────────────────────┼─────────────────────────┐
//!            ▼                       ▼                         ▼
//!   PlaybackScheduler        PracticeController        RecognitionSession
//!   (SynthesisBackend)       (active sentence)         (RecognitionBackend)
//!            │                       ▲                         │
//!   PlaybackStatusEvent    Matcher::is_complete       TranscriptEvent
//!                                    │                         │
//!                     candidate ─────┴──► ProgressRenderer ◄───┘
//! ```
//!
//! Backends are injected. Their callbacks are fed back through
//! `handle_event`, and state changes are broadcast on tokio channels.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod ipc;
pub mod lookup;
pub mod matching;
pub mod playback;
pub mod recognition;
pub mod render;
pub mod session;
pub mod text;

// Convenience re-exports for downstream crates
pub use config::{PracticeConfig, VoiceSettings};
pub use error::{RecitalError, Result};
pub use ipc::events::{
    ListeningStatus, ListeningStatusEvent, PlaybackStatus, PlaybackStatusEvent, TranscriptEvent,
    TranscriptSegment,
};
pub use lookup::{DictionaryService, LookupClient, LookupEntry};
pub use matching::{MatchMode, MatchResult, Matcher, Verdict};
pub use playback::{scheduler::PlaybackScheduler, SynthesisBackend, SynthesisEvent, UtteranceId};
pub use recognition::{RecognitionBackend, RecognitionEvent, RecognitionSession, RestartPolicy};
pub use render::{ProgressDisplay, ProgressRenderer, RenderToken};
pub use session::{Advance, PracticeController};
pub use text::{segment_sentences, Sentence, SentenceId};
