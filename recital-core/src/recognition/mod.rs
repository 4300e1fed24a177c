//! Continuous voice recognition.
//!
//! The `RecognitionBackend` trait decouples the session logic from any
//! specific recogniser. Only [`RecognitionSession`] calls the backend; the
//! backend reports results and lifecycle changes back through
//! [`RecognitionSession::handle_event`].
//!
//! Continuous recognisers end on their own (silence timeouts, platform
//! limits). The session restarts them while the caller still wants to
//! listen, with bounded exponential backoff (see [`RestartPolicy`]).

pub mod restart;
pub mod session;

pub use restart::RestartPolicy;
pub use session::RecognitionSession;

use std::fmt;

use crate::error::Result;

/// Error codes reported by recognition backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    /// Nothing was heard for a while. Not an error for continuous listening.
    NoSpeech,
    /// Microphone could not be opened.
    AudioCapture,
    /// Microphone permission denied.
    NotAllowed,
    /// The recognition service itself is unavailable to this client.
    ServiceNotAllowed,
    Aborted,
    Network,
    Other(String),
}

impl RecognitionErrorCode {
    /// Map a backend's textual code (`"no-speech"`, `"not-allowed"`, …).
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "aborted" => Self::Aborted,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::Aborted => "aborted",
            Self::Network => "network",
            Self::Other(code) => code,
        }
    }

    /// Fatal codes end the session; no automatic restart follows.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::AudioCapture | Self::NotAllowed | Self::ServiceNotAllowed
        )
    }

    /// Codes that are dropped without surfacing anything.
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::NoSpeech)
    }
}

impl fmt::Display for RecognitionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callbacks from a recognition backend.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Transcript {
        text: String,
        is_final: bool,
        confidence: Option<f32>,
    },
    Error(RecognitionErrorCode),
    /// The backend session ended (expectedly or not).
    Ended,
}

/// Contract for continuous recognition backends.
///
/// As with synthesis, events must be delivered from outside `start`/`stop`.
pub trait RecognitionBackend: Send + 'static {
    /// Open a continuous recognition session.
    ///
    /// # Errors
    /// Returns an error if the session cannot be opened.
    fn start(&mut self) -> Result<()>;

    /// Close the current session, if any.
    fn stop(&mut self);
}
