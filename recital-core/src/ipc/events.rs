//! Event types broadcast to the host application.
//!
//! ## Channels
//!
//! | Event | Source | Subscribe with |
//! |-------|--------|----------------|
//! | `PlaybackStatusEvent` | `PlaybackScheduler` | `subscribe_status()` |
//! | `TranscriptEvent` | `RecognitionSession` | `subscribe_transcripts()` |
//! | `ListeningStatusEvent` | `RecognitionSession` | `subscribe_status()` |
//!
//! Field names serialise in camelCase and enum values in lowercase so the
//! host can forward them to a web front end unchanged.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Playback status events
// ---------------------------------------------------------------------------

/// Emitted whenever the playback scheduler changes state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatusEvent {
    pub status: PlaybackStatus,
    /// Sentence the event refers to, when there is one.
    pub sentence_index: Option<usize>,
    /// Optional human-readable detail (e.g. backend error code).
    pub detail: Option<String>,
}

/// Externally visible scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing queued or speaking.
    Idle,
    /// The backend reported `start` for the in-flight utterance.
    Speaking,
    /// A `speak_all` sequence ran past its last sentence.
    Finished,
    /// `stop()` was called.
    Stopped,
    /// The backend reported an error; nothing is retried.
    Error,
}

// ---------------------------------------------------------------------------
// Transcript events
// ---------------------------------------------------------------------------

/// Emitted when the recognition backend delivers text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEvent {
    /// Monotonically increasing event sequence number.
    pub seq: u64,
    /// One or more transcript segments from this recognition result.
    pub segments: Vec<TranscriptSegment>,
}

/// A single recognised speech segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    /// Unique ID for this utterance (stable across partial→final updates).
    pub id: String,
    /// Recognised text.
    pub text: String,
    /// Whether this is a streaming partial or a committed final.
    pub kind: SegmentKind,
    /// Recogniser confidence in [0.0, 1.0], if available.
    pub confidence: Option<f32>,
}

/// Distinguishes streaming partials from committed finals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Streaming partial — text may change on the next event with the same `id`.
    Partial,
    /// Committed final — the utterance is complete and will not change.
    Final,
}

// ---------------------------------------------------------------------------
// Listening status events
// ---------------------------------------------------------------------------

/// Emitted when the recognition session changes state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningStatusEvent {
    pub status: ListeningStatus,
    /// Optional human-readable detail (e.g. error code, restart attempt).
    pub detail: Option<String>,
}

/// Current state of the recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListeningStatus {
    /// Never started.
    Idle,
    /// Backend session is live.
    Listening,
    /// Backend ended unexpectedly; a restart is scheduled.
    Restarting,
    /// Stopped by the caller (or restarts exhausted).
    Stopped,
    /// Fatal backend error — the caller must start again explicitly.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_event_serializes_with_camel_case_and_lowercase_kind() {
        let event = TranscriptEvent {
            seq: 7,
            segments: vec![TranscriptSegment {
                id: "utt-1".into(),
                text: "hello".into(),
                kind: SegmentKind::Partial,
                confidence: Some(0.91),
            }],
        };

        let json = serde_json::to_value(&event).expect("serialize transcript event");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["segments"][0]["id"], "utt-1");
        assert_eq!(json["segments"][0]["kind"], "partial");
        let conf = json["segments"][0]["confidence"]
            .as_f64()
            .expect("confidence should serialize as number");
        assert!((conf - 0.91).abs() < 1e-5);

        let round_trip: TranscriptEvent =
            serde_json::from_value(json).expect("deserialize transcript event");
        assert_eq!(round_trip.segments[0].kind, SegmentKind::Partial);
    }

    #[test]
    fn playback_status_event_serializes_with_camel_case_fields() {
        let event = PlaybackStatusEvent {
            status: PlaybackStatus::Speaking,
            sentence_index: Some(2),
            detail: None,
        };

        let json = serde_json::to_value(&event).expect("serialize playback event");
        assert_eq!(json["status"], "speaking");
        assert_eq!(json["sentenceIndex"], 2);
        assert!(json["detail"].is_null());
    }

    #[test]
    fn listening_status_rejects_non_lowercase_values() {
        let err = serde_json::from_str::<ListeningStatus>(r#""Listening""#);
        assert!(err.is_err(), "expected invalid casing to fail");

        let ok: ListeningStatus =
            serde_json::from_str(r#""restarting""#).expect("lowercase status parses");
        assert_eq!(ok, ListeningStatus::Restarting);
    }
}
