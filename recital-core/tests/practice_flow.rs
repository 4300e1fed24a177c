use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use recital_core::config::{PracticeConfig, VoiceSettings};
use recital_core::ipc::events::{ListeningStatus, PlaybackStatus, PlaybackStatusEvent};
use recital_core::matching::{check_completion, MatchMode, Matcher};
use recital_core::playback::stub::{RecordingVoice, VoiceLog};
use recital_core::playback::{SynthesisEvent, UtteranceId};
use recital_core::recognition::{RecognitionBackend, RecognitionErrorCode, RecognitionEvent};
use recital_core::render::RenderToken;
use recital_core::{
    segment_sentences, Advance, PlaybackScheduler, PracticeController, ProgressRenderer,
    RecognitionSession, RecitalError, RestartPolicy,
};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

struct CountingRecognizer {
    starts: Arc<AtomicUsize>,
}

impl RecognitionBackend for CountingRecognizer {
    fn start(&mut self) -> Result<(), RecitalError> {
        self.starts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) {}
}

fn scheduler(pause: Duration) -> (PlaybackScheduler, VoiceLog) {
    let (voice, log) = RecordingVoice::new();
    (
        PlaybackScheduler::new(voice, VoiceSettings::default(), pause),
        log,
    )
}

fn drain_statuses(rx: &mut broadcast::Receiver<PlaybackStatusEvent>) -> Vec<PlaybackStatus> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event.status),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return out,
            Err(TryRecvError::Lagged(_)) => continue,
        }
    }
}

fn finish(scheduler: &PlaybackScheduler, id: UtteranceId) {
    scheduler.handle_event(id, SynthesisEvent::Start);
    scheduler.handle_event(id, SynthesisEvent::End);
}

#[test]
fn two_sentences_are_spoken_strictly_in_order() {
    let (scheduler, log) = scheduler(Duration::ZERO);
    let mut rx = scheduler.subscribe_status();

    scheduler
        .speak_all(segment_sentences("Hi. Bye."), 0)
        .expect("speak_all");
    assert_eq!(log.requests().len(), 1, "second waits for the first's end");

    let first = log.last_request().expect("first request");
    assert_eq!(first.text, "Hi.");
    finish(&scheduler, first.id);

    let second = log.last_request().expect("second request");
    assert_eq!(second.text, "Bye.");
    finish(&scheduler, second.id);

    assert_eq!(log.requests().len(), 2);
    assert!(!scheduler.is_sequencing());
    assert_eq!(
        drain_statuses(&mut rx),
        vec![
            PlaybackStatus::Speaking,
            PlaybackStatus::Speaking,
            PlaybackStatus::Finished
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_mid_sequence_issues_nothing_further() {
    let (scheduler, log) = scheduler(Duration::from_millis(300));
    scheduler
        .speak_all(segment_sentences("One. Two. Three."), 0)
        .expect("speak_all");

    let first = log.last_request().expect("first");
    scheduler.handle_event(first.id, SynthesisEvent::Start);
    scheduler.stop();

    // A late end from the cancelled utterance must not revive the sequence.
    scheduler.handle_event(first.id, SynthesisEvent::End);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(log.requests().len(), 1);
    assert!(!scheduler.is_speaking());
    assert_eq!(log.cancel_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_during_pause_cancels_the_timer() {
    let (scheduler, log) = scheduler(Duration::from_millis(300));
    scheduler
        .speak_all(segment_sentences("One. Two. Three."), 0)
        .expect("speak_all");

    let first = log.last_request().expect("first");
    finish(&scheduler, first.id);
    tokio::time::sleep(Duration::from_millis(100)).await;
    scheduler.stop();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(log.requests().len(), 1);
}

#[test]
fn jump_while_speaking_cancels_and_starts_target() {
    let (scheduler, log) = scheduler(Duration::ZERO);
    scheduler
        .speak_all(segment_sentences("Zero. One. Two."), 0)
        .expect("speak_all");
    let first = log.last_request().expect("first");
    scheduler.handle_event(first.id, SynthesisEvent::Start);

    scheduler.jump_to_sentence(2).expect("jump");

    let jumped = log.last_request().expect("jumped");
    assert_eq!(jumped.sentence_index, Some(2));
    assert_eq!(log.cancel_count(), 1);

    // The cancelled utterance's end is ignored; sentence 2 is still live.
    scheduler.handle_event(first.id, SynthesisEvent::End);
    assert_eq!(scheduler.in_flight(), Some(jumped.id));
}

#[test]
fn dictation_completion_advances_and_cues_next_sentence() {
    let text = "The cat sat. The dog ran.";
    let sentences = segment_sentences(text);
    let (scheduler, log) = scheduler(Duration::ZERO);
    let mut ctl = PracticeController::new(
        MatchMode::Character,
        sentences.clone(),
        Some(scheduler.clone()),
        true,
    );
    ctl.activate();
    ctl.set_active_sentence(0).expect("active");

    let target = &sentences[0].text;
    assert!(!check_completion(target, "the cat"));
    assert!(check_completion(target, "the cat sat"));

    let renderer = ProgressRenderer::default();
    let display = renderer.render(MatchMode::Character, target, "the c", Some(4));
    assert_eq!(display.revealed_count(), 4);
    assert_eq!(display.hidden_count(), 4, "cursor sits on the fifth letter");

    assert_eq!(ctl.on_complete(), Advance::Advanced(1));
    let cue = log.last_request().expect("cue");
    assert_eq!(cue.text, "The dog ran.");
    assert_eq!(ctl.on_complete(), Advance::Finished);
    assert_eq!(ctl.active_sentence_id(), None);
}

#[tokio::test(start_paused = true)]
async fn recitation_flow_with_recognition() {
    let config = PracticeConfig::default();
    let sentences = segment_sentences("The cat sat. Birds fly high.");
    let (voice, log) = RecordingVoice::new();
    let scheduler = PlaybackScheduler::from_config(voice, &config);

    let starts = Arc::new(AtomicUsize::new(0));
    let session = RecognitionSession::new(
        CountingRecognizer {
            starts: Arc::clone(&starts),
        },
        RestartPolicy::default(),
    );
    let mut status_rx = session.subscribe_status();

    let mut ctl = PracticeController::new(MatchMode::Word, sentences, Some(scheduler), true);
    let matcher = MatchMode::Word.matcher(config.partial_threshold);
    ctl.set_active_sentence(0).expect("active");
    session.start_listening().expect("listen");

    session.handle_event(RecognitionEvent::Transcript {
        text: "the car".into(),
        is_final: false,
        confidence: None,
    });
    let target = ctl.active_sentence().expect("active").text.clone();
    let partial = matcher.evaluate(&target, &session.transcript());
    assert!(!partial.complete);
    assert_eq!(partial.correct_units, 1);

    let display = ProgressRenderer::new(config.partial_threshold).render(
        MatchMode::Word,
        &target,
        &session.transcript(),
        Some(2),
    );
    assert!(display
        .iter()
        .any(|t| matches!(t, RenderToken::Revealed { text, .. } if text == "car")));

    // Silence is not an error, and the platform ending the session is
    // recovered from after a backoff.
    session.handle_event(RecognitionEvent::Error(RecognitionErrorCode::NoSpeech));
    session.handle_event(RecognitionEvent::Ended);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(starts.load(Ordering::Relaxed), 2);

    session.handle_event(RecognitionEvent::Transcript {
        text: "the cat sat".into(),
        is_final: true,
        confidence: Some(0.92),
    });
    assert!(matcher.is_complete(&target, &session.transcript()));

    assert_eq!(ctl.on_complete(), Advance::Advanced(1));
    session.clear_transcript();
    assert_eq!(log.last_request().map(|u| u.sentence_index), Some(Some(1)));

    session.stop_listening();
    let mut statuses = Vec::new();
    while let Ok(event) = status_rx.try_recv() {
        statuses.push(event.status);
    }
    assert_eq!(statuses.first(), Some(&ListeningStatus::Listening));
    assert!(statuses.contains(&ListeningStatus::Restarting));
    assert_eq!(statuses.last(), Some(&ListeningStatus::Stopped));
}
