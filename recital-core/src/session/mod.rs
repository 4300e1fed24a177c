//! Practice session controller.
//!
//! Tracks which sentence is the active practice target and moves on when
//! the caller reports that the matcher saw the sentence completed. Matching
//! itself happens elsewhere; the controller only reacts to completion.

use tracing::{debug, info, warn};

use crate::{
    error::{RecitalError, Result},
    matching::MatchMode,
    playback::scheduler::PlaybackScheduler,
    text::{Sentence, SentenceId},
};

/// Outcome of [`PracticeController::on_complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The active sentence moved to this index.
    Advanced(usize),
    /// The last sentence was completed; nothing is active any more.
    Finished,
    /// No sentence was active, so there was nothing to complete.
    Inactive,
}

pub struct PracticeController {
    mode: MatchMode,
    sentences: Vec<Sentence>,
    active: Option<usize>,
    scheduler: Option<PlaybackScheduler>,
    auto_cue: bool,
}

impl std::fmt::Debug for PracticeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeController")
            .field("mode", &self.mode)
            .field("sentences", &self.sentences.len())
            .field("active", &self.active)
            .field("auto_cue", &self.auto_cue)
            .finish()
    }
}

impl PracticeController {
    pub fn new(
        mode: MatchMode,
        sentences: Vec<Sentence>,
        scheduler: Option<PlaybackScheduler>,
        auto_cue: bool,
    ) -> Self {
        Self {
            mode,
            sentences,
            active: None,
            scheduler,
            auto_cue,
        }
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Replace the document. Any active sentence is cleared.
    pub fn load(&mut self, sentences: Vec<Sentence>) {
        self.sentences = sentences;
        self.active = None;
    }

    pub fn set_auto_cue(&mut self, enabled: bool) {
        self.auto_cue = enabled;
    }

    /// Enter practice mode with nothing selected yet.
    pub fn activate(&mut self) {
        self.active = None;
        debug!(mode = ?self.mode, "practice activated");
    }

    /// Select the sentence the user is practising.
    ///
    /// # Errors
    /// `SentenceOutOfRange` when `index` is past the end of the document.
    pub fn set_active_sentence(&mut self, index: usize) -> Result<()> {
        if index >= self.sentences.len() {
            return Err(RecitalError::SentenceOutOfRange {
                index,
                len: self.sentences.len(),
            });
        }
        self.active = Some(index);
        Ok(())
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_sentence(&self) -> Option<&Sentence> {
        self.active.and_then(|i| self.sentences.get(i))
    }

    /// Key under which the caller persists the candidate for the active
    /// sentence.
    pub fn active_sentence_id(&self) -> Option<SentenceId> {
        self.active_sentence().map(Sentence::id)
    }

    /// The active sentence was completed. Advance and, when enabled, cue
    /// playback of the new sentence.
    pub fn on_complete(&mut self) -> Advance {
        let Some(current) = self.active else {
            return Advance::Inactive;
        };

        let next = current + 1;
        if next >= self.sentences.len() {
            self.active = None;
            info!(completed = current, "practice finished");
            return Advance::Finished;
        }

        self.active = Some(next);
        debug!(from = current, to = next, "practice advanced");
        self.cue(next);
        Advance::Advanced(next)
    }

    /// Play sentence `index` as an audio cue. A live read-aloud sequence over
    /// the same document is moved to the new sentence; otherwise the
    /// sentence is spoken alone. Cue failures are logged and do not block
    /// advancing.
    fn cue(&self, index: usize) {
        if !self.auto_cue {
            return;
        }
        let Some(scheduler) = &self.scheduler else {
            return;
        };
        let same_document = *scheduler.sentences() == *self.sentences;
        let outcome = if scheduler.is_sequencing() && same_document {
            scheduler.jump_to_sentence(index)
        } else {
            let text = &self.sentences[index].text;
            scheduler.speak(text, Some(index)).map(|_| ())
        };
        if let Err(e) = outcome {
            warn!(index, error = %e, "audio cue failed");
        }
    }
}
