//! Word lookup seam.
//!
//! Definitions and translations come from an injected [`DictionaryService`].
//! [`LookupClient`] owns the service, enforces its init/dispose lifecycle
//! and cleans the clicked word before the service sees it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RecitalError, Result};

/// What a dictionary knows about one word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// A dictionary or translation provider.
pub trait DictionaryService {
    /// Load whatever the service needs before the first lookup.
    ///
    /// # Errors
    /// Returns an error if the service cannot be made ready.
    fn init(&mut self) -> Result<()>;

    /// Look up an already-cleaned word. `Ok(None)` means "not found".
    ///
    /// # Errors
    /// Returns an error if the service fails.
    fn lookup(&mut self, word: &str) -> Result<Option<LookupEntry>>;

    /// Release resources. No lookups follow.
    fn dispose(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LookupState {
    Created,
    Ready,
    Disposed,
}

#[derive(Debug)]
pub struct LookupClient<S: DictionaryService> {
    service: S,
    state: LookupState,
}

impl<S: DictionaryService> LookupClient<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: LookupState::Created,
        }
    }

    /// Initialise the service. Repeated calls are no-ops; a disposed client
    /// cannot be revived.
    ///
    /// # Errors
    /// `LookupUnavailable` after `dispose`, or the service's init failure.
    pub fn init(&mut self) -> Result<()> {
        match self.state {
            LookupState::Ready => Ok(()),
            LookupState::Disposed => Err(RecitalError::LookupUnavailable),
            LookupState::Created => {
                self.service.init()?;
                self.state = LookupState::Ready;
                info!("lookup service ready");
                Ok(())
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == LookupState::Ready
    }

    /// Clean `raw` and look it up. A raw string with no word in it yields
    /// `Ok(None)` without calling the service.
    ///
    /// # Errors
    /// `LookupUnavailable` before `init` or after `dispose`; otherwise the
    /// service's own failure.
    pub fn lookup(&mut self, raw: &str) -> Result<Option<LookupEntry>> {
        if self.state != LookupState::Ready {
            return Err(RecitalError::LookupUnavailable);
        }
        let word = clean_lookup_word(raw);
        if word.is_empty() {
            return Ok(None);
        }
        debug!(%word, "dictionary lookup");
        self.service.lookup(&word)
    }

    pub fn dispose(&mut self) {
        if self.state == LookupState::Ready {
            self.service.dispose();
        }
        self.state = LookupState::Disposed;
    }
}

impl<S: DictionaryService> Drop for LookupClient<S> {
    fn drop(&mut self) {
        if self.state == LookupState::Ready {
            self.service.dispose();
        }
    }
}

/// Strip surrounding punctuation and lowercase. Inner apostrophes and
/// hyphens survive (`"Don't,"` → `"don't"`).
pub fn clean_lookup_word(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
