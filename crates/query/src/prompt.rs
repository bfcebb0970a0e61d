//! The "join our community" prompt and the local flag that silences it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// The prompt is raised on every Nth successful search.
pub const SEARCHES_PER_PROMPT: u64 = 3;

/// The prompt is also raised after this long without one.
pub const IDLE_PROMPT_AFTER: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum FlagsError {
    #[error("flags io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("flags file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FlagsData {
    #[serde(default)]
    email_submitted: bool,
}

/// Client-local persisted flags. Backed by a JSON file, or memory only.
#[derive(Debug, Clone, Default)]
pub struct LocalFlags {
    path: Option<PathBuf>,
    data: FlagsData,
}

impl LocalFlags {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load flags from `path`. A missing file means no flags are set.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, FlagsError> {
        let path = path.into();
        let data = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FlagsData::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path),
            data,
        })
    }

    pub fn email_submitted(&self) -> bool {
        self.data.email_submitted
    }

    pub fn mark_email_submitted(&mut self) -> Result<(), FlagsError> {
        self.data.email_submitted = true;
        self.save()
    }

    fn save(&self) -> Result<(), FlagsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec(&self.data)?)?;
        Ok(())
    }
}

/// Decides when to show the prompt.
#[derive(Debug)]
pub struct PromptTracker {
    successful_searches: u64,
    showing: bool,
    last_armed: Instant,
}

impl PromptTracker {
    pub fn new(now: Instant) -> Self {
        Self {
            successful_searches: 0,
            showing: false,
            last_armed: now,
        }
    }

    /// Count a successful search. Returns true when this search raised the
    /// prompt.
    pub fn record_search(&mut self, flags: &LocalFlags) -> bool {
        if flags.email_submitted() {
            return false;
        }
        self.successful_searches += 1;
        if self.successful_searches % SEARCHES_PER_PROMPT == 0 {
            debug!(searches = self.successful_searches, "raising prompt");
            self.showing = true;
            return true;
        }
        false
    }

    /// Raise the prompt if the idle timer ran out. Returns true when raised.
    pub fn poll_idle(&mut self, flags: &LocalFlags, now: Instant) -> bool {
        if self.showing || flags.email_submitted() {
            return false;
        }
        if now.duration_since(self.last_armed) >= IDLE_PROMPT_AFTER {
            self.showing = true;
            return true;
        }
        false
    }

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    /// Close the prompt and restart the idle timer.
    pub fn dismiss(&mut self, now: Instant) {
        self.showing = false;
        self.last_armed = now;
    }

    pub fn successful_searches(&self) -> u64 {
        self.successful_searches
    }
}

/// Open flags at `path`, falling back to memory-only flags when the file is
/// unreadable.
pub fn open_or_default(path: impl Into<PathBuf>) -> LocalFlags {
    let path = path.into();
    match LocalFlags::open(&path) {
        Ok(flags) => flags,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable flags file");
            LocalFlags::in_memory()
        }
    }
}
