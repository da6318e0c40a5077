use std::path::{Path, PathBuf};

use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

/// What a finished run leaves behind for a follow-up run on the same thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub thread: String,
    pub source_url: String,
}

/// One JSON file per correlation key
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

pub fn default_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("ytsum")
        .join("sessions")
}

/// Fresh correlation key for a run started without `--thread`
pub fn new_thread_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn check_key(thread: &str) -> Result<()> {
    if thread.is_empty() || !thread.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        bail!("invalid thread key {thread:?}: use letters, digits, '-' or '_'");
    }
    Ok(())
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, thread: &str) -> PathBuf {
        self.dir.join(format!("{thread}.json"))
    }

    /// Record the URL a thread's run was started with
    pub fn remember(&self, thread: &str, source_url: &str) -> Result<Session> {
        check_key(thread)?;
        std::fs::create_dir_all(&self.dir)?;
        let session = Session {
            thread: thread.to_string(),
            source_url: source_url.to_string(),
        };
        let path = self.path(thread);
        std::fs::write(&path, serde_json::to_string_pretty(&session)?)?;
        debug!("Saved session: {}", path.display());
        Ok(session)
    }

    /// Look up a thread's session, if one was recorded
    pub fn recall(&self, thread: &str) -> Option<Session> {
        check_key(thread).ok()?;
        let path = self.path(thread);
        let data = std::fs::read_to_string(&path).ok()?;
        let session: Session = serde_json::from_str(&data).ok()?;
        debug!("Session hit: {}", path.display());
        Some(session)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(default_dir())
    }
}
