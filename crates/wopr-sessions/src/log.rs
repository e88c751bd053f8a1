//! The append-only conversation log (§4.2): one JSONL file per session.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{SessionError, SessionResult};
use crate::types::{ConversationEntry, EntryKind};

/// Append-only conversation history, keyed by session name.
///
/// Each session gets a `{name}.jsonl` file under `dir`; every entry is
/// one JSON-encoded line. The log is the authority for session history
/// and is never rewritten in place, even when a session is destroyed.
pub struct ConversationLog {
    dir: PathBuf,
}

impl ConversationLog {
    /// Construct a log rooted at `dir`. The directory is created lazily
    /// on first append.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, session: &str) -> PathBuf {
        self.dir.join(format!("{session}.jsonl"))
    }

    /// `append(entry)`: write one JSON-encoded line to `session`'s log.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LogIo`] if the directory or file cannot
    /// be created or written.
    pub fn append(&self, session: &str, entry: &ConversationEntry) -> SessionResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| SessionError::LogIo {
            session: session.to_string(),
            source,
        })?;

        let line = serde_json::to_string(entry).expect("ConversationEntry always serializes");
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(session))
            .map_err(|source| SessionError::LogIo {
                session: session.to_string(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| SessionError::LogIo {
            session: session.to_string(),
            source,
        })
    }

    /// Convenience wrapper: append a `message`-typed entry without
    /// triggering a model call. Used by external platform adapters to
    /// capture ambient context.
    pub fn log_message(
        &self,
        session: &str,
        from: &str,
        content: &str,
        kind: EntryKind,
    ) -> SessionResult<()> {
        self.append(session, &ConversationEntry::new(from, content, kind))
    }

    /// `read(session, limit?)`: return at most the last `limit` entries,
    /// tolerating blank lines and skipping (and logging) lines that fail
    /// to parse.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LogIo`] if the file exists but cannot be
    /// read.
    pub fn read(&self, session: &str, limit: Option<usize>) -> SessionResult<Vec<ConversationEntry>> {
        let path = self.path_for(session);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&path).map_err(|source| SessionError::LogIo {
            session: session.to_string(),
            source,
        })?;

        let mut entries = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ConversationEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    tracing::warn!(session, %error, "skipping malformed conversation log line");
                }
            }
        }

        if let Some(limit) = limit
            && entries.len() > limit
        {
            entries = entries.split_off(entries.len() - limit);
        }

        Ok(entries)
    }

    /// The directory this log is rooted at.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_session_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path());
        assert!(log.read("nobody", None).unwrap().is_empty());
    }

    #[test]
    fn test_append_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path());

        log.log_message("alice", "alice", "hi", EntryKind::Message).unwrap();
        log.log_message("alice", "bot", "hello there", EntryKind::Response).unwrap();

        let entries = log.read("alice", None).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "hi");
        assert_eq!(entries[1].kind, EntryKind::Response);
    }

    #[test]
    fn test_read_applies_limit_to_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path());

        for i in 0..5 {
            log.log_message("alice", "alice", &format!("msg-{i}"), EntryKind::Message)
                .unwrap();
        }

        let entries = log.read("alice", Some(2)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content, "msg-3");
        assert_eq!(entries[1].content, "msg-4");
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path());
        log.log_message("alice", "alice", "good", EntryKind::Message).unwrap();

        let path = dir.path().join("alice.jsonl");
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        log.log_message("alice", "alice", "also good", EntryKind::Message).unwrap();

        let entries = log.read("alice", None).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_append_is_append_only_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        let log = ConversationLog::new(dir.path());
        log.log_message("alice", "alice", "one", EntryKind::Message).unwrap();
        log.log_message("alice", "alice", "two", EntryKind::Message).unwrap();

        let entries = log.read("alice", None).unwrap();
        assert_eq!(entries.iter().map(|e| e.content.as_str()).collect::<Vec<_>>(), vec!["one", "two"]);
    }
}
