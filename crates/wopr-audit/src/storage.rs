//! Append-only audit trail storage.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::entry::AuditEntry;
use crate::error::{AuditError, AuditResult};

/// An append-only, newline-delimited-JSON audit trail.
///
/// One file (`audit.jsonl`) holds every entry across all sessions, in
/// append order. There is no chain linking or signing — the file is an
/// observability artifact, read by operators and tooling, not a
/// tamper-evidence log.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Construct a log backed by `path`. The file and its parent directory
    /// are created lazily on first [`AuditLog::record`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one entry to the trail.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the directory or file cannot be
    /// created or written.
    pub fn record(&self, entry: &AuditEntry) -> AuditResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Read the whole trail, tolerating blank lines and skipping (and
    /// logging) lines that fail to parse.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file exists but cannot be read.
    pub fn read_all(&self) -> AuditResult<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    tracing::warn!(%error, "skipping malformed audit log line");
                },
            }
        }
        Ok(entries)
    }

    /// Read only the entries concerning `session`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file exists but cannot be read.
    pub fn read_session(&self, session: &str) -> AuditResult<Vec<AuditEntry>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|entry| entry.session.as_deref() == Some(session))
            .collect())
    }

    /// The file this log is backed by.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{AuditAction, AuditOutcome, AuthorizationProof};

    fn sample(session: &str) -> AuditEntry {
        AuditEntry::new(
            Some(session),
            AuditAction::SessionCreated { session: session.to_string() },
            AuthorizationProof::System { reason: "test".into() },
            AuditOutcome::success(),
        )
    }

    #[test]
    fn test_read_missing_file_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_record_then_read_all_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));
        log.record(&sample("alice")).unwrap();
        log.record(&sample("bob")).unwrap();

        let entries = log.read_all().unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_read_session_filters() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.jsonl"));
        log.record(&sample("alice")).unwrap();
        log.record(&sample("bob")).unwrap();
        log.record(&sample("alice")).unwrap();

        let entries = log.read_session("alice").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.session.as_deref() == Some("alice")));
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let log = AuditLog::new(&path);
        log.record(&sample("alice")).unwrap();

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "not json").unwrap();
        log.record(&sample("alice")).unwrap();

        assert_eq!(log.read_all().unwrap().len(), 2);
    }
}
