//! Directory scaffolding for the WOPR daemon's home directory.
//!
//! [`WoprHome`]: global state at `~/.wopr/` (or `$WOPR_HOME`). Holds the
//! session store, conversation logs, security policy, provider
//! credentials, scheduler state, and the daemon's own bookkeeping files.
//!
//! # Layout
//!
//! ```text
//! ~/.wopr/                              (WoprHome)
//! ├── sessions.json                       (name -> conversation id)
//! ├── sessions/
//! │   ├── {name}.md                       (per-session context text)
//! │   ├── {name}.provider.json            (per-session provider config)
//! │   ├── {name}.created                  (creation epoch ms, decimal string)
//! │   └── {name}.conversation.jsonl       (append-only conversation log)
//! ├── security.json                       (policy config)
//! ├── credentials/                        (per-provider credential files)
//! ├── scheduler.json                      (cron + one-shot trigger state)
//! ├── daemon.pid
//! ├── daemon.port
//! └── daemon.log
//! ```

use std::io;
use std::path::{Path, PathBuf};

/// Global WOPR home directory (`~/.wopr/` or `$WOPR_HOME`).
#[derive(Debug, Clone)]
pub struct WoprHome {
    root: PathBuf,
}

impl WoprHome {
    /// Resolve the home directory.
    ///
    /// Checks `$WOPR_HOME` first, then falls back to `$HOME/.wopr/`.
    ///
    /// # Errors
    ///
    /// Returns an error if `WOPR_HOME` is set but relative, or if neither
    /// `WOPR_HOME` nor `HOME` is set.
    pub fn resolve() -> io::Result<Self> {
        let root = if let Ok(custom) = std::env::var("WOPR_HOME") {
            let p = PathBuf::from(&custom);
            if !p.is_absolute() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "WOPR_HOME must be an absolute path",
                ));
            }
            p
        } else {
            let home = std::env::var("HOME").map_err(|_| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "neither WOPR_HOME nor HOME environment variable is set",
                )
            })?;
            PathBuf::from(home).join(".wopr")
        };

        Ok(Self { root })
    }

    /// Create from an explicit path (useful for testing).
    #[must_use]
    pub fn from_path(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Ensure the directory structure exists with secure permissions.
    ///
    /// Creates `sessions/` and `credentials/`, and sets the root and
    /// `credentials/` to `0o700` on Unix (owner-only access).
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or permission setting fails.
    pub fn ensure(&self) -> io::Result<()> {
        std::fs::create_dir_all(self.sessions_dir())?;
        std::fs::create_dir_all(self.credentials_dir())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            std::fs::set_permissions(self.root(), perms.clone())?;
            std::fs::set_permissions(self.credentials_dir(), perms)?;
        }
        Ok(())
    }

    /// Root directory path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sessions directory (`~/.wopr/sessions/`).
    #[must_use]
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("sessions")
    }

    /// Path to the session name -> conversation id map.
    #[must_use]
    pub fn sessions_index_path(&self) -> PathBuf {
        self.root.join("sessions.json")
    }

    /// Path to a session's context file.
    #[must_use]
    pub fn session_context_path(&self, name: &str) -> PathBuf {
        self.sessions_dir().join(format!("{name}.md"))
    }

    /// Path to a session's provider config file.
    #[must_use]
    pub fn session_provider_path(&self, name: &str) -> PathBuf {
        self.sessions_dir().join(format!("{name}.provider.json"))
    }

    /// Path to a session's creation-timestamp marker file.
    #[must_use]
    pub fn session_created_path(&self, name: &str) -> PathBuf {
        self.sessions_dir().join(format!("{name}.created"))
    }

    /// Path to a session's append-only conversation log.
    #[must_use]
    pub fn session_conversation_path(&self, name: &str) -> PathBuf {
        self.sessions_dir().join(format!("{name}.conversation.jsonl"))
    }

    /// Path to the global security policy file.
    #[must_use]
    pub fn security_config_path(&self) -> PathBuf {
        self.root.join("security.json")
    }

    /// Credentials directory (`~/.wopr/credentials/`), one file per provider id.
    #[must_use]
    pub fn credentials_dir(&self) -> PathBuf {
        self.root.join("credentials")
    }

    /// Path to a single provider's credential file.
    #[must_use]
    pub fn credential_path(&self, provider_id: &str) -> PathBuf {
        self.credentials_dir().join(format!("{provider_id}.json"))
    }

    /// Path to the scheduler's persisted trigger state.
    #[must_use]
    pub fn scheduler_state_path(&self) -> PathBuf {
        self.root.join("scheduler.json")
    }

    /// Path to the daemon's PID file.
    #[must_use]
    pub fn pid_file(&self) -> PathBuf {
        self.root.join("daemon.pid")
    }

    /// Path to the file the daemon writes its bound port to on startup.
    #[must_use]
    pub fn port_file(&self) -> PathBuf {
        self.root.join("daemon.port")
    }

    /// Path to the daemon's log file.
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.root.join("daemon.log")
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate the `WOPR_HOME` env var.
    /// `set_var`/`remove_var` are process-wide and unsafe under concurrency.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_wopr_home_resolve_with_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();

        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::set_var("WOPR_HOME", &path) };
        let home = WoprHome::resolve().unwrap();
        assert_eq!(home.root(), path);
        unsafe { std::env::remove_var("WOPR_HOME") };
    }

    #[test]
    fn test_wopr_home_resolve_default() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::remove_var("WOPR_HOME") };
        let home = WoprHome::resolve().unwrap();
        let expected = PathBuf::from(std::env::var("HOME").unwrap()).join(".wopr");
        assert_eq!(home.root(), expected);
    }

    #[test]
    fn test_wopr_home_rejects_relative_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: serialized by ENV_MUTEX
        unsafe { std::env::set_var("WOPR_HOME", "relative/path") };
        let result = WoprHome::resolve();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("absolute"));
        unsafe { std::env::remove_var("WOPR_HOME") };
    }

    #[test]
    fn test_wopr_home_ensure_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let home = WoprHome::from_path(dir.path());
        home.ensure().unwrap();

        assert!(home.sessions_dir().exists());
        assert!(home.credentials_dir().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_wopr_home_ensure_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let home = WoprHome::from_path(dir.path());
        home.ensure().unwrap();

        let root_perms = std::fs::metadata(home.root()).unwrap().permissions();
        assert_eq!(root_perms.mode() & 0o777, 0o700);
    }

    #[test]
    fn test_session_path_accessors() {
        let home = WoprHome::from_path("/tmp/test-wopr");
        assert_eq!(
            home.session_context_path("alice"),
            PathBuf::from("/tmp/test-wopr/sessions/alice.md")
        );
        assert_eq!(
            home.session_provider_path("alice"),
            PathBuf::from("/tmp/test-wopr/sessions/alice.provider.json")
        );
        assert_eq!(
            home.session_created_path("alice"),
            PathBuf::from("/tmp/test-wopr/sessions/alice.created")
        );
        assert_eq!(
            home.session_conversation_path("alice"),
            PathBuf::from("/tmp/test-wopr/sessions/alice.conversation.jsonl")
        );
        assert_eq!(
            home.security_config_path(),
            PathBuf::from("/tmp/test-wopr/security.json")
        );
        assert_eq!(home.pid_file(), PathBuf::from("/tmp/test-wopr/daemon.pid"));
    }
}
