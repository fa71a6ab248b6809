//! Per-user session credential storage under `~/.opsicle`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const PROFILE_DIR: &str = ".opsicle";
const SESSION_DIR: &str = "session";
const SESSION_FILE: &str = "current";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no active session (run `opsicle login`)")]
    NoSession,

    #[error("could not determine the home directory")]
    NoHome,

    #[error("{action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CredentialError {
    fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub path: PathBuf,
}

/// Location of the per-user profile directory.
#[derive(Clone, Debug)]
pub struct Profile {
    dir: PathBuf,
}

impl Profile {
    pub fn from_home() -> Result<Self, CredentialError> {
        let home = dirs::home_dir().ok_or(CredentialError::NoHome)?;
        Ok(Self::under(&home))
    }

    pub fn under(home: &Path) -> Self {
        Self {
            dir: home.join(PROFILE_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_DIR).join(SESSION_FILE)
    }
}

/// The bearer token of the current session. No locking is attempted across
/// processes; replacement is atomic at the filesystem level only.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(profile: &Profile) -> Self {
        Self {
            path: profile.session_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Session, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(CredentialError::NoSession);
            }
            Err(err) => return Err(CredentialError::io("read session file", &self.path, err)),
        };
        let token = raw.trim();
        if token.is_empty() {
            return Err(CredentialError::NoSession);
        }
        Ok(Session {
            token: token.to_string(),
            path: self.path.clone(),
        })
    }

    pub fn write(&self, token: &str) -> Result<PathBuf, CredentialError> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| {
                CredentialError::io(
                    "resolve session directory for",
                    &self.path,
                    std::io::Error::from(std::io::ErrorKind::InvalidInput),
                )
            })?
            .to_path_buf();
        create_private_dir(&dir)?;

        // NamedTempFile is created 0600 and lives next to the target so the
        // rename never crosses filesystems.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| CredentialError::io("create temp file in", &dir, e))?;
        tmp.write_all(token.as_bytes())
            .map_err(|e| CredentialError::io("write temp file for", &self.path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| CredentialError::io("sync temp file for", &self.path, e))?;
        tmp.persist(&self.path)
            .map_err(|e| CredentialError::io("replace session file", &self.path, e.error))?;
        restrict_to_owner(&self.path, 0o600)?;

        tracing::debug!(path = %self.path.display(), "session credential written");
        Ok(self.path.clone())
    }

    pub fn delete(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session credential removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CredentialError::io("remove session file", &self.path, err)),
        }
    }
}

fn create_private_dir(dir: &Path) -> Result<(), CredentialError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| CredentialError::io("create directory", dir, e))?;
    restrict_to_owner(dir, 0o700)?;
    if let Some(profile) = dir.parent() {
        restrict_to_owner(profile, 0o700)?;
    }
    Ok(())
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path, mode: u32) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| CredentialError::io("set permissions on", path, e))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path, _mode: u32) -> Result<(), CredentialError> {
    Ok(())
}

#[cfg(test)]
#[path = "tests/credentials_tests.rs"]
mod tests;
