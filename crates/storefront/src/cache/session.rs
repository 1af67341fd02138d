use crate::{abstract_trait::session::SessionStorageTrait, domain::response::session::Session};
use shared::errors::ClientError;
use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{debug, error, warn};

/// Session kept for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    inner: RwLock<Session>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: RwLock::new(session),
        }
    }
}

impl SessionStorageTrait for MemorySessionStorage {
    fn get(&self) -> Session {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, session: Session) -> Result<(), ClientError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))?;
        *guard = session;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.set(Session::default())
    }
}

/// Session persisted as a JSON object keyed by the storage keys.
///
/// Writes go through a sibling temp file and a rename so a crash never
/// leaves a half-written session behind.
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
    lock: RwLock<()>,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Session {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Session::default(),
            Err(e) => {
                error!("Failed to read session file {}: {e}", self.path.display());
                return Session::default();
            }
        };

        match serde_json::from_str::<Session>(&data) {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    "Ignoring unreadable session file {}: {e}",
                    self.path.display()
                );
                Session::default()
            }
        }
    }

    fn write_file(&self, session: &Session) -> Result<(), ClientError> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::Storage(format!("serialize session: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| storage_error(&self.path, e))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| storage_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| storage_error(&self.path, e))?;

        debug!("Session written to {}", self.path.display());
        Ok(())
    }
}

fn storage_error(path: &Path, err: io::Error) -> ClientError {
    ClientError::Storage(format!("{}: {err}", path.display()))
}

impl SessionStorageTrait for FileSessionStorage {
    fn get(&self) -> Session {
        let _guard = self.lock.read().unwrap_or_else(|p| p.into_inner());
        self.read_file()
    }

    fn set(&self, session: Session) -> Result<(), ClientError> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))?;

        if session.is_empty() {
            return remove_file(&self.path);
        }
        self.write_file(&session)
    }

    fn clear(&self) -> Result<(), ClientError> {
        let _guard = self
            .lock
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))?;
        remove_file(&self.path)
    }
}

fn remove_file(path: &Path) -> Result<(), ClientError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Session file removed: {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(storage_error(path, e)),
    }
}
