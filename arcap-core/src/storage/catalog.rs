use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecordError;
use crate::models::session::{FrameSize, Session};

/// File name of the session metadata document.
pub const SESSION_FILE: &str = "project.json";

/// Durable catalog of recording sessions under one root directory.
///
/// Each session owns a subdirectory named by its timestamp identifier.
/// The recording coordinator only uses `allocate` and `save`; the
/// listing/rename/delete surface exists for the catalog UI.
pub struct SessionCatalog {
    root: PathBuf,
    sessions: Vec<Session>,
}

impl SessionCatalog {
    /// Open a catalog, scanning `root` for previously saved sessions.
    ///
    /// Directories without a loadable `project.json` are skipped.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| RecordError::StorageError(format!("failed to create catalog root: {e}")))?;

        let mut sessions = Vec::new();
        let entries = fs::read_dir(&root)
            .map_err(|e| RecordError::StorageError(format!("failed to scan catalog root: {e}")))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match Self::load(&path) {
                Ok(session) => sessions.push(session),
                Err(e) => log::debug!("skipping {}: {e}", path.display()),
            }
        }

        let mut catalog = Self { root, sessions };
        catalog.sort_sessions();
        Ok(catalog)
    }

    /// Create a fresh session and its storage directory.
    pub fn allocate(
        &mut self,
        model_name: &str,
        viewport_size: FrameSize,
    ) -> Result<Session, RecordError> {
        let session = Session::new(model_name, viewport_size);
        let path = self.session_path(&session);
        fs::create_dir_all(&path).map_err(|e| {
            RecordError::StorageError(format!(
                "failed to create session directory {}: {e}",
                path.display()
            ))
        })?;

        self.sessions.push(session.clone());
        self.sort_sessions();
        Ok(session)
    }

    /// Persist the session metadata as `project.json`.
    pub fn save(&mut self, session: &Session) -> Result<(), RecordError> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| RecordError::StorageError(format!("failed to serialize session: {e}")))?;
        let file_path = self.session_path(session).join(SESSION_FILE);
        fs::write(&file_path, json).map_err(|e| {
            RecordError::StorageError(format!("failed to write {}: {e}", file_path.display()))
        })?;

        match self
            .sessions
            .iter_mut()
            .find(|s| s.session_id == session.session_id)
        {
            Some(existing) => *existing = session.clone(),
            None => self.sessions.push(session.clone()),
        }
        self.sort_sessions();
        Ok(())
    }

    /// Load a session record from its directory.
    pub fn load(path: &Path) -> Result<Session, RecordError> {
        let file_path = path.join(SESSION_FILE);
        let json = fs::read_to_string(&file_path).map_err(|e| {
            RecordError::StorageError(format!("failed to read {}: {e}", file_path.display()))
        })?;
        serde_json::from_str(&json)
            .map_err(|e| RecordError::StorageError(format!("failed to parse session: {e}")))
    }

    /// Delete a session's directory and drop it from the listing.
    pub fn remove(&mut self, session: &Session) -> Result<(), RecordError> {
        self.sessions.retain(|s| s.session_id != session.session_id);
        let path = self.session_path(session);
        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| {
                RecordError::StorageError(format!("failed to remove {}: {e}", path.display()))
            })?;
        }
        Ok(())
    }

    /// Known sessions, newest first.
    pub fn list(&self) -> &[Session] {
        &self.sessions
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Storage directory of a session.
    pub fn session_path(&self, session: &Session) -> PathBuf {
        self.root.join(session.identifier())
    }

    fn sort_sessions(&mut self) {
        self.sessions
            .sort_by(|a, b| b.creation_date.cmp(&a.creation_date));
    }
}
