use std::{
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use {
    promoter_common::{Settings, UserId},
    tracing::{debug, info, warn},
};

use crate::{document::StateDocument, error::StoreError};

/// JSON file-backed store for the [`StateDocument`].
///
/// Not internally synchronized: callers serialize every mutate-then-save
/// sequence through a single writer.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    path: PathBuf,
    bootstrap_admin: Option<UserId>,
    bootstrap_settings: Settings,
}

impl PersistentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            bootstrap_admin: None,
            bootstrap_settings: Settings::default(),
        }
    }

    /// Values used to seed a document when no file exists yet.
    pub fn with_bootstrap(mut self, admin: Option<UserId>, settings: Settings) -> Self {
        self.bootstrap_admin = admin;
        self.bootstrap_settings = settings;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling holding the previously saved version.
    pub fn backup_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    pub fn bootstrap_document(&self) -> StateDocument {
        StateDocument::bootstrap(self.bootstrap_admin, self.bootstrap_settings)
    }

    /// Load the document, or a bootstrap document when no file exists.
    ///
    /// A missing primary with a present backup means a save was interrupted
    /// between the backup rename and the final rename; the backup is loaded.
    pub fn load(&self) -> Result<StateDocument, StoreError> {
        if let Some(doc) = self.read(&self.path)? {
            return Ok(doc);
        }

        let backup = self.backup_path();
        if let Some(doc) = self.read(&backup)? {
            warn!(
                path = %self.path.display(),
                backup = %backup.display(),
                "state file missing, recovered from backup"
            );
            return Ok(doc);
        }

        info!(path = %self.path.display(), "no state file, starting from bootstrap document");
        Ok(self.bootstrap_document())
    }

    /// Like [`load`](Self::load), but falls back to the bootstrap document on
    /// any failure instead of returning it.
    pub fn load_or_default(&self) -> StateDocument {
        match self.load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "failed to load state, using bootstrap document");
                self.bootstrap_document()
            },
        }
    }

    fn read(&self, path: &Path) -> Result<Option<StateDocument>, StoreError> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            },
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Persist the full document.
    ///
    /// The new content is written and synced to a temp file in the target
    /// directory first. The existing file is then renamed to `.bak`
    /// (best-effort) and the temp file renamed over the primary name.
    pub fn save(&self, doc: &StateDocument) -> Result<(), StoreError> {
        let persist_err = |source: io::Error| StoreError::Persist {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(persist_err)?;

        let data = serde_json::to_vec_pretty(doc).map_err(|e| persist_err(io::Error::other(e)))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(persist_err)?;
        tmp.write_all(&data).map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;

        if self.path.exists()
            && let Err(e) = fs::rename(&self.path, self.backup_path())
        {
            warn!(path = %self.path.display(), error = %e, "failed to back up state file");
        }

        tmp.persist(&self.path).map_err(|e| persist_err(e.error))?;
        debug!(path = %self.path.display(), bytes = data.len(), "saved state");
        Ok(())
    }
}
