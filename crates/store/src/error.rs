use std::{io, path::PathBuf};

/// Failures loading or saving the state document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file exists but does not parse as a state document.
    #[error("state file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read state file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// The primary write did not complete. The previous file is untouched.
    #[error("failed to persist state file {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },
}
