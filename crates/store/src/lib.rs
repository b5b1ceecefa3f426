//! Persistence of the promoter state document.
//!
//! The whole document is one JSON file. Every save writes the full document
//! to a temp file next to it and renames it into place; the previous version
//! is kept as `<file>.bak`.

pub mod document;
pub mod error;
pub mod file;

pub use {document::StateDocument, error::StoreError, file::PersistentStore};
