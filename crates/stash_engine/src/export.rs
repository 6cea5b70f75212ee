use std::fs;
use std::path::{Path, PathBuf};

use stash_core::{snapshot, DecodeError, EncodeError, NormalizedCollection};
use stash_logging::stash_info;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotFileError {
    #[error("cannot read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("cannot write snapshot: {0}")]
    Persist(#[from] PersistError),
    #[error("{path:?}: {source}")]
    Decode { path: PathBuf, source: DecodeError },
}

impl SnapshotFileError {
    /// The codec error, when the file was readable but its content was rejected.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            SnapshotFileError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Encodes `collection` and atomically writes it to `path`.
pub fn export_snapshot(
    path: &Path,
    collection: &NormalizedCollection,
) -> Result<PathBuf, SnapshotFileError> {
    let written = AtomicFileWriter::new(path).write(&snapshot::encode(collection)?)?;
    stash_info!("exported {} records to {:?}", collection.len(), written);
    Ok(written)
}

/// Reads and decodes a snapshot file; every entry comes back flagged as restored.
pub fn import_snapshot(path: &Path) -> Result<NormalizedCollection, SnapshotFileError> {
    let bytes = fs::read(path).map_err(|source| SnapshotFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let collection = snapshot::decode_bytes(&bytes).map_err(|source| SnapshotFileError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    stash_info!("imported {} records from {:?}", collection.len(), path);
    Ok(collection)
}
