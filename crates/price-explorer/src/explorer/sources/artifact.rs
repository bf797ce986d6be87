use super::LoadError;
use std::path::{Path, PathBuf};
use tracing::info;

/// The serialized price model. Held as opaque bytes; predictions already
/// live in the listings table, so nothing here deserializes or runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl ModelArtifact {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| LoadError::io(path, err))?;

        info!(path = %path.display(), bytes = bytes.len(), "model artifact loaded");
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
