//! HostRepository port - persisted host inventory

use std::path::PathBuf;

use crate::domain::entities::HostSet;

pub trait HostRepository: Send + Sync {
    /// Parse the persisted inventory. A missing file is an empty set.
    fn load(&self) -> Result<HostSet, HostFileError>;

    /// Replace the persisted inventory in full.
    fn persist(&self, hosts: &HostSet) -> Result<(), HostFileError>;
}

#[derive(Debug, thiserror::Error)]
pub enum HostFileError {
    #[error("failed to access hosts file {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed hosts file {path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl From<HostFileError> for crate::error::StagehandError {
    fn from(err: HostFileError) -> Self {
        match err {
            HostFileError::Access { path, source } => crate::error::StagehandError::Io(
                std::io::Error::new(source.kind(), format!("{}: {}", path.display(), source)),
            ),
            HostFileError::Malformed {
                path,
                line,
                message,
            } => crate::error::StagehandError::parse(path.display().to_string(), Some(line), message),
        }
    }
}
