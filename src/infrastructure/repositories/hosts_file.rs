//! Text Host Repository
//!
//! Persists the host inventory as an aligned table (`deploy/hosts.txt` by
//! default). Writes take an exclusive lock on a sibling `.lock` file and
//! replace the table through a temp file rename.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::entities::HostSet;
use crate::domain::ports::{HostFileError, HostRepository};
use crate::domain::services::{format_host_table, parse_host_table};

pub struct TextHostRepository {
    path: PathBuf,
}

impl TextHostRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    fn access(&self, source: std::io::Error) -> HostFileError {
        HostFileError::Access {
            path: self.path.clone(),
            source,
        }
    }

    fn write_atomically(&self, content: &str) -> Result<(), HostFileError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.access(e))?;
        tmp.write_all(content.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.access(e))?;
        tmp.persist(&self.path).map_err(|e| self.access(e.error))?;
        Ok(())
    }
}

impl HostRepository for TextHostRepository {
    fn load(&self) -> Result<HostSet, HostFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HostSet::new()),
            Err(e) => return Err(self.access(e)),
        };

        parse_host_table(&content).map_err(|e| HostFileError::Malformed {
            path: self.path.clone(),
            line: e.line,
            message: e.message,
        })
    }

    fn persist(&self, hosts: &HostSet) -> Result<(), HostFileError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.access(e))?;
        }

        let lock_file = fs::File::create(self.lock_path()).map_err(|e| self.access(e))?;
        lock_file.lock_exclusive().map_err(|e| self.access(e))?;

        let result = self.write_atomically(&format_host_table(hosts));

        let _ = lock_file.unlock();
        result
    }
}
