//! Local secrets directory
//!
//! Everything below the directory is uploaded, dotfiles and git-ignored files
//! included; secrets are usually ignored by git on purpose.

use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::domain::entities::SecretFile;
use crate::error::{StagehandError, StagehandResult};

/// Read every regular file below `dir`, sorted by relative path.
///
/// A missing directory yields no files.
pub fn collect_secret_files(dir: &Path) -> StagehandResult<Vec<SecretFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let message = e.to_string();
            StagehandError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message)),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let relative: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let content = std::fs::read(entry.path())?;
        files.push(SecretFile::new(relative.join("/"), content));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn collects_nested_and_hidden_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("google")).unwrap();
        fs::write(dir.path().join("env-staging"), "A=1\n").unwrap();
        fs::write(dir.path().join("google/key.json"), "{}").unwrap();
        fs::write(dir.path().join(".gitignore"), "*\n").unwrap();

        let files = collect_secret_files(dir.path()).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(names, vec![".gitignore", "env-staging", "google/key.json"]);
        assert_eq!(files[2].content, b"{}");
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        assert!(collect_secret_files(&dir.path().join("secrets")).unwrap().is_empty());
    }
}
