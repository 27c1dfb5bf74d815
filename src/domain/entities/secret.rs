/// A file from the local secrets directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFile {
    /// Path below the secrets directory, `/`-separated
    pub relative: String,
    pub content: Vec<u8>,
}

impl SecretFile {
    pub fn new(relative: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            relative: relative.into(),
            content: content.into(),
        }
    }

    /// Destination under `remote_dir`
    pub fn remote_path(&self, remote_dir: &str) -> String {
        format!("{}/{}", remote_dir.trim_end_matches('/'), self.relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_path_joins_once() {
        let file = SecretFile::new("google/key.json", b"{}".to_vec());
        assert_eq!(
            file.remote_path("/var/apps/galaxy/shared/cached-copy/secrets/"),
            "/var/apps/galaxy/shared/cached-copy/secrets/google/key.json"
        );
    }
}
