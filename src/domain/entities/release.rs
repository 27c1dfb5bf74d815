//! Release directory layout on a host
//!
//! ```text
//! <app_root>/
//!   releases/<ReleaseId>/     immutable snapshots
//!   current -> releases/<id>  the live pointer
//!   shared/
//!     cached-copy/            git checkout releases are copied from
//!     env                     environment file copied into each release
//!   log/  pid/
//! ```
//!
//! Paths are remote POSIX paths, so they are kept as strings.

use crate::domain::value_objects::ReleaseId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLayout {
    app_root: String,
}

impl ReleaseLayout {
    pub fn new(app_root: impl Into<String>) -> Self {
        let app_root: String = app_root.into();
        let trimmed = app_root.trim_end_matches('/');
        Self {
            app_root: if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    fn join(&self, child: &str) -> String {
        if self.app_root == "/" {
            format!("/{}", child)
        } else {
            format!("{}/{}", self.app_root, child)
        }
    }

    pub fn app_root(&self) -> &str {
        &self.app_root
    }

    pub fn releases(&self) -> String {
        self.join("releases")
    }

    pub fn release(&self, id: &ReleaseId) -> String {
        format!("{}/{}", self.releases(), id)
    }

    pub fn current(&self) -> String {
        self.join("current")
    }

    pub fn shared(&self) -> String {
        self.join("shared")
    }

    pub fn cached_copy(&self) -> String {
        format!("{}/cached-copy", self.shared())
    }

    pub fn shared_env(&self) -> String {
        format!("{}/env", self.shared())
    }

    pub fn log(&self) -> String {
        self.join("log")
    }

    pub fn pid(&self) -> String {
        self.join("pid")
    }

    /// Every directory a prepared host must have
    pub fn directories(&self) -> Vec<String> {
        vec![
            self.app_root.clone(),
            self.releases(),
            self.shared(),
            self.cached_copy(),
            self.log(),
            self.pid(),
        ]
    }
}

/// A sub-path that lives outside the release tree and is linked in
///
/// Dependency trees and secrets are reused across releases instead of being
/// copied each time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLink {
    path: String,
}

impl SharedLink {
    /// `path` is relative to the repository root; a leading `/` is optional.
    pub fn new(path: &str) -> Self {
        Self {
            path: format!("/{}", path.trim_matches('/')),
        }
    }

    /// Normalized form, always starting with `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory the link is created in, relative to the repository root
    pub fn parent(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((parent, _)) => parent,
            None => "",
        }
    }

    /// rsync exclude pattern anchored at the transfer root
    pub fn exclude_pattern(&self) -> String {
        format!("{}*", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let layout = ReleaseLayout::new("/var/apps/galaxy/");
        let id = ReleaseId::parse("20240501120000").unwrap();
        assert_eq!(layout.app_root(), "/var/apps/galaxy");
        assert_eq!(layout.release(&id), "/var/apps/galaxy/releases/20240501120000");
        assert_eq!(layout.current(), "/var/apps/galaxy/current");
        assert_eq!(layout.cached_copy(), "/var/apps/galaxy/shared/cached-copy");
        assert_eq!(layout.shared_env(), "/var/apps/galaxy/shared/env");
        assert_eq!(layout.directories().len(), 6);
    }

    #[test]
    fn shared_link_normalizes() {
        let link = SharedLink::new("apps/travel/node_modules/");
        assert_eq!(link.path(), "/apps/travel/node_modules");
        assert_eq!(link.parent(), "/apps/travel");
        assert_eq!(link.exclude_pattern(), "/apps/travel/node_modules*");
    }

    #[test]
    fn top_level_link_parent_is_root() {
        let link = SharedLink::new("/secrets");
        assert_eq!(link.parent(), "");
    }
}
