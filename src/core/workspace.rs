//! Workspace discovery and layout

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::storage::FileStorage;

/// Name of the directory that marks a workspace root
pub const WORKSPACE_DIR: &str = ".itam";

/// Represents an inventory workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .itam/)
    root: PathBuf,
}

impl Workspace {
    /// Find the workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current =
            std::env::current_dir().map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        loop {
            if current.join(WORKSPACE_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a workspace at `path`.
    ///
    /// With `force`, an existing `.itam/` is reused and its config rewritten;
    /// stored data is never touched.
    pub fn init(path: &Path, force: bool) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let dir = root.join(WORKSPACE_DIR);
        if dir.exists() && !force {
            return Err(WorkspaceError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| WorkspaceError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Inventory workspace configuration

# Company used when a command is run without --company
# default_company: ""

# PIN given to the seeded 'admin' user when the database is first created
# bootstrap_pin: "0000"

# Code required to edit the super-admin when logged in as another admin
# master_code: ""

# PIN that unlocks the console after inactivity (lock disabled when unset)
# lock_pin: ""
# idle_timeout_minutes: 20

# Artificial delay before a login attempt resolves
# login_delay_ms: 800
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .itam directory
    pub fn itam_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Key-value storage backed by the .itam directory
    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.itam_dir())
    }
}

/// Errors that can occur while locating or creating a workspace
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not an inventory workspace (searched from {searched_from:?}). Run 'itam init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();

        assert!(workspace.itam_dir().is_dir());
        assert!(workspace.itam_dir().join("config.yaml").exists());
        assert_eq!(workspace.storage().dir(), workspace.itam_dir().as_path());
    }

    #[test]
    fn test_workspace_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let err = Workspace::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_workspace_discover_finds_itam_dir() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_workspace_discover_fails_without_itam_dir() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }
}
