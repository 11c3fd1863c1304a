//! On-disk cache of session tokens.
//!
//! One file per (username, namespace) pair inside a caller-chosen directory,
//! named `.zabbixapi-token-<md5hex>` and holding only the raw token. Files
//! are created owner read/write only. Access is not synchronized across
//! processes: two logins racing on the same entry may both rewrite it.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = ".zabbixapi-token-";

/// A cache directory plus the namespace mixed into every key.
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
    namespace: String,
}

impl TokenCache {
    /// Returns `None` when `dir` is not an existing directory; caching is
    /// then skipped.
    pub fn open(dir: impl Into<PathBuf>, namespace: &str) -> Option<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return None;
        }
        Some(Self {
            dir,
            namespace: namespace.to_string(),
        })
    }

    pub fn entry(&self, username: &str) -> TokenCacheEntry {
        let digest = md5::compute(format!("{username}|{}", self.namespace));
        TokenCacheEntry {
            path: self.dir.join(format!("{FILE_PREFIX}{digest:x}")),
        }
    }
}

/// The cache file for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCacheEntry {
    path: PathBuf,
}

impl TokenCacheEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// The cached token, or `None` when no file exists.
    pub fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(token) => Ok(Some(token)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn write(&self, token: &str) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        // `mode` only applies on creation.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.as_bytes())
    }

    /// Delete the file. A missing file is not an error.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
