// SPDX-License-Identifier: MIT OR Apache-2.0
//! On-disk credential storage for `login`/`logout`: JSON at `.adt.creds`
//! in the working directory, owner-read-write only (§6.5).

use std::fs;
use std::path::{Path, PathBuf};

use erpl_error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub client: String,
    pub use_https: bool,
}

pub fn default_path() -> PathBuf {
    PathBuf::from(".adt.creds")
}

impl Credentials {
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::new("Login", path.to_string_lossy(), e.to_string(), ErrorKind::Internal))?;
        fs::write(path, json).map_err(|e| Error::new("Login", path.to_string_lossy(), e.to_string(), ErrorKind::Internal))?;
        set_owner_only_permissions(path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path).map_err(|e| Error::new("LoadCredentials", path.to_string_lossy(), e.to_string(), ErrorKind::Authentication))?;
        serde_json::from_str(&json).map_err(|e| Error::new("LoadCredentials", path.to_string_lossy(), e.to_string(), ErrorKind::Internal))
    }
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| Error::new("Login", path.to_string_lossy(), e.to_string(), ErrorKind::Internal))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), Error> {
    Ok(())
}

/// Remove the credentials file. Missing file is not an error (`logout`
/// is idempotent).
pub fn remove(path: &Path) -> Result<bool, Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::new("Logout", path.to_string_lossy(), e.to_string(), ErrorKind::Internal)),
    }
}
