// SPDX-License-Identifier: MIT OR Apache-2.0
//! Persisted session state: CSRF token, stateful flag, context id, cookie
//! jar (§4.1, §6.5).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use erpl_error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// Everything a session needs to resume exactly where it left off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub csrf_token: Option<String>,
    pub stateful: bool,
    pub context_id: Option<String>,
    pub cookies: BTreeMap<String, String>,
}

impl SessionState {
    /// Write this state as JSON to `path`, owner-read-write only (§6.5).
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            Error::new("SaveSession", path.to_string_lossy(), e.to_string(), ErrorKind::Internal)
        })?;
        fs::write(path, json).map_err(|e| {
            Error::new("SaveSession", path.to_string_lossy(), e.to_string(), ErrorKind::Internal)
        })?;
        set_owner_only_permissions(path)?;
        Ok(())
    }

    /// Restore a previously-saved session state from `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path).map_err(|e| {
            Error::new("LoadSession", path.to_string_lossy(), e.to_string(), ErrorKind::Internal)
        })?;
        serde_json::from_str(&json).map_err(|e| {
            Error::new("LoadSession", path.to_string_lossy(), e.to_string(), ErrorKind::Internal)
        })
    }
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        Error::new("SaveSession", path.to_string_lossy(), e.to_string(), ErrorKind::Internal)
    })
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> Result<(), Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_restores_state_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut cookies = BTreeMap::new();
        cookies.insert("sap-usercontext".to_string(), "sap-client=100".to_string());

        let original = SessionState {
            csrf_token: Some("tok123".to_string()),
            stateful: true,
            context_id: Some("ctx456".to_string()),
            cookies,
        };
        original.save(&path).unwrap();
        let restored = SessionState::load(&path).unwrap();
        assert_eq!(original, restored);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }
}
