use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::user::UserState;

/// Fixed application identifier; the snapshot file is `<key>.json`.
pub const STORAGE_KEY: &str = "mindmaze_user";

/// Key-value persistence for the full `UserState` snapshot.
///
/// The store holds exactly one document: the latest state, written wholesale
/// after every change. Writes are idempotent, so callers may treat them as
/// fire-and-forget.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("MINDMAZE_STATE_PATH") {
            return Self {
                path: PathBuf::from(explicit),
            };
        }

        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".local");
                    p.push("share");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("mindmaze");
        path.push(format!("{STORAGE_KEY}.json"));
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot once at startup. A missing or unparseable file
    /// falls back to the initial state rather than surfacing an error.
    pub fn load(&self) -> UserState {
        let Ok(bytes) = fs::read(&self.path) else {
            return UserState::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|_| UserState::default())
    }

    pub fn save(&self, user: &UserState) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(user)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        atomic_write(&self.path, json.as_bytes())
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            // Fallback for platforms where rename over an existing file fails.
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}
