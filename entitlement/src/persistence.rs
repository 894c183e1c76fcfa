use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use common::error::{AppError, Res};

use crate::models::entitlement::Entitlement;

/// Where an entitlement lives between sessions.
pub trait EntitlementPersistence: Send + Sync {
    fn load(&self) -> Res<Option<Entitlement>>;
    fn save(&self, entitlement: &Entitlement) -> Res<()>;
}

#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: RwLock<Option<Entitlement>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entitlement: Entitlement) -> Self {
        Self {
            slot: RwLock::new(Some(entitlement)),
        }
    }
}

impl EntitlementPersistence for MemoryPersistence {
    fn load(&self) -> Res<Option<Entitlement>> {
        self.slot
            .read()
            .map(|slot| *slot)
            .map_err(|e| AppError::Internal(format!("Entitlement slot poisoned: {}", e)))
    }

    fn save(&self, entitlement: &Entitlement) -> Res<()> {
        let mut slot = self
            .slot
            .write()
            .map_err(|e| AppError::Internal(format!("Entitlement slot poisoned: {}", e)))?;
        *slot = Some(*entitlement);
        Ok(())
    }
}

/// One JSON document per user.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntitlementPersistence for JsonFilePersistence {
    fn load(&self) -> Res<Option<Entitlement>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::from(e)),
        }
    }

    fn save(&self, entitlement: &Entitlement) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // write-then-rename so a reader never sees half a record
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(entitlement)?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved entitlement to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn premium() -> Entitlement {
        Entitlement {
            is_premium: true,
            expires_at: Some(Utc.with_ymd_and_hms(2024, 2, 15, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn memory_starts_empty_and_keeps_last_save() {
        let store = MemoryPersistence::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&premium()).unwrap();
        store.save(&Entitlement::free()).unwrap();
        assert_eq!(store.load().unwrap(), Some(Entitlement::free()));
    }

    #[test]
    fn json_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("users").join("u1.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&premium()).unwrap();

        let reopened = JsonFilePersistence::new(store.path().to_path_buf());
        assert_eq!(reopened.load().unwrap(), Some(premium()));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("u1.json");
        fs::write(&path, b"{not json").unwrap();

        let err = JsonFilePersistence::new(path).load().unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }
}
